use fieldlab_domain::{flerr, FlResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use tracing::info;

use crate::labels::Label;

pub mod io;

/// { kind name: ordered list of label instances }
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LabelsMap {
    #[serde(flatten)]
    map: HashMap<String, Vec<Label>>,
}
impl LabelsMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
    pub fn of_kind(&self, kind_name: &str) -> Option<&Vec<Label>> {
        self.map.get(kind_name)
    }
    pub fn kinds(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }
    pub fn n_labels(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }
    fn push(&mut self, label: Label) {
        self.map
            .entry(label.kind_name().to_string())
            .or_default()
            .push(label);
    }
    fn remove(&mut self, kind_name: &str, label_idx: usize) -> Option<Label> {
        let list = self.map.get_mut(kind_name)?;
        if label_idx < list.len() {
            Some(list.remove(label_idx))
        } else {
            None
        }
    }
    fn get_mut(&mut self, kind_name: &str, label_idx: usize) -> Option<&mut Label> {
        self.map.get_mut(kind_name)?.get_mut(label_idx)
    }
    fn get(&self, kind_name: &str, label_idx: usize) -> Option<&Label> {
        self.map.get(kind_name)?.get(label_idx)
    }
}

/// One image of the database together with all labels placed on it. The store
/// owns these exclusively, label lists are only mutated through the store.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LabeledImage {
    pub path: String,
    labels: LabelsMap,
}
impl LabeledImage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            labels: LabelsMap::new(),
        }
    }
    pub fn labels(&self) -> &LabelsMap {
        &self.labels
    }
}

/// Non-owning handle to one label in the store. Stale as soon as the label's
/// removal notification has completed, any later use surfaces a NotFound
/// error instead of touching a different label silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelRef {
    pub image_idx: usize,
    pub kind: &'static str,
    pub label_idx: usize,
}

/// Broadcast payloads. Every structural mutation is bracketed by a pre event
/// strictly before the state change and a post event strictly after, with
/// identical payload, so that list/tree consumers can snapshot their old
/// layout before applying the new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEvent {
    PreDatabaseChanged,
    DatabaseChanged,
    PreImageAdded(usize),
    ImageAdded(usize),
    PreImageRemoved(usize),
    ImageRemoved(usize),
    PreLabelAdded(LabelRef),
    LabelAdded(LabelRef),
    LabelChanged(LabelRef),
    PreLabelRemoved(LabelRef),
    LabelRemoved(LabelRef),
}

pub type DbListener = Box<dyn FnMut(&DbEvent)>;

/// The in-memory collection of all labeled images plus its exists/modified
/// flags. Single-threaded by design, dispatch is a synchronous function call
/// in listener-registration order and listeners must not re-enter the store.
#[derive(Default)]
pub struct ImageDatabase {
    images: Vec<LabeledImage>,
    exists: bool,
    modified: bool,
    listeners: Vec<DbListener>,
}

impl Debug for ImageDatabase {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("ImageDatabase")
            .field("images", &self.images)
            .field("exists", &self.exists)
            .field("modified", &self.modified)
            .field("n_listeners", &self.listeners.len())
            .finish()
    }
}

impl ImageDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self) -> bool {
        self.exists
    }
    pub fn modified(&self) -> bool {
        self.modified
    }
    pub fn images(&self) -> &[LabeledImage] {
        &self.images
    }
    pub fn image(&self, image_idx: usize) -> FlResult<&LabeledImage> {
        self.images
            .get(image_idx)
            .ok_or_else(|| flerr!(NotFound, "no image at index {}", image_idx))
    }
    pub fn label(&self, label_ref: LabelRef) -> FlResult<&Label> {
        self.image(label_ref.image_idx)?
            .labels
            .get(label_ref.kind, label_ref.label_idx)
            .ok_or_else(|| flerr!(NotFound, "no label for {:?}", label_ref))
    }
    /// Mutable access for callers editing a label in place. The store itself
    /// does not treat this as a mutation, the caller broadcasts it afterwards
    /// through [`change_label`](ImageDatabase::change_label).
    pub fn label_mut(&mut self, label_ref: LabelRef) -> FlResult<&mut Label> {
        self.images
            .get_mut(label_ref.image_idx)
            .and_then(|image| image.labels.get_mut(label_ref.kind, label_ref.label_idx))
            .ok_or_else(|| flerr!(NotFound, "no label for {:?}", label_ref))
    }

    pub fn subscribe(&mut self, listener: DbListener) {
        self.listeners.push(listener);
    }

    fn emit(&mut self, event: DbEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn clear(&mut self) {
        self.emit(DbEvent::PreDatabaseChanged);
        self.modified = false;
        self.exists = false;
        self.images = vec![];
        self.emit(DbEvent::DatabaseChanged);
    }

    pub fn create_new(&mut self) {
        self.emit(DbEvent::PreDatabaseChanged);
        self.modified = false;
        self.exists = true;
        self.images = vec![];
        self.emit(DbEvent::DatabaseChanged);
    }

    /// Appends unless an image with the same path is already present. The
    /// duplicate scan is an exact string comparison of the stored paths, no
    /// canonicalization happens, and a duplicate is suppressed silently.
    pub fn add_image(&mut self, image: LabeledImage) {
        if !self.exists {
            return;
        }
        if self.images.iter().any(|im| im.path == image.path) {
            info!("not adding '{}' again", image.path);
            return;
        }
        let image_idx = self.images.len();
        self.emit(DbEvent::PreImageAdded(image_idx));
        self.images.push(image);
        self.modified = true;
        self.emit(DbEvent::ImageAdded(image_idx));
    }

    pub fn remove_image(&mut self, image_idx: usize) -> FlResult<()> {
        if !self.exists {
            return Ok(());
        }
        if image_idx >= self.images.len() {
            return Err(flerr!(NotFound, "no image at index {}", image_idx));
        }
        self.emit(DbEvent::PreImageRemoved(image_idx));
        self.images.remove(image_idx);
        self.modified = true;
        self.emit(DbEvent::ImageRemoved(image_idx));
        Ok(())
    }

    /// Appends to the image's per-kind list, creating the list on first use.
    /// Returns the handle of the new label, `None` for the exists=false no-op.
    pub fn add_label(&mut self, image_idx: usize, label: Label) -> FlResult<Option<LabelRef>> {
        if !self.exists {
            return Ok(None);
        }
        let kind = label.kind_name();
        let image = self.image(image_idx)?;
        let label_idx = image.labels.of_kind(kind).map_or(0, Vec::len);
        let label_ref = LabelRef {
            image_idx,
            kind,
            label_idx,
        };
        self.emit(DbEvent::PreLabelAdded(label_ref));
        self.images[image_idx].labels.push(label);
        self.modified = true;
        self.emit(DbEvent::LabelAdded(label_ref));
        Ok(Some(label_ref))
    }

    /// Broadcasts that the referenced label has been edited in place through
    /// [`label_mut`](ImageDatabase::label_mut). The store performs no mutation
    /// here beyond flagging itself modified.
    pub fn change_label(&mut self, label_ref: LabelRef) -> FlResult<()> {
        if !self.exists {
            return Ok(());
        }
        self.label(label_ref)?;
        self.modified = true;
        self.emit(DbEvent::LabelChanged(label_ref));
        Ok(())
    }

    pub fn remove_label(&mut self, label_ref: LabelRef) -> FlResult<()> {
        if !self.exists {
            return Ok(());
        }
        let image = self.image(label_ref.image_idx)?;
        let Some(list) = image.labels.of_kind(label_ref.kind) else {
            // kind never used on this image, nothing to do
            return Ok(());
        };
        if label_ref.label_idx >= list.len() {
            return Err(flerr!(NotFound, "no label for {:?}", label_ref));
        }
        self.emit(DbEvent::PreLabelRemoved(label_ref));
        self.images[label_ref.image_idx]
            .labels
            .remove(label_ref.kind, label_ref.label_idx);
        self.modified = true;
        self.emit(DbEvent::LabelRemoved(label_ref));
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::tests_common::record_events;
    use super::*;
    use crate::labels::{
        BallLabel, GoalPostLabel, LineLabel, RobotLabel, TeamColor, LINES_NAME, ROBOTS_NAME,
    };
    use fieldlab_domain::ErrorKind;
    use std::{cell::RefCell, rc::Rc};

    fn line_label() -> Label {
        Label::Line(LineLabel {
            start: (10, 10).into(),
            end: (50, 60).into(),
        })
    }

    #[test]
    fn test_mutators_are_noops_without_database() {
        let mut db = ImageDatabase::new();
        let events = record_events(&mut db);
        assert!(!db.exists());
        db.add_image(LabeledImage::new("/a.png"));
        db.remove_image(0).unwrap();
        assert_eq!(db.add_label(0, line_label()).unwrap(), None);
        db.change_label(LabelRef {
            image_idx: 0,
            kind: LINES_NAME,
            label_idx: 0,
        })
        .unwrap();
        db.remove_label(LabelRef {
            image_idx: 0,
            kind: LINES_NAME,
            label_idx: 0,
        })
        .unwrap();
        assert!(db.images().is_empty());
        assert!(!db.modified());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_add_remove_image_sequence() {
        let mut db = ImageDatabase::new();
        db.create_new();
        assert!(db.exists());
        assert!(!db.modified());
        let events = record_events(&mut db);
        db.add_image(LabeledImage::new("/a.png"));
        db.add_image(LabeledImage::new("/b.png"));
        assert_eq!(
            db.images().iter().map(|im| im.path.as_str()).collect::<Vec<_>>(),
            vec!["/a.png", "/b.png"]
        );
        assert!(db.modified());

        // duplicate path is suppressed silently, even with labels attached
        let mut duplicate = LabeledImage::new("/a.png");
        duplicate.labels.push(line_label());
        db.add_image(duplicate);
        assert_eq!(db.images().len(), 2);

        db.remove_image(0).unwrap();
        assert_eq!(db.images()[0].path, "/b.png");
        assert_eq!(
            *events.borrow(),
            vec![
                DbEvent::PreImageAdded(0),
                DbEvent::ImageAdded(0),
                DbEvent::PreImageAdded(1),
                DbEvent::ImageAdded(1),
                DbEvent::PreImageRemoved(0),
                DbEvent::ImageRemoved(0),
            ]
        );
        assert_eq!(
            db.remove_image(7).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        // failed removal does not notify
        assert_eq!(events.borrow().len(), 6);
    }

    #[test]
    fn test_duplicate_add_keeps_modified_untouched() {
        let mut db = ImageDatabase::new();
        db.create_new();
        db.add_image(LabeledImage::new("/a.png"));
        db.write_state_clean_for_test();
        db.add_image(LabeledImage::new("/a.png"));
        assert!(!db.modified());
        assert_eq!(db.images().len(), 1);
    }

    #[test]
    fn test_label_lifecycle() {
        let mut db = ImageDatabase::new();
        db.create_new();
        db.add_image(LabeledImage::new("/a.png"));
        let events = record_events(&mut db);

        let line_ref = db.add_label(0, line_label()).unwrap().unwrap();
        assert_eq!(
            line_ref,
            LabelRef {
                image_idx: 0,
                kind: LINES_NAME,
                label_idx: 0,
            }
        );
        let ball_ref = db
            .add_label(
                0,
                Label::Ball(BallLabel {
                    center: (5, 5).into(),
                    radius: 3,
                    blurred: false,
                }),
            )
            .unwrap()
            .unwrap();
        let second_line_ref = db.add_label(0, line_label()).unwrap().unwrap();
        assert_eq!(second_line_ref.label_idx, 1);
        assert_eq!(db.images()[0].labels().of_kind(LINES_NAME).unwrap().len(), 2);
        assert_eq!(db.images()[0].labels().n_labels(), 3);

        db.label_mut(ball_ref).unwrap().ball_mut().unwrap().blurred = true;
        db.change_label(ball_ref).unwrap();
        assert!(db.label(ball_ref).unwrap().ball().unwrap().blurred);

        db.remove_label(line_ref).unwrap();
        assert_eq!(db.images()[0].labels().of_kind(LINES_NAME).unwrap().len(), 1);
        // second line moved down one slot
        assert_eq!(
            db.remove_label(second_line_ref).unwrap_err().kind(),
            ErrorKind::NotFound
        );

        assert_eq!(
            *events.borrow(),
            vec![
                DbEvent::PreLabelAdded(line_ref),
                DbEvent::LabelAdded(line_ref),
                DbEvent::PreLabelAdded(ball_ref),
                DbEvent::LabelAdded(ball_ref),
                DbEvent::PreLabelAdded(second_line_ref),
                DbEvent::LabelAdded(second_line_ref),
                DbEvent::LabelChanged(ball_ref),
                DbEvent::PreLabelRemoved(line_ref),
                DbEvent::LabelRemoved(line_ref),
            ]
        );
    }

    #[test]
    fn test_remove_label_of_unused_kind_is_noop() {
        let mut db = ImageDatabase::new();
        db.create_new();
        db.add_image(LabeledImage::new("/a.png"));
        let events = record_events(&mut db);
        db.remove_label(LabelRef {
            image_idx: 0,
            kind: ROBOTS_NAME,
            label_idx: 0,
        })
        .unwrap();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_change_label_of_stale_ref_fails() {
        let mut db = ImageDatabase::new();
        db.create_new();
        db.add_image(LabeledImage::new("/a.png"));
        let robot_ref = db
            .add_label(
                0,
                Label::Robot(RobotLabel {
                    top_left: (1, 2).into(),
                    bottom_right: (7, 9).into(),
                    team_color: TeamColor::None,
                }),
            )
            .unwrap()
            .unwrap();
        db.remove_label(robot_ref).unwrap();
        assert_eq!(
            db.change_label(robot_ref).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(db.label(robot_ref).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let mut db = ImageDatabase::new();
        db.create_new();
        let order = Rc::new(RefCell::new(vec![]));
        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&order);
            db.subscribe(Box::new(move |event| {
                sink.borrow_mut().push((tag, *event));
            }));
        }
        db.add_image(LabeledImage::new("/a.png"));
        assert_eq!(
            *order.borrow(),
            vec![
                ("first", DbEvent::PreImageAdded(0)),
                ("second", DbEvent::PreImageAdded(0)),
                ("third", DbEvent::PreImageAdded(0)),
                ("first", DbEvent::ImageAdded(0)),
                ("second", DbEvent::ImageAdded(0)),
                ("third", DbEvent::ImageAdded(0)),
            ]
        );
    }

    #[test]
    fn test_clear_resets_to_nonexisting() {
        let mut db = ImageDatabase::new();
        db.create_new();
        db.add_image(LabeledImage::new("/a.png"));
        let events = record_events(&mut db);
        db.clear();
        assert!(!db.exists());
        assert!(!db.modified());
        assert!(db.images().is_empty());
        assert_eq!(
            *events.borrow(),
            vec![DbEvent::PreDatabaseChanged, DbEvent::DatabaseChanged]
        );
        let goal_post = Label::GoalPost(GoalPostLabel { base: (5, 5).into() });
        assert_eq!(db.add_label(0, goal_post).unwrap(), None);
    }

    impl ImageDatabase {
        fn write_state_clean_for_test(&mut self) {
            self.modified = false;
        }
    }
}
