use std::path::Path;

use fieldlab_domain::{to_fl, ErrorKind, FlResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::database::{DbEvent, ImageDatabase, LabeledImage};
use crate::file_util;
use crate::labels::Label;

/// On-disk shape of a saved database. The version of the writing binary is
/// stored alongside so that future readers can branch on it.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct SaveData {
    version: Option<String>,
    images: Vec<LabeledImage>,
}

fn label_value(label: &Label) -> FlResult<Value> {
    match label {
        Label::Ball(l) => serde_json::to_value(l),
        Label::Line(l) => serde_json::to_value(l),
        Label::GoalPost(l) => serde_json::to_value(l),
        Label::Robot(l) => serde_json::to_value(l),
        Label::PenaltySpot(l) => serde_json::to_value(l),
    }
    .map_err(to_fl(ErrorKind::Encode))
}

/// Export key of a label kind, whitespace stripped and every word
/// capitalized, e.g. "Goal Posts" becomes "GoalPosts".
fn type_key(kind_name: &str) -> String {
    kind_name
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

impl ImageDatabase {
    /// Writes the database to `path`. A non-existing database is not written,
    /// the call is a silent no-op then. On success the modified flag is
    /// cleared without any notification.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> FlResult<()> {
        if !self.exists {
            return Ok(());
        }
        let save_data = SaveData {
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            images: self.images.clone(),
        };
        let s = serde_json::to_string(&save_data).map_err(to_fl(ErrorKind::Encode))?;
        file_util::write(path.as_ref(), s)?;
        info!("wrote database to {:?}", path.as_ref());
        self.modified = false;
        Ok(())
    }

    /// Replaces the current contents with the file at `path`. The file is
    /// decoded completely before any state is touched, a decode failure
    /// leaves the database as it was and fires no notification.
    pub fn read_from_file(&mut self, path: impl AsRef<Path>) -> FlResult<()> {
        let s = file_util::read_to_string(path.as_ref())?;
        let save_data =
            serde_json::from_str::<SaveData>(s.as_str()).map_err(to_fl(ErrorKind::Decode))?;
        info!(
            "read database from {:?}, written by version {:?}",
            path.as_ref(),
            save_data.version
        );
        self.emit(DbEvent::PreDatabaseChanged);
        self.images = save_data.images;
        self.exists = true;
        self.modified = false;
        self.emit(DbEvent::DatabaseChanged);
        Ok(())
    }

    /// One-way JSON export for downstream consumers. Per image one object
    /// with the file name and one array of attribute objects per label kind
    /// that was used on it. Kinds appear in case-insensitive alphabetical
    /// order, there is no importer for this format.
    pub fn export_to_json(&self, path: impl AsRef<Path>) -> FlResult<()> {
        if !self.exists {
            return Ok(());
        }
        let mut image_values = vec![];
        for image in &self.images {
            let mut obj = Map::new();
            obj.insert("fileName".to_string(), Value::String(image.path.clone()));
            let mut kinds = image.labels().kinds().collect::<Vec<_>>();
            kinds.sort_by_key(|kind| kind.to_lowercase());
            for kind in kinds {
                let labels = image
                    .labels()
                    .of_kind(kind)
                    .map(|labels| labels.iter().map(label_value).collect())
                    .transpose()?
                    .unwrap_or_default();
                obj.insert(type_key(kind), Value::Array(labels));
            }
            image_values.push(Value::Object(obj));
        }
        let mut root = Map::new();
        root.insert("imageDatabase".to_string(), Value::Array(image_values));
        let s = serde_json::to_string_pretty(&Value::Object(root))
            .map_err(to_fl(ErrorKind::Encode))?;
        file_util::write(path.as_ref(), s)?;
        info!("exported database to {:?}", path.as_ref());
        Ok(())
    }
}
