use fieldlab_domain::{flerr, FlResult, PtI, TPtI};
use std::fmt::{self, Display, Formatter};

use crate::database::{ImageDatabase, LabelRef};
use crate::labels::{
    Label, TeamColor, BALLS_NAME, GOAL_POSTS_NAME, LINES_NAME, PENALTY_SPOTS_NAME, ROBOTS_NAME,
};

/// Typed value of one label property. Rendered and parsed as text at the edit
/// surface, typed everywhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropVal {
    Int(TPtI),
    Bool(bool),
    Point(PtI),
    TeamColor(TeamColor),
}

impl PropVal {
    pub fn as_int(self) -> FlResult<TPtI> {
        match self {
            PropVal::Int(x) => Ok(x),
            _ => Err(flerr!(TypeMismatch, "{} is not an integer", self)),
        }
    }
    pub fn as_bool(self) -> FlResult<bool> {
        match self {
            PropVal::Bool(x) => Ok(x),
            _ => Err(flerr!(TypeMismatch, "{} is not a boolean", self)),
        }
    }
    pub fn as_point(self) -> FlResult<PtI> {
        match self {
            PropVal::Point(x) => Ok(x),
            _ => Err(flerr!(TypeMismatch, "{} is not a point", self)),
        }
    }
    pub fn as_team_color(self) -> FlResult<TeamColor> {
        match self {
            PropVal::TeamColor(x) => Ok(x),
            _ => Err(flerr!(TypeMismatch, "{} is not a team color", self)),
        }
    }
    /// Parses `text` into a value of the same variant as `self`. Parsing is
    /// strict per variant, anything that does not read back exactly is a
    /// TypeMismatch error.
    pub fn parse_like(self, text: &str) -> FlResult<PropVal> {
        let text = text.trim();
        match self {
            PropVal::Int(_) => text
                .parse::<TPtI>()
                .map(PropVal::Int)
                .map_err(|_| flerr!(TypeMismatch, "'{}' is not an integer", text)),
            PropVal::Bool(_) => match text {
                _ if text.eq_ignore_ascii_case("true") => Ok(PropVal::Bool(true)),
                _ if text.eq_ignore_ascii_case("false") => Ok(PropVal::Bool(false)),
                _ => Err(flerr!(TypeMismatch, "'{}' is not a boolean", text)),
            },
            PropVal::Point(_) => parse_point(text).map(PropVal::Point),
            PropVal::TeamColor(_) => text.parse::<TeamColor>().map(PropVal::TeamColor),
        }
    }
}

impl Display for PropVal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PropVal::Int(x) => write!(f, "{x}"),
            PropVal::Bool(x) => write!(f, "{x}"),
            PropVal::Point(p) => write!(f, "({}, {})", p.x, p.y),
            PropVal::TeamColor(tc) => write!(f, "{tc}"),
        }
    }
}

/// Accepts "x, y" with optional surrounding parentheses or brackets.
fn parse_point(text: &str) -> FlResult<PtI> {
    let inner = text
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .or_else(|| text.strip_prefix('[').and_then(|s| s.strip_suffix(']')))
        .unwrap_or(text);
    let mk_err = || flerr!(TypeMismatch, "'{}' is not a point", text);
    let (x, y) = inner.split_once(',').ok_or_else(mk_err)?;
    let x = x.trim().parse::<TPtI>().map_err(|_| mk_err())?;
    let y = y.trim().parse::<TPtI>().map_err(|_| mk_err())?;
    Ok(PtI { x, y })
}

/// One editable property of a label kind, a display name plus typed
/// accessors. Rows of a kind's table appear in declaration order.
#[derive(Clone, Copy)]
pub struct PropDescriptor {
    pub name: &'static str,
    pub get: fn(&Label) -> FlResult<PropVal>,
    pub set: fn(&mut Label, PropVal) -> FlResult<()>,
}

const BALL_PROPS: [PropDescriptor; 3] = [
    PropDescriptor {
        name: "center",
        get: |label| Ok(PropVal::Point(label.ball()?.center)),
        set: |label, val| {
            label.ball_mut()?.center = val.as_point()?;
            Ok(())
        },
    },
    PropDescriptor {
        name: "radius",
        get: |label| Ok(PropVal::Int(label.ball()?.radius)),
        set: |label, val| {
            label.ball_mut()?.radius = val.as_int()?;
            Ok(())
        },
    },
    PropDescriptor {
        name: "blurred",
        get: |label| Ok(PropVal::Bool(label.ball()?.blurred)),
        set: |label, val| {
            label.ball_mut()?.blurred = val.as_bool()?;
            Ok(())
        },
    },
];

const LINE_PROPS: [PropDescriptor; 2] = [
    PropDescriptor {
        name: "start",
        get: |label| Ok(PropVal::Point(label.line()?.start)),
        set: |label, val| {
            label.line_mut()?.start = val.as_point()?;
            Ok(())
        },
    },
    PropDescriptor {
        name: "end",
        get: |label| Ok(PropVal::Point(label.line()?.end)),
        set: |label, val| {
            label.line_mut()?.end = val.as_point()?;
            Ok(())
        },
    },
];

const GOAL_POST_PROPS: [PropDescriptor; 1] = [PropDescriptor {
    name: "base",
    get: |label| Ok(PropVal::Point(label.goal_post()?.base)),
    set: |label, val| {
        label.goal_post_mut()?.base = val.as_point()?;
        Ok(())
    },
}];

const ROBOT_PROPS: [PropDescriptor; 3] = [
    PropDescriptor {
        name: "topLeft",
        get: |label| Ok(PropVal::Point(label.robot()?.top_left)),
        set: |label, val| {
            label.robot_mut()?.top_left = val.as_point()?;
            Ok(())
        },
    },
    PropDescriptor {
        name: "bottomRight",
        get: |label| Ok(PropVal::Point(label.robot()?.bottom_right)),
        set: |label, val| {
            label.robot_mut()?.bottom_right = val.as_point()?;
            Ok(())
        },
    },
    PropDescriptor {
        name: "teamColor",
        get: |label| Ok(PropVal::TeamColor(label.robot()?.team_color)),
        set: |label, val| {
            label.robot_mut()?.team_color = val.as_team_color()?;
            Ok(())
        },
    },
];

const PENALTY_SPOT_PROPS: [PropDescriptor; 1] = [PropDescriptor {
    name: "spot",
    get: |label| Ok(PropVal::Point(label.penalty_spot()?.spot)),
    set: |label, val| {
        label.penalty_spot_mut()?.spot = val.as_point()?;
        Ok(())
    },
}];

pub fn prop_descriptors(kind_name: &str) -> FlResult<&'static [PropDescriptor]> {
    match kind_name {
        BALLS_NAME => Ok(&BALL_PROPS),
        LINES_NAME => Ok(&LINE_PROPS),
        GOAL_POSTS_NAME => Ok(&GOAL_POST_PROPS),
        ROBOTS_NAME => Ok(&ROBOT_PROPS),
        PENALTY_SPOTS_NAME => Ok(&PENALTY_SPOT_PROPS),
        _ => Err(flerr!(
            NotFound,
            "no properties for label kind '{}'",
            kind_name
        )),
    }
}

fn prop_descriptor(kind_name: &str, prop_name: &str) -> FlResult<&'static PropDescriptor> {
    prop_descriptors(kind_name)?
        .iter()
        .find(|d| d.name == prop_name)
        .ok_or_else(|| flerr!(NotFound, "{} has no property '{}'", kind_name, prop_name))
}

/// All name/value rows of the referenced label, in table order.
pub fn prop_rows(
    db: &ImageDatabase,
    label_ref: LabelRef,
) -> FlResult<Vec<(&'static str, PropVal)>> {
    let label = db.label(label_ref)?;
    prop_descriptors(label.kind_name())?
        .iter()
        .map(|d| Ok((d.name, (d.get)(label)?)))
        .collect()
}

pub fn get_prop(db: &ImageDatabase, label_ref: LabelRef, prop_name: &str) -> FlResult<PropVal> {
    let label = db.label(label_ref)?;
    let descriptor = prop_descriptor(label.kind_name(), prop_name)?;
    (descriptor.get)(label)
}

/// Parses `text` against the property's current type and writes it back.
/// A successful write is broadcast as exactly one label-changed event, a
/// failed parse leaves the label untouched and fires nothing.
pub fn set_prop(
    db: &mut ImageDatabase,
    label_ref: LabelRef,
    prop_name: &str,
    text: &str,
) -> FlResult<()> {
    let label = db.label(label_ref)?;
    let descriptor = prop_descriptor(label.kind_name(), prop_name)?;
    let parsed = (descriptor.get)(label)?.parse_like(text)?;
    (descriptor.set)(db.label_mut(label_ref)?, parsed)?;
    db.change_label(label_ref)
}
