use fieldlab_domain::{flerr, FlError, FlResult, PtI, TPtI};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::warn;

pub const BALLS_NAME: &str = "Balls";
pub const LINES_NAME: &str = "Lines";
pub const GOAL_POSTS_NAME: &str = "Goal Posts";
pub const ROBOTS_NAME: &str = "Robots";
pub const PENALTY_SPOTS_NAME: &str = "Penalty Spots";

/// Jersey color of an annotated robot. Serialized as its ordinal so that the
/// database files and the json export stay compatible across renames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TeamColor {
    #[default]
    None = 0,
    Blue = 1,
    Red = 2,
    Yellow = 3,
    Black = 4,
    White = 5,
    Green = 6,
    Orange = 7,
    Purple = 8,
    Brown = 9,
    Gray = 10,
}

const TEAM_COLORS: [TeamColor; 11] = [
    TeamColor::None,
    TeamColor::Blue,
    TeamColor::Red,
    TeamColor::Yellow,
    TeamColor::Black,
    TeamColor::White,
    TeamColor::Green,
    TeamColor::Orange,
    TeamColor::Purple,
    TeamColor::Brown,
    TeamColor::Gray,
];

impl TeamColor {
    pub fn name(&self) -> &'static str {
        match self {
            TeamColor::None => "NONE",
            TeamColor::Blue => "BLUE",
            TeamColor::Red => "RED",
            TeamColor::Yellow => "YELLOW",
            TeamColor::Black => "BLACK",
            TeamColor::White => "WHITE",
            TeamColor::Green => "GREEN",
            TeamColor::Orange => "ORANGE",
            TeamColor::Purple => "PURPLE",
            TeamColor::Brown => "BROWN",
            TeamColor::Gray => "GRAY",
        }
    }
}
impl From<TeamColor> for u8 {
    fn from(tc: TeamColor) -> u8 {
        tc as u8
    }
}
impl TryFrom<u8> for TeamColor {
    type Error = FlError;
    fn try_from(ordinal: u8) -> FlResult<Self> {
        TEAM_COLORS
            .get(ordinal as usize)
            .copied()
            .ok_or_else(|| flerr!(Decode, "no team color with ordinal {}", ordinal))
    }
}
impl FromStr for TeamColor {
    type Err = FlError;
    /// Accepts the symbolic enumerant name (case-insensitive) or the ordinal.
    fn from_str(s: &str) -> FlResult<Self> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<u8>() {
            return TeamColor::try_from(ordinal)
                .map_err(|_| flerr!(TypeMismatch, "no team color with ordinal {}", ordinal));
        }
        TEAM_COLORS
            .iter()
            .find(|tc| tc.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| flerr!(TypeMismatch, "'{}' is not a team color", s))
    }
}
impl Display for TeamColor {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BallLabel {
    pub center: PtI,
    pub radius: TPtI,
    pub blurred: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineLabel {
    pub start: PtI,
    pub end: PtI,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GoalPostLabel {
    pub base: PtI,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RobotLabel {
    pub top_left: PtI,
    pub bottom_right: PtI,
    pub team_color: TeamColor,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PenaltySpotLabel {
    pub spot: PtI,
}

macro_rules! variant_access {
    ($variant:ident, $func_name:ident, $self:ty, $return_type:ty) => {
        pub fn $func_name(self: $self) -> FlResult<$return_type> {
            match self {
                Label::$variant(x) => Ok(x),
                _ => Err(flerr!(
                    TypeMismatch,
                    "this is not a {}",
                    stringify!($variant)
                )),
            }
        }
    };
}

/// One concrete annotated shape on one image. Each variant is a plain bag of
/// attributes fixed at construction time, only values change afterwards.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    Ball(BallLabel),
    Line(LineLabel),
    GoalPost(GoalPostLabel),
    Robot(RobotLabel),
    PenaltySpot(PenaltySpotLabel),
}
impl Label {
    variant_access!(Ball, ball, &Self, &BallLabel);
    variant_access!(Line, line, &Self, &LineLabel);
    variant_access!(GoalPost, goal_post, &Self, &GoalPostLabel);
    variant_access!(Robot, robot, &Self, &RobotLabel);
    variant_access!(PenaltySpot, penalty_spot, &Self, &PenaltySpotLabel);
    variant_access!(Ball, ball_mut, &mut Self, &mut BallLabel);
    variant_access!(Line, line_mut, &mut Self, &mut LineLabel);
    variant_access!(GoalPost, goal_post_mut, &mut Self, &mut GoalPostLabel);
    variant_access!(Robot, robot_mut, &mut Self, &mut RobotLabel);
    variant_access!(PenaltySpot, penalty_spot_mut, &mut Self, &mut PenaltySpotLabel);

    pub fn kind_name(&self) -> &'static str {
        match self {
            Label::Ball(_) => BALLS_NAME,
            Label::Line(_) => LINES_NAME,
            Label::GoalPost(_) => GOAL_POSTS_NAME,
            Label::Robot(_) => ROBOTS_NAME,
            Label::PenaltySpot(_) => PENALTY_SPOTS_NAME,
        }
    }
}

fn check_arity(name: &str, required: usize, points: &[PtI]) -> FlResult<()> {
    if points.len() == required {
        Ok(())
    } else {
        Err(flerr!(
            Arity,
            "{} needs {} clicks, got {}",
            name,
            required,
            points.len()
        ))
    }
}

impl BallLabel {
    /// First click is the center, the truncated distance to the second click
    /// the radius.
    pub fn from_clicks(points: &[PtI]) -> FlResult<Label> {
        check_arity(BALLS_NAME, 2, points)?;
        Ok(Label::Ball(BallLabel {
            center: points[0],
            radius: points[0].trunc_dist(&points[1]),
            blurred: false,
        }))
    }
    pub fn descriptor() -> LabelKindDescriptor {
        LabelKindDescriptor {
            name: BALLS_NAME,
            icon_ref: "icons/ball.png",
            required_clicks: 2,
            construct: Self::from_clicks,
        }
    }
}
impl LineLabel {
    pub fn from_clicks(points: &[PtI]) -> FlResult<Label> {
        check_arity(LINES_NAME, 2, points)?;
        Ok(Label::Line(LineLabel {
            start: points[0],
            end: points[1],
        }))
    }
    pub fn descriptor() -> LabelKindDescriptor {
        LabelKindDescriptor {
            name: LINES_NAME,
            icon_ref: "icons/line.png",
            required_clicks: 2,
            construct: Self::from_clicks,
        }
    }
}
impl GoalPostLabel {
    pub fn from_clicks(points: &[PtI]) -> FlResult<Label> {
        check_arity(GOAL_POSTS_NAME, 1, points)?;
        Ok(Label::GoalPost(GoalPostLabel { base: points[0] }))
    }
    pub fn descriptor() -> LabelKindDescriptor {
        LabelKindDescriptor {
            name: GOAL_POSTS_NAME,
            icon_ref: "icons/goal_post.png",
            required_clicks: 1,
            construct: Self::from_clicks,
        }
    }
}
impl RobotLabel {
    /// Corners are taken verbatim in click order.
    pub fn from_clicks(points: &[PtI]) -> FlResult<Label> {
        check_arity(ROBOTS_NAME, 2, points)?;
        Ok(Label::Robot(RobotLabel {
            top_left: points[0],
            bottom_right: points[1],
            team_color: TeamColor::None,
        }))
    }
    pub fn descriptor() -> LabelKindDescriptor {
        LabelKindDescriptor {
            name: ROBOTS_NAME,
            icon_ref: "icons/robot.png",
            required_clicks: 2,
            construct: Self::from_clicks,
        }
    }
}
impl PenaltySpotLabel {
    pub fn from_clicks(points: &[PtI]) -> FlResult<Label> {
        check_arity(PENALTY_SPOTS_NAME, 1, points)?;
        Ok(Label::PenaltySpot(PenaltySpotLabel { spot: points[0] }))
    }
    pub fn descriptor() -> LabelKindDescriptor {
        LabelKindDescriptor {
            name: PENALTY_SPOTS_NAME,
            icon_ref: "icons/penalty_spot.png",
            required_clicks: 1,
            construct: Self::from_clicks,
        }
    }
}

/// Immutable description of one registered label kind.
#[derive(Clone, Copy, Debug)]
pub struct LabelKindDescriptor {
    pub name: &'static str,
    pub icon_ref: &'static str,
    pub required_clicks: usize,
    pub construct: fn(&[PtI]) -> FlResult<Label>,
}

/// Ordered, open set of label kinds. The store stays decoupled from how many
/// kinds exist, new kinds register here at startup without touching it.
#[derive(Clone, Debug)]
pub struct LabelRegistry {
    descriptors: Vec<LabelKindDescriptor>,
}
impl LabelRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: vec![],
        }
    }
    /// Registers a kind at most once per name, kept sorted case-insensitively
    /// for stable UI ordering.
    pub fn register(&mut self, descriptor: LabelKindDescriptor) {
        if self
            .descriptors
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(descriptor.name))
        {
            warn!("label kind '{}' is already registered", descriptor.name);
            return;
        }
        let insertion_idx = self
            .descriptors
            .partition_point(|d| d.name.to_lowercase() < descriptor.name.to_lowercase());
        self.descriptors.insert(insertion_idx, descriptor);
    }
    pub fn all(&self) -> &[LabelKindDescriptor] {
        &self.descriptors
    }
    pub fn get(&self, kind_name: &str) -> FlResult<&LabelKindDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name == kind_name)
            .ok_or_else(|| flerr!(NotFound, "no label kind '{}' registered", kind_name))
    }
    pub fn construct(&self, kind_name: &str, points: &[PtI]) -> FlResult<Label> {
        let descriptor = self.get(kind_name)?;
        check_arity(descriptor.name, descriptor.required_clicks, points)?;
        (descriptor.construct)(points)
    }
}
impl Default for LabelRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(BallLabel::descriptor());
        registry.register(LineLabel::descriptor());
        registry.register(GoalPostLabel::descriptor());
        registry.register(RobotLabel::descriptor());
        registry.register(PenaltySpotLabel::descriptor());
        registry
    }
}
