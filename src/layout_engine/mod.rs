//! Window assignment and layout selection.
//!
//! Geometry is not computed here. The engine decides which windows a surface
//! shows, which layout kind arranges them and in what order; the layout
//! strategies on the host side turn that into frames.

mod engine;
mod window;

pub use engine::{Arrangement, AssignmentEngine, EventResponse, LayoutCommand, LayoutRequest};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
pub use window::{ManagedWindow, WindowFlags, WindowMode, WindowRecord};

/// The built-in arrangement strategies, in their default cycling order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutKind {
    Tile,
    Monocle,
    ThreeColumn,
    Spread,
    Stair,
    Spiral,
    Quarter,
    Floating,
    Cascade,
}

impl LayoutKind {
    pub fn default_order() -> Vec<LayoutKind> { Self::iter().collect() }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Next,
    Previous,
}

impl Step {
    /// Moves `index` one step within `0..len`, wrapping at both ends.
    pub fn apply(self, index: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        match self {
            Step::Next => (index + 1) % len,
            Step::Previous => (index + len - 1) % len,
        }
    }
}

/// A request owned by the active layout strategy. The engine forwards these
/// without interpreting them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAction {
    Focus(Direction),
    Move(Direction),
    GrowWidth,
    ShrinkWidth,
    GrowHeight,
    ShrinkHeight,
    IncreaseMasterCount,
    DecreaseMasterCount,
    IncreaseMasterSize,
    DecreaseMasterSize,
    Rotate,
    RotateReverse,
    RotatePart,
}
