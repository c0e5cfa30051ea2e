use std::fmt;
use std::num::NonZeroU8;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// Number of window groups. Group ids are `1..=MAX_GROUPS`.
pub const MAX_GROUPS: u8 = 20;

/// Opaque host-side window handle. Only meaningful while the host keeps the
/// window alive; may be reused by the host afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub const fn new(raw: u64) -> Self { Self(raw) }

    pub const fn get(self) -> u64 { self.0 }
}

/// Internal window identifier. Keys persisted window state and the window list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(raw: u64) -> Self { Self(raw) }

    pub const fn get(self) -> u64 { self.0 }

    /// Key used for this window inside the window states document.
    pub fn key(self) -> String { self.0.to_string() }

    pub fn from_key(key: &str) -> Option<Self> { key.parse().ok().map(Self) }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("group id {0} is outside 1..={MAX_GROUPS}")]
    OutOfRange(i64),
}

/// A window group label in `1..=MAX_GROUPS`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct GroupId(NonZeroU8);

impl GroupId {
    pub const FIRST: GroupId = GroupId(NonZeroU8::MIN);

    pub fn new(raw: i64) -> Result<Self, GroupError> {
        if !(1..=i64::from(MAX_GROUPS)).contains(&raw) {
            return Err(GroupError::OutOfRange(raw));
        }
        NonZeroU8::new(raw as u8).map(Self).ok_or(GroupError::OutOfRange(raw))
    }

    pub const fn get(self) -> u8 { self.0.get() }

    /// The following group, wrapping from the last group back to the first.
    pub fn next(self) -> GroupId {
        if self.get() >= MAX_GROUPS {
            Self::FIRST
        } else {
            Self::new(i64::from(self.get()) + 1).unwrap_or(Self::FIRST)
        }
    }

    pub fn all() -> impl Iterator<Item = GroupId> {
        (1..=i64::from(MAX_GROUPS)).filter_map(|raw| Self::new(raw).ok())
    }
}

impl TryFrom<i64> for GroupId {
    type Error = GroupError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> { Self::new(raw) }
}

impl From<GroupId> for i64 {
    fn from(group: GroupId) -> Self { i64::from(group.get()) }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "GroupId({})", self.get()) }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.get()) }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceIdError {
    #[error("surface id {0:?} is not of the form <desktop>:<screen>")]
    Malformed(String),
}

/// One tileable area: a (desktop, screen) pair. Encoded as `"<desktop>:<screen>"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct SurfaceId {
    pub desktop: u32,
    pub screen: u32,
}

impl SurfaceId {
    pub const fn new(desktop: u32, screen: u32) -> Self { Self { desktop, screen } }

    /// Group a surface shows when nothing was ever assigned to it.
    pub fn default_group(self) -> GroupId {
        let raw = (u64::from(self.desktop) * 5 + u64::from(self.screen)) % u64::from(MAX_GROUPS);
        GroupId::new(raw as i64 + 1).unwrap_or(GroupId::FIRST)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.desktop, self.screen)
    }
}

impl FromStr for SurfaceId {
    type Err = SurfaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SurfaceIdError::Malformed(s.to_string());
        let (desktop, screen) = s.split_once(':').ok_or_else(malformed)?;
        Ok(SurfaceId {
            desktop: desktop.trim().parse().map_err(|_| malformed())?,
            screen: screen.trim().parse().map_err(|_| malformed())?,
        })
    }
}
