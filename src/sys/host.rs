//! The windowing host as seen from this crate.
//!
//! The host owns real windows, geometry and rendering. It reports lifecycle
//! changes as reactor events and receives arrangements back through
//! [`Host::apply`].

use serde::{Deserialize, Serialize};

use crate::layout_engine::{Direction, EventResponse};
use crate::model::ids::{SurfaceId, WindowHandle};

/// Properties of a host window, sampled when the window is reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowInfo {
    /// Durable window id, if the host exposes one.
    pub host_id: Option<u64>,
    pub class: String,
    pub title: String,
    pub role: String,
    pub activity: Option<String>,
    pub desktop: u32,
    pub screen: u32,
    /// Dialogs, toolbars, splash screens and the like.
    pub utility: bool,
    pub minimized: bool,
}

impl WindowInfo {
    pub fn surface(&self) -> SurfaceId { SurfaceId::new(self.desktop, self.screen) }
}

/// Desktop and screen counts plus the surface holding focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub desktops: u32,
    pub screens: u32,
    pub current: SurfaceId,
}

impl Default for Topology {
    fn default() -> Self { Self::new(1, 1) }
}

impl Topology {
    pub fn new(desktops: u32, screens: u32) -> Self {
        Self {
            desktops: desktops.max(1),
            screens: screens.max(1),
            current: SurfaceId::new(0, 0),
        }
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        surface.desktop < self.desktops && surface.screen < self.screens
    }

    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + use<> {
        let screens = self.screens;
        (0..self.desktops)
            .flat_map(move |desktop| (0..screens).map(move |screen| SurfaceId::new(desktop, screen)))
    }

    /// Surfaces of the current desktop, one per screen.
    pub fn visible_surfaces(&self) -> impl Iterator<Item = SurfaceId> + use<> {
        let desktop = self.current.desktop;
        (0..self.screens).map(move |screen| SurfaceId::new(desktop, screen))
    }

    /// Left and right move between screens, up and down between desktops.
    pub fn neighbor(&self, surface: SurfaceId, direction: Direction) -> Option<SurfaceId> {
        let SurfaceId { desktop, screen } = surface;
        let target = match direction {
            Direction::Left => SurfaceId::new(desktop, screen.checked_sub(1)?),
            Direction::Right => SurfaceId::new(desktop, screen + 1),
            Direction::Up => SurfaceId::new(desktop.checked_sub(1)?, screen),
            Direction::Down => SurfaceId::new(desktop + 1, screen),
        };
        self.contains(target).then_some(target)
    }
}

/// Receives the command catalogue at startup.
pub trait ShortcutRegistrar {
    fn register_shortcut(&mut self, id: &str, description: &str, keybinding: &str);
}

pub trait Host: ShortcutRegistrar + Send {
    fn active_window(&self) -> Option<WindowHandle>;

    fn set_active_window(&mut self, handle: WindowHandle);

    /// Every window the host currently knows about.
    fn windows(&self) -> Vec<(WindowHandle, WindowInfo)>;

    fn topology(&self) -> Topology;

    /// Carries out arrangements, focus changes and layout actions.
    fn apply(&mut self, response: &EventResponse);
}
