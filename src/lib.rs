//! Assignment and persistence core of a tiling window manager.
//!
//! The host windowing environment reports window and surface lifecycle events
//! to the [`actor::reactor::Reactor`], which keeps the window → surface → group
//! mapping coherent and persists it through [`model::store::PersistentStore`].

pub mod actor;
pub mod common;
pub mod layout_engine;
pub mod model;
pub mod sys;
