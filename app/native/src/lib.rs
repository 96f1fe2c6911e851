//! ZoneSnap - snap windows into named screen zones.
//!
//! Zones are percentage rectangles grouped into layouts and resolved against
//! every detected monitor. Windows are snapped by dragging them over the zone
//! overlay, by zone and number keys held during a drag, or by hotkeys.
//!
//! Native window manipulation is injected through the traits in [`platform`];
//! [`platform::headless`] provides an in-memory desktop for tests and dry runs.
//! [`engine::ZoneSnap`] ties the components together into a running service.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod platform;
pub mod schema;
pub mod snap;
pub mod tracker;
pub mod utils;
pub mod zones;

pub use engine::ZoneSnap;
pub use error::ZoneSnapError;
