//! Snapping: the drag state machine, key-driven targeting, hotkeys and the
//! overlay.

pub mod drag;
pub mod executor;
pub mod hotkeys;
pub mod overlay;
pub mod target;

pub use drag::{DragCommand, DragHandle, DragMachine, DragParts, DragPhase, DragSettings, TickOutcome};
pub use executor::{SnapExecutor, SnapOrigin, SnapOutcome};
pub use hotkeys::{Combo, HotkeyAction, HotkeyDispatcher, HotkeyMap};
pub use overlay::{OverlayController, OverlayFrame};
pub use target::{SnapInput, fallback_monitor};
