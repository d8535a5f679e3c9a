//! Bus-level drivers for the dial's touch controller and round panel.

pub mod ft3267;
pub mod gc9a01;

pub use ft3267::{Ft3267, TouchError, TouchInitStatus, FT3267_ADDR};
pub use gc9a01::{Gc9a01, PanelError, PANEL_HEIGHT, PANEL_WIDTH};
