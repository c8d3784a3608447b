pub mod controls;

pub use controls::{populate_projection_dropdown, toggle_settings_panel, ACTIVE_CLASS};
