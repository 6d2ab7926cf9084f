pub mod converted;
pub mod preview_pane;
pub mod style;
pub mod window;
