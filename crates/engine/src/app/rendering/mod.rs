mod draw_list;

pub use draw_list::{DrawCommand, OverlayColor, RenderList};
