pub mod candidate;
pub mod focus_layout;
pub mod format;
pub mod point;
pub mod rect;

pub use candidate::BarcodeCandidate;
pub use focus_layout::{FocusAreaLayout, FrameSize};
pub use format::BarcodeFormat;
pub use point::Point;
pub use rect::Rect;
