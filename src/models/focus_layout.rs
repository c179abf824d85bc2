//! Focus area geometry as the UI layer describes it
//!
//! The UI configures a focus area by size and by a center position given in
//! percent of the preview. This module turns that description into a
//! [`Rect`] in view coordinates, which is what the spatial filter consumes.

use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// Default side length of a square focus area, in density-independent units
pub const DEFAULT_FOCUS_SIZE: f32 = 300.0;

/// Focus area size: a square side or an explicit width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameSize {
    /// Square with the given side
    Square(f32),
    /// Rectangle with independent width and height
    Rectangle {
        /// Width
        width: f32,
        /// Height
        height: f32,
    },
}

impl FrameSize {
    /// Width and height before density scaling
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            FrameSize::Square(side) => (side, side),
            FrameSize::Rectangle { width, height } => (width, height),
        }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        FrameSize::Square(DEFAULT_FOCUS_SIZE)
    }
}

/// Size and placement of the focus area inside the preview
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusAreaLayout {
    /// Size in density-independent units
    pub size: FrameSize,
    /// Center in percent of the view (0-100 on each axis)
    pub position: Point,
}

impl Default for FocusAreaLayout {
    fn default() -> Self {
        Self {
            size: FrameSize::default(),
            position: Point::new(50.0, 50.0),
        }
    }
}

impl FocusAreaLayout {
    /// Resolve the layout against a view of `view_width` x `view_height`
    ///
    /// `density` scales the configured size into view units. Returns `None`
    /// when the resulting rectangle is empty, which callers treat as "no
    /// focus area".
    pub fn resolve(&self, view_width: f32, view_height: f32, density: f32) -> Option<Rect> {
        let position = self.position.clamp(0.0, 100.0);
        let center = Point::new(
            view_width * position.x / 100.0,
            view_height * position.y / 100.0,
        );
        let (w, h) = self.size.dimensions();
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        let rect = Rect::centered(center, w.max(0.0) * density, h.max(0.0) * density);
        if rect.is_empty() { None } else { Some(rect) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_centered_square() {
        let rect = FocusAreaLayout::default()
            .resolve(1000.0, 2000.0, 1.0)
            .unwrap();
        assert_eq!(rect, Rect::new(350.0, 850.0, 650.0, 1150.0));
    }

    #[test]
    fn density_scales_size() {
        let layout = FocusAreaLayout {
            size: FrameSize::Rectangle {
                width: 100.0,
                height: 50.0,
            },
            ..Default::default()
        };
        let rect = layout.resolve(400.0, 400.0, 2.0).unwrap();
        assert_eq!(rect.width(), 200.0);
        assert_eq!(rect.height(), 100.0);
    }

    #[test]
    fn position_is_clamped_to_percent_range() {
        let layout = FocusAreaLayout {
            size: FrameSize::Square(10.0),
            position: Point::new(150.0, -20.0),
        };
        let rect = layout.resolve(200.0, 100.0, 1.0).unwrap();
        assert_eq!(rect.center(), Point::new(200.0, 0.0));
    }

    #[test]
    fn zero_size_resolves_to_none() {
        let layout = FocusAreaLayout {
            size: FrameSize::Square(0.0),
            ..Default::default()
        };
        assert!(layout.resolve(100.0, 100.0, 1.0).is_none());
    }

    #[test]
    fn size_accepts_number_or_object() {
        let square: FrameSize = serde_json::from_str("250").unwrap();
        assert_eq!(square, FrameSize::Square(250.0));
        let rect: FrameSize = serde_json::from_str(r#"{"width":300,"height":120}"#).unwrap();
        assert_eq!(rect.dimensions(), (300.0, 120.0));
    }
}
