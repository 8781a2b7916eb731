//! Drawing-primitive records emitted by the layout engine.
//!
//! The layout engine produces a `Vec<DrawCommand>`; serializers consume the
//! list sequentially. Each command carries all the data it needs, so the
//! geometry stage has no dependency on any rendering backend.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// A single, stateless render instruction.
///
/// Colors are CSS color strings (names or hex), passed through to the
/// serializer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// A filled rectangle (a covered segment bar).
    FillRect { rect: Rect, color: String },

    /// A stroked, unfilled rectangle (a sequence outline).
    StrokeRect { rect: Rect, color: String },

    /// A line segment (tick marks, the bounding box).
    Line {
        from: Point,
        to: Point,
        color: String,
    },

    /// A text string anchored at a position.
    Text {
        position: Point,
        text: String,
        color: String,
        font_size: f64,
    },
}
