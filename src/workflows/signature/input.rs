//! Pointer tracking, independent of any rendering surface.

use serde::{Deserialize, Serialize};

/// Surface-local position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Top-left corner of the drawing surface in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
}

/// A mouse/pen event or a touch event, both in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    Mouse { client_x: f32, client_y: f32 },
    Touch { touches: Vec<Point> },
}

impl PointerInput {
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        PointerInput::Mouse { client_x, client_y }
    }

    pub fn touch(client_x: f32, client_y: f32) -> Self {
        PointerInput::Touch {
            touches: vec![Point::new(client_x, client_y)],
        }
    }

    /// Client position of the pointer, or of the first touch. A touch event
    /// without touches (e.g. `touchend`) has none.
    pub fn client_position(&self) -> Option<Point> {
        match self {
            PointerInput::Mouse { client_x, client_y } => Some(Point::new(*client_x, *client_y)),
            PointerInput::Touch { touches } => touches.first().copied(),
        }
    }

    pub fn to_local(&self, bounds: SurfaceBounds) -> Option<Point> {
        self.client_position()
            .map(|client| Point::new(client.x - bounds.left, client.y - bounds.top))
    }
}

/// One pen-down-to-pen-up path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Records strokes as the pointer moves.
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    strokes: Vec<Stroke>,
    drawing: bool,
    has_content: bool,
}

impl StrokeRecorder {
    pub fn begin_stroke(&mut self, point: Point) {
        self.strokes.push(Stroke {
            points: vec![point],
        });
        self.drawing = true;
    }

    /// Appends a segment to the open stroke. Ignored between strokes.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        if !self.drawing {
            return false;
        }
        match self.strokes.last_mut() {
            Some(stroke) => {
                stroke.points.push(point);
                self.has_content = true;
                true
            }
            None => false,
        }
    }

    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// True once any segment has been drawn, until [`StrokeRecorder::clear`].
    pub fn has_content(&self) -> bool {
        self.has_content
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.drawing = false;
        self.has_content = false;
    }
}
