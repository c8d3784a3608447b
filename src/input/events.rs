use crate::core::geo::Point;
use crate::render::NodeId;

/// Raw pointer input delivered by the host, in surface pixels
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// Primary button pressed; `target` is the element under the pointer, if known
    Down { position: Point, target: Option<NodeId> },
    Move { position: Point },
    Up { position: Point },
    /// Wheel scroll; positive `delta_y` scrolls down (zooms out)
    Wheel { delta_y: f64, position: Point },
    DoubleClick { position: Point },
    Touch {
        event_type: TouchEventType,
        touches: Vec<TouchPoint>,
    },
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEventType {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

/// Semantic events consumed by the gesture controller
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Press and release without travel
    Click { position: Point, target: Option<NodeId> },
    DoubleClick { position: Point },
    DragStart { position: Point },
    /// Pointer travel since the previous drag event
    Drag { delta: Point },
    DragEnd,
    Wheel { delta_y: f64, position: Point },
    /// Two-finger zoom; `scale` is relative to the previous pinch event
    Pinch { scale: f64, center: Point },
}
