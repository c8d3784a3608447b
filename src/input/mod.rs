pub mod controller;
pub mod events;
pub mod gestures;
pub mod zoom;

pub use controller::{AxisMask, GestureController, GestureOutcome};
pub use events::{InputEvent, PointerInput, TouchEventType, TouchPoint};
pub use gestures::{GestureConfig, GestureRecognizer};
pub use zoom::{ZoomBehavior, ZoomTransform};
