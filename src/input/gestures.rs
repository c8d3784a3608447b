use crate::{
    core::geo::Point,
    input::events::{InputEvent, PointerInput, TouchEventType, TouchPoint},
};
use fxhash::FxHashMap;

/// Configuration for gesture recognition
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Travel (px) before a press turns into a drag
    pub drag_threshold: f64,
    /// Minimum change in finger distance (px) before a pinch zooms
    pub pinch_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            pinch_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct MouseState {
    is_pressed: bool,
    dragging: bool,
    start_position: Option<Point>,
    current_position: Option<Point>,
    target: Option<crate::render::NodeId>,
}

/// Turns raw pointer and touch input into clicks, drags, wheel zooms and
/// pinches.
///
/// A press that travels further than the drag threshold becomes a drag and
/// never a click; two fingers down become a pinch.
pub struct GestureRecognizer {
    pub enabled: bool,
    config: GestureConfig,
    active_touches: FxHashMap<u64, Point>,
    pinch_distance: Option<f64>,
    mouse_state: MouseState,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            enabled: true,
            config,
            active_touches: FxHashMap::default(),
            pinch_distance: None,
            mouse_state: MouseState::default(),
        }
    }

    /// Processes raw input and returns the recognized events
    pub fn process_input(&mut self, input: PointerInput) -> Vec<InputEvent> {
        let mut output_events = Vec::new();
        if !self.enabled {
            return output_events;
        }

        match input {
            PointerInput::Down { position, target } => {
                self.mouse_state = MouseState {
                    is_pressed: true,
                    dragging: false,
                    start_position: Some(position),
                    current_position: Some(position),
                    target,
                };
            }
            PointerInput::Move { position } => self.process_mouse_move(position, &mut output_events),
            PointerInput::Up { position } => self.process_mouse_up(position, &mut output_events),
            PointerInput::Wheel { delta_y, position } => {
                output_events.push(InputEvent::Wheel { delta_y, position });
            }
            PointerInput::DoubleClick { position } => {
                output_events.push(InputEvent::DoubleClick { position });
            }
            PointerInput::Touch { event_type, touches } => {
                self.process_touch_event(event_type, touches, &mut output_events);
            }
        }

        output_events
    }

    fn process_mouse_move(&mut self, position: Point, output_events: &mut Vec<InputEvent>) {
        if !self.mouse_state.is_pressed {
            return;
        }
        let (Some(start), Some(current)) = (self.mouse_state.start_position, self.mouse_state.current_position)
        else {
            return;
        };

        if !self.mouse_state.dragging {
            if position.distance_to(&start) <= self.config.drag_threshold {
                return;
            }
            self.mouse_state.dragging = true;
            output_events.push(InputEvent::DragStart { position: start });
        }

        output_events.push(InputEvent::Drag {
            delta: position.subtract(&current),
        });
        self.mouse_state.current_position = Some(position);
    }

    fn process_mouse_up(&mut self, position: Point, output_events: &mut Vec<InputEvent>) {
        if !self.mouse_state.is_pressed {
            return;
        }
        if self.mouse_state.current_position != Some(position) {
            self.process_mouse_move(position, output_events);
        }

        let state = std::mem::take(&mut self.mouse_state);
        if state.dragging {
            output_events.push(InputEvent::DragEnd);
        } else {
            output_events.push(InputEvent::Click {
                position: state.start_position.unwrap_or(position),
                target: state.target,
            });
        }
    }

    fn process_touch_event(
        &mut self,
        event_type: TouchEventType,
        touches: Vec<TouchPoint>,
        output_events: &mut Vec<InputEvent>,
    ) {
        match event_type {
            TouchEventType::Start => {
                for touch in &touches {
                    self.active_touches.insert(touch.id, touch.position);
                }
                match self.active_touches.len() {
                    1 => {
                        if let Some(touch) = touches.first() {
                            self.process_input(PointerInput::Down {
                                position: touch.position,
                                target: None,
                            });
                        }
                    }
                    2 => {
                        // A second finger cancels any single-finger gesture
                        if std::mem::take(&mut self.mouse_state).dragging {
                            output_events.push(InputEvent::DragEnd);
                        }
                        self.pinch_distance = self.finger_distance();
                    }
                    _ => {}
                }
            }
            TouchEventType::Move => {
                for touch in &touches {
                    if let Some(position) = self.active_touches.get_mut(&touch.id) {
                        *position = touch.position;
                    }
                }
                if self.active_touches.len() >= 2 {
                    self.update_pinch(output_events);
                } else if let Some(touch) = touches.first() {
                    self.process_mouse_move(touch.position, output_events);
                }
            }
            TouchEventType::End | TouchEventType::Cancel => {
                for touch in &touches {
                    self.active_touches.remove(&touch.id);
                }
                if self.active_touches.len() < 2 {
                    self.pinch_distance = None;
                }
                if self.active_touches.is_empty() {
                    match (event_type, touches.first()) {
                        (TouchEventType::End, Some(touch)) => self.process_mouse_up(touch.position, output_events),
                        _ => {
                            if std::mem::take(&mut self.mouse_state).dragging {
                                output_events.push(InputEvent::DragEnd);
                            }
                        }
                    }
                }
            }
        }
    }

    fn finger_distance(&self) -> Option<f64> {
        let mut positions = self.active_touches.values();
        let a = positions.next()?;
        let b = positions.next()?;
        Some(a.distance_to(b))
    }

    fn finger_center(&self) -> Option<Point> {
        let mut positions = self.active_touches.values();
        let a = positions.next()?;
        let b = positions.next()?;
        Some(a.midpoint(b))
    }

    fn update_pinch(&mut self, output_events: &mut Vec<InputEvent>) {
        let (Some(previous), Some(current), Some(center)) =
            (self.pinch_distance, self.finger_distance(), self.finger_center())
        else {
            return;
        };
        if previous <= f64::EPSILON || (current - previous).abs() < self.config.pinch_threshold {
            return;
        }
        output_events.push(InputEvent::Pinch {
            scale: current / previous,
            center,
        });
        self.pinch_distance = Some(current);
    }
}
