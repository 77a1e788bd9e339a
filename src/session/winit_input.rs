//! Adapter from winit window events to session input.

use std::time::{Duration, Instant};

use log::trace;
use winit::event::{ElementState, MouseButton, WindowEvent};

use super::input::{InputEvent, InputSource, PointerButton, PointerEvent, CLICK_TOLERANCE};

/// Two left clicks closer than this in time form a double click
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(300);

/// Collects pointer and resize events from a winit window.
///
/// Feed it from `ApplicationHandler::window_event`; the session drains it on
/// every tick. Double clicks are detected here because winit does not report
/// them.
#[derive(Debug)]
pub struct WinitInput {
    cursor: (f64, f64),
    pending: Vec<InputEvent>,
    press: Option<(f64, f64)>,
    last_click: Option<(Instant, f64, f64)>,
}

impl Default for WinitInput {
    fn default() -> Self {
        Self::new()
    }
}

impl WinitInput {
    pub fn new() -> Self {
        Self {
            cursor: (0.0, 0.0),
            pending: Vec::new(),
            press: None,
            last_click: None,
        }
    }

    /// Translate a window event; returns whether it was consumed
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x, position.y);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_input(*state, *button, Instant::now());
                true
            }
            WindowEvent::Resized(size) => {
                self.resized(size.width, size.height);
                true
            }
            _ => false,
        }
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
        self.pending
            .push(InputEvent::PointerMove(PointerEvent::new(x, y, PointerButton::Left)));
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton, now: Instant) {
        let (x, y) = self.cursor;
        let event = PointerEvent::new(x, y, convert_button(button));

        match state {
            ElementState::Pressed => {
                if button == MouseButton::Left {
                    self.press = Some((x, y));
                }
                self.pending.push(InputEvent::PointerDown(event));
            }
            ElementState::Released => {
                self.pending.push(InputEvent::PointerUp(event));
                if button == MouseButton::Left {
                    self.detect_double_click(x, y, now);
                }
            }
        }
    }

    pub fn resized(&mut self, width: u32, height: u32) {
        self.pending.push(InputEvent::Resize { width, height });
    }

    fn detect_double_click(&mut self, x: f64, y: f64, now: Instant) {
        let within = |ax: f64, ay: f64| ((ax - x).powi(2) + (ay - y).powi(2)).sqrt() <= CLICK_TOLERANCE;

        // A drag is not a click and cannot start or finish a double click.
        let Some((px, py)) = self.press.take() else {
            return;
        };
        if !within(px, py) {
            self.last_click = None;
            return;
        }

        match self.last_click {
            Some((at, lx, ly)) if now.duration_since(at) <= DOUBLE_CLICK_INTERVAL && within(lx, ly) => {
                trace!("double click at ({:.1}, {:.1})", x, y);
                self.pending.push(InputEvent::DoubleClick(PointerEvent::new(x, y, PointerButton::Left)));
                self.last_click = None;
            }
            _ => self.last_click = Some((now, x, y)),
        }
    }
}

impl InputSource for WinitInput {
    fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
}

fn convert_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(n) => PointerButton::Other(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(input: &mut WinitInput, at: Instant) {
        input.mouse_input(ElementState::Pressed, MouseButton::Left, at);
        input.mouse_input(ElementState::Released, MouseButton::Left, at);
    }

    fn double_clicks(events: &[InputEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, InputEvent::DoubleClick(_)))
            .count()
    }

    #[test]
    fn test_two_quick_clicks_make_a_double_click() {
        let mut input = WinitInput::new();
        let t0 = Instant::now();
        input.cursor_moved(50.0, 60.0);
        click(&mut input, t0);
        click(&mut input, t0 + Duration::from_millis(200));

        let events = input.drain();
        assert_eq!(double_clicks(&events), 1);
        assert_eq!(events.last(), Some(&InputEvent::DoubleClick(PointerEvent::left(50.0, 60.0))));
        assert!(input.drain().is_empty());
    }

    #[test]
    fn test_slow_or_distant_clicks_do_not() {
        let mut input = WinitInput::new();
        let t0 = Instant::now();
        click(&mut input, t0);
        click(&mut input, t0 + Duration::from_millis(400));
        input.cursor_moved(20.0, 0.0);
        click(&mut input, t0 + Duration::from_millis(500));

        assert_eq!(double_clicks(&input.drain()), 0);
    }

    #[test]
    fn test_press_release_carry_cursor_and_button() {
        let mut input = WinitInput::new();
        input.cursor_moved(5.0, 6.0);
        input.mouse_input(ElementState::Pressed, MouseButton::Right, Instant::now());
        input.resized(640, 480);

        let events = input.drain();
        assert_eq!(
            events[1],
            InputEvent::PointerDown(PointerEvent::new(5.0, 6.0, PointerButton::Right))
        );
        assert_eq!(events[2], InputEvent::Resize { width: 640, height: 480 });
    }
}
