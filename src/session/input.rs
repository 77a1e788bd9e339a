//! # Pointer Input
//!
//! Input reaches the session through an [`InputSource`] injected at
//! construction. Sources report raw presses, moves and releases; clicks are
//! synthesised by [`PointerTracker`] so every source gets the same click rule.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Largest pointer travel, in pixels, between press and release that still counts as a click
pub const CLICK_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    Other(u16),
}

/// Pointer position in pixels (Y down) and the button involved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, button: PointerButton) -> Self {
        Self { x, y, button }
    }

    pub fn left(x: f64, y: f64) -> Self {
        Self::new(x, y, PointerButton::Left)
    }

    fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    DoubleClick(PointerEvent),
    Resize { width: u32, height: u32 },
}

/// Where the session pulls its input from each tick
pub trait InputSource {
    /// Take every event received since the last call, oldest first
    fn drain(&mut self) -> Vec<InputEvent>;
}

/// A shared FIFO of input events.
///
/// Clones share the same queue: hand one clone to the session and push
/// through another.
#[derive(Debug, Clone, Default)]
pub struct QueuedInput {
    queue: Rc<RefCell<VecDeque<InputEvent>>>,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: InputEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl InputSource for QueuedInput {
    fn drain(&mut self) -> Vec<InputEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

/// Turns press/release pairs into clicks.
///
/// A click is reported on release of the left button when the pointer stayed
/// within [`CLICK_TOLERANCE`] of the press position the whole time.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pressed: Option<PointerEvent>,
    travelled_too_far: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }

    pub fn down(&mut self, event: &PointerEvent) {
        self.pressed = Some(*event);
        self.travelled_too_far = false;
    }

    pub fn moved(&mut self, event: &PointerEvent) {
        if let Some(pressed) = &self.pressed {
            if pressed.distance_to(event.x, event.y) > CLICK_TOLERANCE {
                self.travelled_too_far = true;
            }
        }
    }

    /// Release; returns the click to dispatch, if any
    pub fn up(&mut self, event: &PointerEvent) -> Option<PointerEvent> {
        let pressed = self.pressed.take()?;
        let moved = self.travelled_too_far || pressed.distance_to(event.x, event.y) > CLICK_TOLERANCE;
        self.travelled_too_far = false;

        let is_click = !moved && pressed.button == PointerButton::Left && event.button == PointerButton::Left;
        is_click.then_some(*event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_within_tolerance() {
        let mut tracker = PointerTracker::new();
        tracker.down(&PointerEvent::left(100.0, 100.0));
        tracker.moved(&PointerEvent::left(103.0, 102.0));
        assert_eq!(
            tracker.up(&PointerEvent::left(103.0, 103.0)),
            Some(PointerEvent::left(103.0, 103.0))
        );
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn test_drag_suppresses_click_even_when_returning() {
        let mut tracker = PointerTracker::new();
        tracker.down(&PointerEvent::left(100.0, 100.0));
        tracker.moved(&PointerEvent::left(140.0, 100.0));
        tracker.moved(&PointerEvent::left(100.0, 100.0));
        assert_eq!(tracker.up(&PointerEvent::left(100.0, 100.0)), None);
    }

    #[test]
    fn test_only_left_button_clicks() {
        let mut tracker = PointerTracker::new();
        let right = PointerEvent::new(10.0, 10.0, PointerButton::Right);
        tracker.down(&right);
        assert_eq!(tracker.up(&right), None);
        // Release without press
        assert_eq!(tracker.up(&PointerEvent::left(0.0, 0.0)), None);
    }

    #[test]
    fn test_queued_input_clones_share_queue() {
        let feeder = QueuedInput::new();
        let mut source = feeder.clone();
        feeder.push(InputEvent::Resize { width: 10, height: 20 });
        feeder.push(InputEvent::PointerMove(PointerEvent::left(1.0, 2.0)));
        assert_eq!(feeder.len(), 2);

        let drained = source.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], InputEvent::Resize { width: 10, height: 20 });
        assert!(feeder.is_empty());
    }
}
