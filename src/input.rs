//! Input intent collection
//!
//! Keyboard keys and touch zones are mapped 1:1 onto a small set of input
//! events. The collector turns held directions into a continuous
//! [`MoveIntent`] that the input-poll task samples.

use crate::consts::TOUCH_SPEED_MULTIPLIER;
use crate::sim::MoveIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Touch,
}

/// Discrete input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveStart(Direction),
    MoveStop(Direction),
    Fire,
}

/// Map a `KeyboardEvent.key` value to an input event
///
/// Fire triggers on press only. Key repeat is filtered by the caller.
pub fn key_event(key: &str, pressed: bool) -> Option<InputEvent> {
    let direction = match key {
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        " " | "Space" | "Spacebar" => {
            return pressed.then_some(InputEvent::Fire);
        }
        _ => None,
    }?;

    Some(if pressed {
        InputEvent::MoveStart(direction)
    } else {
        InputEvent::MoveStop(direction)
    })
}

/// On-screen touch controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchZone {
    Left,
    Fire,
    Right,
}

impl TouchZone {
    /// DOM ids of the touch buttons
    pub const ALL: [(TouchZone, &'static str); 3] = [
        (TouchZone::Left, "touch-left"),
        (TouchZone::Fire, "touch-fire"),
        (TouchZone::Right, "touch-right"),
    ];

    /// Event for a touchstart (`pressed`) or touchend on this zone
    pub fn event(self, pressed: bool) -> Option<InputEvent> {
        match (self, pressed) {
            (TouchZone::Left, true) => Some(InputEvent::MoveStart(Direction::Left)),
            (TouchZone::Left, false) => Some(InputEvent::MoveStop(Direction::Left)),
            (TouchZone::Right, true) => Some(InputEvent::MoveStart(Direction::Right)),
            (TouchZone::Right, false) => Some(InputEvent::MoveStop(Direction::Right)),
            (TouchZone::Fire, true) => Some(InputEvent::Fire),
            (TouchZone::Fire, false) => None,
        }
    }
}

/// Which sources currently hold one direction
#[derive(Debug, Clone, Copy, Default)]
struct Held {
    keyboard: bool,
    touch: bool,
}

impl Held {
    fn flag(&mut self, source: InputSource) -> &mut bool {
        match source {
            InputSource::Keyboard => &mut self.keyboard,
            InputSource::Touch => &mut self.touch,
        }
    }

    /// A source still holding this direction, keyboard first
    fn any(&self) -> Option<InputSource> {
        if self.keyboard {
            Some(InputSource::Keyboard)
        } else if self.touch {
            Some(InputSource::Touch)
        } else {
            None
        }
    }
}

/// Held-direction state
///
/// Keyboard and touch hold directions independently; releasing one source
/// never clears the other's hold.
#[derive(Debug, Clone, Default)]
pub struct IntentCollector {
    left: Held,
    right: Held,
    /// Most recent press still in effect, wins when both directions are held
    latest: Option<(Direction, InputSource)>,
}

impl IntentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event; returns true if it was a fire request
    pub fn handle(&mut self, event: InputEvent, source: InputSource) -> bool {
        match event {
            InputEvent::MoveStart(dir) => {
                *self.held(dir).flag(source) = true;
                self.latest = Some((dir, source));
                false
            }
            InputEvent::MoveStop(dir) => {
                *self.held(dir).flag(source) = false;
                if self.latest == Some((dir, source)) {
                    let other = match dir {
                        Direction::Left => Direction::Right,
                        Direction::Right => Direction::Left,
                    };
                    let same = self.held(dir).any().map(|s| (dir, s));
                    let fallback = self.held(other).any().map(|s| (other, s));
                    self.latest = same.or(fallback);
                }
                false
            }
            InputEvent::Fire => true,
        }
    }

    fn held(&mut self, dir: Direction) -> &mut Held {
        match dir {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Current continuous movement intent
    pub fn intent(&self) -> MoveIntent {
        match self.latest {
            Some((Direction::Left, _)) => MoveIntent::Left,
            Some((Direction::Right, _)) => MoveIntent::Right,
            None => MoveIntent::None,
        }
    }

    /// Speed multiplier for the source driving the active direction
    pub fn speed_scale(&self) -> f32 {
        match self.latest {
            Some((_, InputSource::Touch)) => TOUCH_SPEED_MULTIPLIER,
            _ => 1.0,
        }
    }

    /// Release everything (focus loss, new session)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
