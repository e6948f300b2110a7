//! Input model: keys, swipe/drag gestures, and taps mapped to reader actions.
//!
//! Mapping is pure: hosts translate raw events into these types and hand the
//! resulting [`Action`] to [`crate::Reader::dispatch`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{MIN_SWIPE_DISTANCE, SWIPE_AXIS_RATIO};

/// What the user asked the reader to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Previous,
    Next,
    First,
    Last,
    /// Leave the reader and return to the landing section.
    Close,
    /// Close the tutorial overlay without remembering the choice.
    DismissTutorial,
    /// Flip chrome visibility.
    ToggleChrome,
}

/// A keyboard key, holding the name reported by the browser (e.g. `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Map a key press to an action.
///
/// While the tutorial overlay is open only `Escape` and `Enter` do anything,
/// and both just dismiss it.
#[must_use]
pub fn key_action(key: &Key, tutorial_open: bool) -> Option<Action> {
    let name = key.0.as_str();
    if tutorial_open {
        return matches!(name, "Escape" | "Enter").then_some(Action::DismissTutorial);
    }
    match name {
        "ArrowLeft" | "ArrowUp" => Some(Action::Previous),
        "ArrowRight" | "ArrowDown" | " " => Some(Action::Next),
        "Home" => Some(Action::First),
        "End" => Some(Action::Last),
        "Escape" => Some(Action::Close),
        _ => None,
    }
}

/// A point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Source of a press/release pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Finger swipe; must be clearly more horizontal than vertical.
    Touch,
    /// Mouse drag; only horizontal travel matters.
    Mouse,
}

/// Where a click or tap landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapTarget {
    /// A navigation arrow, thumbnail, or toolbar button.
    Control,
    /// Anywhere else on the reader.
    Surface,
}

/// Map a tap to an action: only taps away from controls toggle chrome.
#[must_use]
pub fn tap_action(target: TapTarget) -> Option<Action> {
    match target {
        TapTarget::Control => None,
        TapTarget::Surface => Some(Action::ToggleChrome),
    }
}

/// Press-to-release gesture tracker for swipes and drags.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<(PointerKind, Point)>,
}

impl SwipeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the press position.
    pub fn press(&mut self, kind: PointerKind, at: Point) {
        self.start = Some((kind, at));
    }

    /// Finish the gesture. Releases without a matching press are ignored.
    pub fn release(&mut self, kind: PointerKind, at: Point) -> Option<Action> {
        let (start_kind, start) = self.start.take()?;
        if start_kind != kind {
            return None;
        }
        swipe_action(kind, start, at)
    }
}

/// Classify the travel between `start` and `end`.
///
/// Moving left turns to the next page, moving right to the previous one.
#[must_use]
pub fn swipe_action(kind: PointerKind, start: Point, end: Point) -> Option<Action> {
    let dx = start.x - end.x;
    let dy = (start.y - end.y).abs();
    if dx.abs() <= MIN_SWIPE_DISTANCE {
        return None;
    }
    if kind == PointerKind::Touch && dx.abs() <= dy * SWIPE_AXIS_RATIO {
        return None;
    }
    Some(if dx > 0.0 { Action::Next } else { Action::Previous })
}
