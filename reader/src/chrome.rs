//! Chrome (toolbar + bottom controls) visibility.
//!
//! Pointer activity shows chrome and arms an inactivity timer; when the timer
//! fires chrome hides again, except on touch-capable devices where auto-hide
//! would race the user's taps. Timer scheduling lives in the driver.

#[cfg(test)]
#[path = "chrome_test.rs"]
mod chrome_test;

use crate::surface::{Command, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeState {
    visible: bool,
    touch_capable: bool,
}

impl ChromeState {
    #[must_use]
    pub fn new(touch_capable: bool) -> Self {
        Self { visible: true, touch_capable }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn auto_hides(&self) -> bool {
        !self.touch_capable
    }

    /// Flip visibility. Returns the command to apply and whether the idle
    /// timer should be (re)armed.
    pub fn toggle(&mut self) -> (Command, bool) {
        self.visible = !self.visible;
        (visibility(self.visible), self.visible)
    }

    /// Pointer moved: make chrome visible. Returns a command only when the
    /// visibility actually changed.
    pub fn reveal(&mut self) -> Option<Command> {
        if self.visible {
            return None;
        }
        self.visible = true;
        Some(visibility(true))
    }

    /// Idle timer fired. Touch devices keep their chrome.
    pub fn idle_timeout(&mut self) -> Option<Command> {
        if !self.auto_hides() {
            return None;
        }
        self.visible = false;
        Some(visibility(false))
    }
}

fn visibility(visible: bool) -> Command {
    Command::SetVisible { section: Section::Chrome, visible }
}
