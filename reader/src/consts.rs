//! Shared timing and threshold constants for the reader crate.

use std::time::Duration;

// ── Navigation ──────────────────────────────────────────────────

/// Length of a page transition; navigation is locked for this long.
pub const TRANSITION: Duration = Duration::from_millis(400);

// ── Preloading ──────────────────────────────────────────────────

/// Offsets from the cursor in the order they are requested.
pub const PRELOAD_OFFSETS: [isize; 11] = [0, 1, -1, 2, -2, 3, -3, 4, -4, 5, -5];

/// Extra delay added per priority rank when scheduling a preload.
pub const PRELOAD_STAGGER: Duration = Duration::from_millis(30);

/// Pages fetched before the reader is first opened.
pub const INITIAL_PRELOAD_COUNT: usize = 5;

// ── Open / close sequencing ─────────────────────────────────────

/// Delay between hiding the hero section and showing the reader.
pub const OPEN_DELAY: Duration = Duration::from_millis(400);

/// Delay between opening the reader and showing the first-run tutorial.
pub const TUTORIAL_DELAY: Duration = Duration::from_millis(500);

/// Delay between hiding the reader and showing the hero section again.
pub const CLOSE_DELAY: Duration = Duration::from_millis(300);

// ── Input ───────────────────────────────────────────────────────

/// Minimum horizontal travel in pixels for a swipe or drag to count.
pub const MIN_SWIPE_DISTANCE: f64 = 50.0;

/// A touch swipe must be this many times more horizontal than vertical.
pub const SWIPE_AXIS_RATIO: f64 = 1.5;

/// Inactivity period after which chrome is hidden again.
pub const CHROME_IDLE: Duration = Duration::from_secs(4);

// ── Storage ─────────────────────────────────────────────────────

/// Key of the persisted "tutorial already seen" flag.
pub const TUTORIAL_FLAG_KEY: &str = "tutorial shown";
