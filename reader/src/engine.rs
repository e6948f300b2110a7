//! Pure reader state machine: page sequence, cursor, and transition guard.
//!
//! Nothing here is asynchronous. Navigation calls either reject (returning
//! `None`) or return a [`Transition`] plus the commands that start it; the
//! caller schedules [`ReaderCore::finish`] after the transition duration.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{PRELOAD_OFFSETS, PRELOAD_STAGGER};
use crate::surface::{Command, DisplayState, PageTag, PageView};

/// Construction input: ordered page references and an optional cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Direction of an accepted navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// One page forward.
    Forward,
    /// One page back.
    Backward,
    /// Direct jump to an arbitrary page.
    Jump,
}

/// An accepted navigation awaiting completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub kind: TransitionKind,
    generation: u64,
}

/// One scheduled preload: which page, and how long to wait first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadRequest {
    pub page: usize,
    pub delay: Duration,
}

/// Cursor and animation guard over an immutable page sequence.
#[derive(Debug, Clone)]
pub struct ReaderCore {
    pages: Vec<String>,
    cover: Option<String>,
    current: usize,
    animating: bool,
    /// Bumped on every reset so stale transition timers can be recognized.
    generation: u64,
}

impl ReaderCore {
    #[must_use]
    pub fn new(manifest: Manifest) -> Self {
        Self { pages: manifest.pages, cover: manifest.cover, current: 0, animating: false, generation: 0 }
    }

    // --- Queries ---

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The cursor, or `None` when the sequence is empty.
    #[must_use]
    pub fn current_page(&self) -> Option<usize> {
        (!self.pages.is_empty()).then_some(self.current)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    #[must_use]
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    #[must_use]
    pub fn reference(&self, page: usize) -> Option<&str> {
        self.pages.get(page).map(String::as_str)
    }

    /// Cover image: the explicit cover, else the first page.
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref().or_else(|| self.reference(0))
    }

    #[must_use]
    pub fn last_page(&self) -> Option<usize> {
        self.pages.len().checked_sub(1)
    }

    // --- Lifecycle ---

    /// Return the cursor to the first page and drop any running transition.
    pub fn reset(&mut self) {
        self.current = 0;
        self.animating = false;
        self.generation += 1;
    }

    /// Whether `transition` began after the most recent reset.
    #[must_use]
    pub fn is_current(&self, transition: &Transition) -> bool {
        transition.generation == self.generation
    }

    // --- Navigation ---

    /// Start a one-page forward transition.
    pub fn begin_next(&mut self) -> Option<(Transition, Vec<Command>)> {
        if self.animating {
            return None;
        }
        let to = self.current + 1;
        if to >= self.pages.len() {
            return None;
        }
        let from = self.current;
        let commands = vec![
            Command::RemoveTag { page: from, tag: PageTag::Active },
            Command::AddTag { page: from, tag: PageTag::ExitLeft },
            Command::AddTag { page: to, tag: PageTag::Active },
        ];
        Some((self.accept(from, to, TransitionKind::Forward), commands))
    }

    /// Start a one-page backward transition.
    pub fn begin_previous(&mut self) -> Option<(Transition, Vec<Command>)> {
        if self.animating {
            return None;
        }
        let from = self.current;
        let to = from.checked_sub(1)?;
        let commands = vec![
            Command::RemoveTag { page: from, tag: PageTag::Active },
            Command::AddTag { page: from, tag: PageTag::ExitRight },
            Command::RemoveTag { page: to, tag: PageTag::Prev },
            Command::AddTag { page: to, tag: PageTag::Active },
        ];
        Some((self.accept(from, to, TransitionKind::Backward), commands))
    }

    /// Start a jump to `target`, reclassifying every page relative to it.
    pub fn begin_go_to(&mut self, target: usize) -> Option<(Transition, Vec<Command>)> {
        if self.animating || target >= self.pages.len() || target == self.current {
            return None;
        }
        let from = self.current;
        let mut commands = Vec::with_capacity(self.pages.len() + target + 2);
        for page in 0..self.pages.len() {
            commands.push(Command::ClearTags { page });
            if page < target {
                commands.push(Command::AddTag { page, tag: PageTag::Prev });
            }
        }
        let exit = if target > from { PageTag::ExitLeft } else { PageTag::ExitRight };
        commands.push(Command::AddTag { page: from, tag: exit });
        commands.push(Command::AddTag { page: target, tag: PageTag::Active });
        Some((self.accept(from, target, TransitionKind::Jump), commands))
    }

    /// Complete `transition`: clear exit styling, release the guard, and
    /// refresh derived UI. A transition begun before the last reset produces
    /// no commands.
    pub fn finish(&mut self, transition: &Transition) -> Vec<Command> {
        if !self.is_current(transition) {
            return Vec::new();
        }
        self.animating = false;
        let from = transition.from;
        let mut commands = match transition.kind {
            TransitionKind::Forward => vec![
                Command::RemoveTag { page: from, tag: PageTag::ExitLeft },
                Command::AddTag { page: from, tag: PageTag::Prev },
            ],
            TransitionKind::Backward => vec![Command::RemoveTag { page: from, tag: PageTag::ExitRight }],
            TransitionKind::Jump => vec![
                Command::RemoveTag { page: from, tag: PageTag::ExitLeft },
                Command::RemoveTag { page: from, tag: PageTag::ExitRight },
            ],
        };
        commands.push(Command::Refresh { display: self.display_state() });
        commands
    }

    fn accept(&mut self, from: usize, to: usize, kind: TransitionKind) -> Transition {
        self.animating = true;
        self.current = to;
        Transition { from, to, kind, generation: self.generation }
    }

    // --- Derived views ---

    /// Counter, progress and control state for the current cursor.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn display_state(&self) -> DisplayState {
        let total = self.pages.len();
        if total == 0 {
            return DisplayState {
                current_page: 0,
                total_pages: 0,
                progress_percent: 0.0,
                prev_enabled: false,
                next_enabled: false,
                active_thumbnail: None,
            };
        }
        DisplayState {
            current_page: self.current + 1,
            total_pages: total,
            progress_percent: (self.current + 1) as f64 / total as f64 * 100.0,
            prev_enabled: self.current > 0,
            next_enabled: self.current + 1 < total,
            active_thumbnail: Some(self.current),
        }
    }

    /// Sliding preload window around `center`, nearest pages first.
    ///
    /// Only in-bounds pages are returned; never more than
    /// `PRELOAD_OFFSETS.len()` entries.
    #[must_use]
    pub fn preload_plan(&self, center: usize) -> Vec<PreloadRequest> {
        let mut stagger = Duration::ZERO;
        let mut plan = Vec::with_capacity(PRELOAD_OFFSETS.len());
        for offset in PRELOAD_OFFSETS {
            let page = center.checked_add_signed(offset).filter(|&p| p < self.pages.len());
            if let Some(page) = page {
                plan.push(PreloadRequest { page, delay: stagger });
            }
            stagger += PRELOAD_STAGGER;
        }
        plan
    }

    /// Container descriptions for building the page list.
    pub fn page_views(&self, is_loaded: impl Fn(&str) -> bool) -> Vec<PageView> {
        self.pages
            .iter()
            .map(|reference| PageView { reference: reference.clone(), loaded: is_loaded(reference) })
            .collect()
    }
}
