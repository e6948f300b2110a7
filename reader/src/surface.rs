//! Render surface contract and a headless implementation.
//!
//! The engine drives presentation exclusively through [`Command`] values.
//! A host (DOM binding, native UI, test) implements [`RenderSurface`] and maps
//! each command onto its own elements. Commands that address a page whose
//! container does not exist must be ignored by the surface.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use serde::Serialize;

/// Presentation state tags toggled on a page container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageTag {
    /// The page currently on display.
    Active,
    /// A page the reader has already moved past.
    Prev,
    /// Outgoing page of a forward transition.
    ExitLeft,
    /// Outgoing page of a backward transition.
    ExitRight,
}

impl PageTag {
    /// CSS class name for this tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Prev => "prev",
            Self::ExitLeft => "exit-left",
            Self::ExitRight => "exit-right",
        }
    }
}

/// Initial description of one page container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub reference: String,
    /// Already fetched: the container gets its source immediately.
    pub loaded: bool,
}

/// Derived UI refreshed after every completed transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    /// One-based page number shown in the counter (0 when empty).
    pub current_page: usize,
    pub total_pages: usize,
    /// Reading progress in percent.
    pub progress_percent: f64,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    /// Thumbnail to highlight and scroll into view.
    pub active_thumbnail: Option<usize>,
}

/// Progress of the initial preload shown on the landing overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadingStatus {
    pub percent: u8,
    pub complete: bool,
}

/// Sections of the reader UI that can be shown or hidden as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Landing section with the cover and the open button.
    Hero,
    /// The reader itself.
    Reader,
    /// Overlay covering the reader until it has been built.
    InitialLoading,
    /// First-run tutorial overlay.
    Tutorial,
    /// Toolbar and bottom controls.
    Chrome,
}

/// One instruction for the render surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Replace all page containers.
    BuildPages { pages: Vec<PageView> },
    /// Replace the thumbnail strip.
    BuildThumbnails { references: Vec<String> },
    AddTag { page: usize, tag: PageTag },
    RemoveTag { page: usize, tag: PageTag },
    /// Remove every tag from a page.
    ClearTags { page: usize },
    ShowLoading { page: usize },
    HideLoading { page: usize },
    /// Replace the page's loading indicator with an inline failure marker.
    ShowLoadFailed { page: usize },
    SetImageSource { page: usize, reference: String },
    SetTotalPages { total: usize },
    SetLoadingStatus { status: LoadingStatus },
    Refresh { display: DisplayState },
    SetVisible { section: Section, visible: bool },
}

/// Rendering collaborator consumed by the engine.
pub trait RenderSurface {
    /// Whether a container exists for `page`.
    fn has_page(&self, page: usize) -> bool;

    /// Source currently assigned to the page image, if any.
    fn image_source(&self, page: usize) -> Option<String>;

    /// Apply one command. Commands addressing missing elements are no-ops.
    fn apply(&mut self, command: Command);
}

// =============================================================================
// HEADLESS SURFACE
// =============================================================================

/// Observable state of one page container in a [`HeadlessSurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessPage {
    pub reference: String,
    pub tags: BTreeSet<PageTag>,
    pub source: Option<String>,
    pub loading_visible: bool,
    pub failed: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    pages: Vec<Option<HeadlessPage>>,
    thumbnails: Vec<String>,
    visible: HashMap<Section, bool>,
    total_pages: Option<usize>,
    loading_status: Option<LoadingStatus>,
    display: Option<DisplayState>,
    log: Vec<Command>,
}

/// In-memory surface that records every command and models page containers.
///
/// Cloning yields another handle onto the same state, so a test can hand one
/// clone to the engine and inspect through another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the container for `page`, simulating a partially rendered view.
    pub fn remove_page(&self, page: usize) {
        if let Some(slot) = self.state.borrow_mut().pages.get_mut(page) {
            *slot = None;
        }
    }

    /// Snapshot of a page container.
    #[must_use]
    pub fn page(&self, page: usize) -> Option<HeadlessPage> {
        self.state.borrow().pages.get(page).cloned().flatten()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.state.borrow().pages.len()
    }

    #[must_use]
    pub fn has_tag(&self, page: usize, tag: PageTag) -> bool {
        self.page(page).is_some_and(|p| p.tags.contains(&tag))
    }

    #[must_use]
    pub fn thumbnails(&self) -> Vec<String> {
        self.state.borrow().thumbnails.clone()
    }

    /// Whether a section is visible. Sections never toggled report `None`.
    #[must_use]
    pub fn visible(&self, section: Section) -> Option<bool> {
        self.state.borrow().visible.get(&section).copied()
    }

    #[must_use]
    pub fn total_pages(&self) -> Option<usize> {
        self.state.borrow().total_pages
    }

    #[must_use]
    pub fn loading_status(&self) -> Option<LoadingStatus> {
        self.state.borrow().loading_status
    }

    #[must_use]
    pub fn display(&self) -> Option<DisplayState> {
        self.state.borrow().display.clone()
    }

    /// Every command applied so far, in order.
    #[must_use]
    pub fn log(&self) -> Vec<Command> {
        self.state.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    fn with_page(&self, page: usize, f: impl FnOnce(&mut HeadlessPage)) {
        if let Some(Some(container)) = self.state.borrow_mut().pages.get_mut(page) {
            f(container);
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn has_page(&self, page: usize) -> bool {
        self.page(page).is_some()
    }

    fn image_source(&self, page: usize) -> Option<String> {
        self.page(page).and_then(|p| p.source)
    }

    fn apply(&mut self, command: Command) {
        self.state.borrow_mut().log.push(command.clone());
        match command {
            Command::BuildPages { pages } => {
                let containers = pages
                    .into_iter()
                    .enumerate()
                    .map(|(index, view)| {
                        let mut tags = BTreeSet::new();
                        if index == 0 {
                            tags.insert(PageTag::Active);
                        }
                        Some(HeadlessPage {
                            source: view.loaded.then(|| view.reference.clone()),
                            loading_visible: !view.loaded,
                            reference: view.reference,
                            tags,
                            failed: false,
                        })
                    })
                    .collect();
                self.state.borrow_mut().pages = containers;
            }
            Command::BuildThumbnails { references } => self.state.borrow_mut().thumbnails = references,
            Command::AddTag { page, tag } => self.with_page(page, |p| {
                p.tags.insert(tag);
            }),
            Command::RemoveTag { page, tag } => self.with_page(page, |p| {
                p.tags.remove(&tag);
            }),
            Command::ClearTags { page } => self.with_page(page, |p| p.tags.clear()),
            Command::ShowLoading { page } => self.with_page(page, |p| {
                p.loading_visible = true;
                p.failed = false;
            }),
            Command::HideLoading { page } => self.with_page(page, |p| p.loading_visible = false),
            Command::ShowLoadFailed { page } => self.with_page(page, |p| {
                p.loading_visible = false;
                p.failed = true;
            }),
            Command::SetImageSource { page, reference } => self.with_page(page, |p| {
                p.source = Some(reference);
                p.failed = false;
            }),
            Command::SetTotalPages { total } => self.state.borrow_mut().total_pages = Some(total),
            Command::SetLoadingStatus { status } => self.state.borrow_mut().loading_status = Some(status),
            Command::Refresh { display } => self.state.borrow_mut().display = Some(display),
            Command::SetVisible { section, visible } => {
                self.state.borrow_mut().visible.insert(section, visible);
            }
        }
    }
}
