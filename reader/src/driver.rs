//! The reader instance: owns all mutable state and drives the async tail of
//! every operation.
//!
//! DESIGN
//! ======
//! `Reader` is a cheap handle (`Rc`) onto one reader instance. Entry points
//! are synchronous: they update state, emit commands to the surface, and
//! spawn local tasks for anything that has to wait (image loads, the
//! transition timer, open/close sequencing, chrome auto-hide). Tasks hold a
//! handle clone, so late completions always land on live state. Nothing ever
//! blocks; a `RefCell` borrow is never held across an `.await`.

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::task::{JoinHandle, spawn_local};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::chrome::ChromeState;
use crate::consts::{
    CHROME_IDLE, CLOSE_DELAY, INITIAL_PRELOAD_COUNT, OPEN_DELAY, TRANSITION, TUTORIAL_DELAY, TUTORIAL_FLAG_KEY,
};
use crate::engine::{Manifest, ReaderCore, Transition};
use crate::input::{Action, Key, Point, PointerKind, SwipeTracker, TapTarget, key_action, tap_action};
use crate::loader::{ImageFetcher, ImageLoader, LoadState, PendingLoad};
use crate::storage::FlagStore;
use crate::surface::{Command, LoadingStatus, RenderSurface, Section};

struct Inner {
    core: RefCell<ReaderCore>,
    loader: ImageLoader,
    surface: RefCell<Box<dyn RenderSurface>>,
    store: Box<dyn FlagStore>,
    chrome: Cell<ChromeState>,
    chrome_timer: RefCell<Option<JoinHandle<()>>>,
    swipe: RefCell<SwipeTracker>,
    active: Cell<bool>,
    tutorial_open: Cell<bool>,
    tutorial_seen: Cell<bool>,
}

/// Handle onto one magazine reader instance.
#[derive(Clone)]
pub struct Reader {
    inner: Rc<Inner>,
}

impl Reader {
    /// Build a reader over `manifest`. Reads the tutorial flag once.
    pub fn new(
        manifest: Manifest,
        surface: impl RenderSurface + 'static,
        fetcher: Rc<dyn ImageFetcher>,
        store: impl FlagStore + 'static,
    ) -> Self {
        let loader = ImageLoader::new(fetcher, manifest.pages.iter().map(String::as_str));
        let tutorial_seen = store.get(TUTORIAL_FLAG_KEY);
        let inner = Inner {
            core: RefCell::new(ReaderCore::new(manifest)),
            loader,
            surface: RefCell::new(Box::new(surface)),
            store: Box::new(store),
            chrome: Cell::new(ChromeState::new(false)),
            chrome_timer: RefCell::new(None),
            swipe: RefCell::new(SwipeTracker::new()),
            active: Cell::new(false),
            tutorial_open: Cell::new(false),
            tutorial_seen: Cell::new(tutorial_seen),
        };
        Self { inner: Rc::new(inner) }
    }

    /// Keep chrome on screen permanently (touch-capable devices).
    #[must_use]
    pub fn with_touch_capable(self, touch_capable: bool) -> Self {
        self.inner.chrome.set(ChromeState::new(touch_capable));
        self
    }

    // --- Queries ---

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.inner.core.borrow().total_pages()
    }

    #[must_use]
    pub fn current_page(&self) -> Option<usize> {
        self.inner.core.borrow().current_page()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.inner.core.borrow().is_animating()
    }

    #[must_use]
    pub fn cover(&self) -> Option<String> {
        self.inner.core.borrow().cover().map(str::to_owned)
    }

    /// Load state of the image behind `page`, or `None` out of range.
    #[must_use]
    pub fn load_state(&self, page: usize) -> Option<LoadState> {
        self.reference(page).map(|r| self.inner.loader.state(&r))
    }

    /// Whether the reader view is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    #[must_use]
    pub fn is_tutorial_open(&self) -> bool {
        self.inner.tutorial_open.get()
    }

    #[must_use]
    pub fn is_tutorial_seen(&self) -> bool {
        self.inner.tutorial_seen.get()
    }

    #[must_use]
    pub fn is_chrome_visible(&self) -> bool {
        self.inner.chrome.get().is_visible()
    }

    // --- Loading ---

    /// Publish the page count and warm the first few pages, reporting progress.
    pub fn start(&self) {
        let total = self.total_pages();
        self.apply([Command::SetTotalPages { total }]);

        let count = INITIAL_PRELOAD_COUNT.min(total);
        let finished = Rc::new(Cell::new(0usize));
        for page in 0..count {
            let Some(reference) = self.reference(page) else { continue };
            let pending = self.inner.loader.load(&reference);
            let reader = self.clone();
            let finished = Rc::clone(&finished);
            spawn_local(async move {
                pending.await;
                finished.set(finished.get() + 1);
                let percent = (finished.get() * 100 + count / 2) / count;
                let percent = u8::try_from(percent).unwrap_or(100);
                reader.apply([Command::SetLoadingStatus { status: LoadingStatus { percent, complete: percent >= 100 } }]);
            });
        }
    }

    /// Load one image, attaching to an in-flight fetch when there is one.
    pub fn load_image(&self, reference: &str) -> PendingLoad {
        self.inner.loader.load(reference)
    }

    /// Fetch a bounded window of pages around `center`, nearest first.
    pub fn preload_around(&self, center: usize) {
        let plan = self.inner.core.borrow().preload_plan(center);
        for request in plan {
            let Some(reference) = self.reference(request.page) else { continue };
            let reader = self.clone();
            spawn_local(async move {
                sleep(request.delay).await;
                let ok = reader.inner.loader.load(&reference).await;
                reader.render_outcome(request.page, ok);
            });
        }
    }

    /// Make sure `page` gets its image even if the preload window has not
    /// reached it yet. A previously failed image is fetched again.
    pub fn ensure_loaded(&self, page: usize) {
        let Some(reference) = self.reference(page) else { return };
        if !self.needs_source(page) {
            return;
        }
        self.apply([Command::ShowLoading { page }]);
        let pending = self.inner.loader.retry(&reference);
        let reader = self.clone();
        spawn_local(async move {
            let ok = pending.await;
            reader.render_outcome(page, ok);
        });
    }

    /// Assign a finished image to its page, or mark it failed. Pages that
    /// already show an image, or have no container, are left alone.
    fn render_outcome(&self, page: usize, ok: bool) {
        if !self.needs_source(page) {
            return;
        }
        if ok {
            let Some(reference) = self.reference(page) else { return };
            self.apply([Command::SetImageSource { page, reference }, Command::HideLoading { page }]);
        } else {
            self.apply([Command::ShowLoadFailed { page }]);
        }
    }

    fn needs_source(&self, page: usize) -> bool {
        let surface = self.inner.surface.borrow();
        surface.has_page(page) && surface.image_source(page).is_none()
    }

    // --- Navigation ---

    /// Turn to the next page. Returns `false` when rejected.
    pub fn next(&self) -> bool {
        let target = self.current_page().map(|page| page + 1);
        if !self.containers_present(target) {
            return false;
        }
        let started = self.inner.core.borrow_mut().begin_next();
        self.run_transition(started)
    }

    /// Turn to the previous page. Returns `false` when rejected.
    pub fn previous(&self) -> bool {
        let target = self.current_page().and_then(|page| page.checked_sub(1));
        if !self.containers_present(target) {
            return false;
        }
        let started = self.inner.core.borrow_mut().begin_previous();
        self.run_transition(started)
    }

    /// Jump straight to `page`. Returns `false` when rejected.
    pub fn go_to(&self, page: usize) -> bool {
        if !self.containers_present(Some(page)) {
            return false;
        }
        let started = self.inner.core.borrow_mut().begin_go_to(page);
        self.run_transition(started)
    }

    /// Navigation needs both the outgoing and the incoming page container.
    fn containers_present(&self, target: Option<usize>) -> bool {
        let (Some(from), Some(to)) = (self.current_page(), target) else {
            return false;
        };
        let surface = self.inner.surface.borrow();
        surface.has_page(from) && surface.has_page(to)
    }

    fn run_transition(&self, started: Option<(Transition, Vec<Command>)>) -> bool {
        let Some((transition, commands)) = started else {
            return false;
        };
        debug!(from = transition.from, to = transition.to, "page transition");
        self.apply(commands);
        self.ensure_loaded(transition.to);
        self.preload_around(transition.to);

        let reader = self.clone();
        spawn_local(async move {
            sleep(TRANSITION).await;
            let commands = reader.inner.core.borrow_mut().finish(&transition);
            reader.apply(commands);
        });
        true
    }

    // --- Open / close ---

    /// Leave the landing section and show the reader at page one.
    pub fn open(&self) {
        self.apply([Command::SetVisible { section: Section::Hero, visible: false }]);
        let reader = self.clone();
        spawn_local(async move {
            sleep(OPEN_DELAY).await;
            reader.show_reader();
        });
    }

    fn show_reader(&self) {
        let (pages, references, display) = {
            let mut core = self.inner.core.borrow_mut();
            core.reset();
            let pages = core.page_views(|r| self.inner.loader.is_loaded(r));
            (pages, core.pages().to_vec(), core.display_state())
        };
        self.apply([
            Command::BuildPages { pages },
            Command::BuildThumbnails { references },
            Command::Refresh { display },
            Command::SetVisible { section: Section::Reader, visible: true },
            Command::SetVisible { section: Section::InitialLoading, visible: false },
        ]);
        self.inner.active.set(true);
        self.preload_around(0);

        if !self.inner.tutorial_seen.get() {
            let reader = self.clone();
            spawn_local(async move {
                sleep(TUTORIAL_DELAY).await;
                reader.show_tutorial();
            });
        }
    }

    /// Hide the reader and bring the landing section back.
    pub fn close(&self) {
        self.apply([Command::SetVisible { section: Section::Reader, visible: false }]);
        self.inner.active.set(false);
        let reader = self.clone();
        spawn_local(async move {
            sleep(CLOSE_DELAY).await;
            reader.apply([Command::SetVisible { section: Section::Hero, visible: true }]);
        });
    }

    // --- Tutorial ---

    pub fn show_tutorial(&self) {
        self.inner.tutorial_open.set(true);
        self.apply([Command::SetVisible { section: Section::Tutorial, visible: true }]);
    }

    /// Close the tutorial; with `remember`, never show it automatically again.
    pub fn dismiss_tutorial(&self, remember: bool) {
        self.inner.tutorial_open.set(false);
        self.inner.tutorial_seen.set(true);
        self.apply([Command::SetVisible { section: Section::Tutorial, visible: false }]);
        if remember {
            if let Err(e) = self.inner.store.set(TUTORIAL_FLAG_KEY, true) {
                warn!(error = %e, "failed to persist tutorial flag");
            }
        }
    }

    // --- Input ---

    /// Perform `action`. Returns whether it had an effect.
    pub fn dispatch(&self, action: Action) -> bool {
        match action {
            Action::Previous => self.previous(),
            Action::Next => self.next(),
            Action::First => self.go_to(0),
            Action::Last => {
                let last = self.inner.core.borrow().last_page();
                last.is_some_and(|page| self.go_to(page))
            }
            Action::Close => {
                self.close();
                true
            }
            Action::DismissTutorial => {
                self.dismiss_tutorial(false);
                true
            }
            Action::ToggleChrome => {
                self.toggle_chrome();
                true
            }
        }
    }

    /// Keyboard input. Ignored while the reader is closed.
    pub fn key_down(&self, key: &Key) -> bool {
        if !self.is_active() {
            return false;
        }
        key_action(key, self.is_tutorial_open()).is_some_and(|action| self.dispatch(action))
    }

    /// Touch start or mouse down.
    pub fn pointer_down(&self, kind: PointerKind, at: Point) {
        if self.is_active() {
            self.inner.swipe.borrow_mut().press(kind, at);
        }
    }

    /// Touch end or mouse up; a long enough swipe turns the page.
    pub fn pointer_up(&self, kind: PointerKind, at: Point) -> bool {
        let action = self.inner.swipe.borrow_mut().release(kind, at);
        self.is_active() && action.is_some_and(|action| self.dispatch(action))
    }

    /// Click or tap that did not start a swipe.
    pub fn tap(&self, target: TapTarget) -> bool {
        self.is_active() && tap_action(target).is_some_and(|action| self.dispatch(action))
    }

    /// Pointer moved over the reader: show chrome and restart the idle timer.
    pub fn pointer_moved(&self) {
        if !self.is_active() {
            return;
        }
        let mut chrome = self.inner.chrome.get();
        let command = chrome.reveal();
        self.inner.chrome.set(chrome);
        self.apply(command);
        self.restart_idle_timer();
    }

    fn toggle_chrome(&self) {
        let mut chrome = self.inner.chrome.get();
        let (command, arm) = chrome.toggle();
        self.inner.chrome.set(chrome);
        self.apply([command]);
        if arm {
            self.restart_idle_timer();
        }
    }

    fn restart_idle_timer(&self) {
        if let Some(previous) = self.inner.chrome_timer.borrow_mut().take() {
            previous.abort();
        }
        let reader = self.clone();
        let handle = spawn_local(async move {
            sleep(CHROME_IDLE).await;
            let mut chrome = reader.inner.chrome.get();
            let command = chrome.idle_timeout();
            reader.inner.chrome.set(chrome);
            reader.apply(command);
        });
        *self.inner.chrome_timer.borrow_mut() = Some(handle);
    }

    // --- Helpers ---

    fn reference(&self, page: usize) -> Option<String> {
        self.inner.core.borrow().reference(page).map(str::to_owned)
    }

    fn apply(&self, commands: impl IntoIterator<Item = Command>) {
        let mut surface = self.inner.surface.borrow_mut();
        for command in commands {
            surface.apply(command);
        }
    }
}
