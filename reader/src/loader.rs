//! Memoized image loading.
//!
//! DESIGN
//! ======
//! Each reference has one slot. The first request spawns the fetch as a local
//! task and stores a [`Shared`] handle to its outcome; every later request
//! made while the fetch is running clones that handle, so a reference is
//! never fetched twice concurrently. Completed outcomes are kept and returned
//! immediately. Spawned fetches are never cancelled: a completion that nobody
//! awaits any more still records its outcome.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture, Shared};
use tracing::debug;

/// Network collaborator that fetches one image.
///
/// Resolves `true` on success and `false` on failure. Retries and timeouts
/// are the fetcher's own business.
#[async_trait::async_trait(?Send)]
pub trait ImageFetcher {
    async fn fetch(&self, reference: &str) -> bool;
}

/// Observable load state of one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotRequested,
    Loading,
    Loaded,
    Failed,
}

/// Handle to a load outcome. Cloneable; every clone resolves to the same value.
pub type PendingLoad = Shared<LocalBoxFuture<'static, bool>>;

enum Slot {
    NotRequested,
    Loading(PendingLoad),
    Done(bool),
}

/// Per-reference load bookkeeping with in-flight attach.
pub struct ImageLoader {
    fetcher: Rc<dyn ImageFetcher>,
    slots: Rc<RefCell<HashMap<String, Slot>>>,
}

impl ImageLoader {
    /// Create a loader with every reference in `references` marked not requested.
    pub fn new<'a>(fetcher: Rc<dyn ImageFetcher>, references: impl IntoIterator<Item = &'a str>) -> Self {
        let slots = references
            .into_iter()
            .map(|r| (r.to_owned(), Slot::NotRequested))
            .collect();
        Self { fetcher, slots: Rc::new(RefCell::new(slots)) }
    }

    /// Current state of `reference`. Unknown references are not requested.
    #[must_use]
    pub fn state(&self, reference: &str) -> LoadState {
        match self.slots.borrow().get(reference) {
            None | Some(Slot::NotRequested) => LoadState::NotRequested,
            Some(Slot::Loading(_)) => LoadState::Loading,
            Some(Slot::Done(true)) => LoadState::Loaded,
            Some(Slot::Done(false)) => LoadState::Failed,
        }
    }

    /// Whether `reference` has loaded successfully.
    #[must_use]
    pub fn is_loaded(&self, reference: &str) -> bool {
        self.state(reference) == LoadState::Loaded
    }

    /// Load `reference`, reusing a recorded outcome or an in-flight fetch.
    ///
    /// Must be called from inside a `LocalSet` when a fetch has to be started.
    pub fn load(&self, reference: &str) -> PendingLoad {
        let mut slots = self.slots.borrow_mut();
        match slots.get(reference) {
            Some(Slot::Done(ok)) => return future::ready(*ok).boxed_local().shared(),
            Some(Slot::Loading(pending)) => return pending.clone(),
            Some(Slot::NotRequested) | None => {}
        }
        let pending = self.spawn_fetch(reference);
        slots.insert(reference.to_owned(), Slot::Loading(pending.clone()));
        pending
    }

    /// Like [`load`](Self::load), but a previously failed reference is
    /// fetched again. Loaded references are never refetched.
    pub fn retry(&self, reference: &str) -> PendingLoad {
        {
            let mut slots = self.slots.borrow_mut();
            if matches!(slots.get(reference), Some(Slot::Done(false))) {
                debug!(reference, "retrying failed image");
                slots.insert(reference.to_owned(), Slot::NotRequested);
            }
        }
        self.load(reference)
    }

    fn spawn_fetch(&self, reference: &str) -> PendingLoad {
        let fetcher = Rc::clone(&self.fetcher);
        let slots = Rc::clone(&self.slots);
        let reference = reference.to_owned();
        let task_reference = reference.clone();

        let handle = tokio::task::spawn_local(async move {
            let reference = task_reference;
            let ok = fetcher.fetch(&reference).await;
            debug!(reference = %reference, ok, "image fetch finished");
            slots.borrow_mut().insert(reference, Slot::Done(ok));
            ok
        });

        let slots = Rc::clone(&self.slots);
        let reference = reference.to_owned();
        async move {
            match handle.await {
                Ok(ok) => ok,
                Err(e) => {
                    debug!(reference = %reference, error = %e, "image fetch task ended without an outcome");
                    slots.borrow_mut().insert(reference, Slot::Done(false));
                    false
                }
            }
        }
        .boxed_local()
        .shared()
    }
}
