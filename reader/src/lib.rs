//! Paginated image reader engine for the digital magazine.
//!
//! The engine owns an ordered sequence of page image references, the cursor
//! over them, and the per-reference load state. It never touches a rendering
//! environment directly: every visual change is emitted as an explicit
//! [`surface::Command`] applied to an injected [`surface::RenderSurface`], and
//! images are fetched through an injected [`loader::ImageFetcher`]. That keeps
//! the whole state machine testable headless.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`driver`] | [`Reader`]: async driver wiring core, loader, surface and timers |
//! | [`engine`] | Pure cursor/animation state machine ([`engine::ReaderCore`]) |
//! | [`loader`] | Memoized image loading with in-flight attach |
//! | [`surface`] | Render commands, the surface trait, and a headless surface |
//! | [`input`] | Key and gesture mapping to reader actions |
//! | [`chrome`] | Toolbar/controls visibility state |
//! | [`storage`] | Persisted flag stores (tutorial seen) |
//! | [`consts`] | Timing and threshold constants |
//!
//! All asynchronous work runs on a single thread: the reader must be driven
//! from inside a [`tokio::task::LocalSet`].

pub mod chrome;
pub mod consts;
pub mod driver;
pub mod engine;
pub mod input;
pub mod loader;
pub mod storage;
pub mod surface;

pub use driver::Reader;
pub use engine::Manifest;
