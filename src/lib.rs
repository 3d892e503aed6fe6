//! # tabs-pjax
//!
//! Client-side tab navigation acceleration and theme toggle for
//! server-rendered pages, compiled to WebAssembly.
//!
//! Tab-link clicks are intercepted, the target page is fetched as HTML, and
//! only the main content region is swapped in. Recently fetched pages are
//! cached for a short time and tab links are prefetched on hover and when the
//! browser is idle. A small theme controller keeps the `data-theme` attribute
//! in sync with a persisted preference.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`nav`] | Navigation state machine, page cache, click filter, URL helpers |
//! | [`theme`] | Theme mode and controller over an abstract host |
//! | [`config`] | Typed configuration with defaults |
//! | `browser` | web-sys host wiring DOM events to the above (feature `browser`) |
//!
//! Everything outside `browser` is free of browser dependencies and runs
//! under native `cargo test`.

pub mod config;
pub mod nav;
pub mod theme;

#[cfg(feature = "browser")]
pub mod browser;
