//! Tab navigation: intercept, fetch, cache, swap.
//!
//! SYSTEM CONTEXT
//! ==============
//! `engine` decides what happens for each click, hover, history event and
//! fetch completion and returns [`engine::Action`]s. The browser host executes
//! those actions and feeds results back in. `cache`, `click` and `url` are
//! the pure helpers the engine is built from.

pub mod cache;
pub mod click;
pub mod engine;
pub mod error;
pub mod url;

pub use cache::{PageCache, PagePayload};
pub use click::{Button, ClickInfo, Modifiers};
pub use engine::{Action, FetchPurpose, NavContext, NavCore, NavPhase, RequestId};
pub use error::NavError;
