//! Link previews for forum posts.
//!
//! A [`HelperRegistry`] holds the enabled previewers. For each link it picks
//! the highest-priority previewer that supports it, tells the host whether
//! the page has to be fetched first, and renders the preview HTML through
//! the previewer's template.

pub mod config;
pub mod error;
pub mod preview;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use preview::{HelperRegistry, Resolution};
