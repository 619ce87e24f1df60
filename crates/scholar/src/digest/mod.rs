//! Digest rendering.
//!
//! - [`DigestGenerator`] turns summary records into the message text
//! - [`OverviewSource`] supplies the optional overview paragraph

mod generator;
mod overview;

pub use generator::{escape_markdown, DigestGenerator, MARKDOWN_SPECIAL_CHARS};
pub use overview::{LlmOverview, OverviewSource};
