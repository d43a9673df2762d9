//! # che-render
//!
//! HTML rendering for the che static site builder.
//!
//! This crate turns the pages selected by a build into HTML files using
//! Askama templates.

pub mod html;
pub mod minify;
pub mod templates;

pub use html::{HtmlRenderer, RenderError};
pub use minify::minify_html;
pub use templates::{NavItem, PageTemplate};
