//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver session wrapper and the document
//! capability trait the lookup sequence is written against.
//!
//! - [`browser::driver::MultaDriver`]: WebDriver client wrapper
//! - [`browser::context::DocumentContext`]: capability trait for page/frame access
//! - [`browser::context::WebdriverContext`]: fantoccini-backed implementation
pub mod browser;

pub use browser::context::{DocumentContext, DriverError, WebdriverContext};
pub use browser::driver::MultaDriver;
