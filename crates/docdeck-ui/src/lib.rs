#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]
//! Docdeck web UI state layer.
//!
//! `core` holds the DOM-free view-state machinery (fetching, pagination,
//! selection, toggles) so it can be tested natively; `services` carries the
//! browser adapters and only builds for wasm32.

pub mod core;

#[cfg(target_arch = "wasm32")]
pub mod services;

pub use crate::core::view::ViewController;
