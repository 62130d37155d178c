//! Core, DOM-free primitives for the documents dashboard.
pub mod config;
pub mod endpoint;
pub mod fetch;
pub mod logic;
pub mod notify;
pub mod pagination;
pub mod request;
pub mod selection;
pub mod timer;
pub mod toggles;
pub mod view;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) mod testing;
