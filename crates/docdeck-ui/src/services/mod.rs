//! Browser adapters for the core seams (wasm32 only).

pub mod api;
pub mod notify;
pub mod scheduler;

pub use api::HttpEndpoint;
pub use notify::ConsoleNotifier;
pub use scheduler::BrowserScheduler;
