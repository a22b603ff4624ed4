//! # Atelier Server
//!
//! The host process: configuration, the render orchestrator, and the JSON
//! HTTP surface over the registry, page stores, plugin lifecycle, and
//! data-source engine. Authentication, CORS, and multipart parsing belong
//! to the external HTTP edge; this crate trusts the `x-user-id` header that
//! edge injects.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use render::{RenderOrchestrator, RenderedPage};
pub use state::AppState;
