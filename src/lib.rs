//! Template configuration propagation for a monitoring backend.
//!
//! Hosts inherit their monitored configuration (applications, items,
//! triggers and graphs) from templates. This crate implements the
//! link/unlink engine that validates a template set against a host,
//! merges template entities onto it and tears the inherited
//! configuration down again, including the cascading deletes that keep
//! dependent rows consistent.

pub mod config;
pub mod db;
pub mod error;
pub mod external;

pub use config::EngineConfig;
pub use db::services::TemplateService;
pub use error::{CollisionError, EngineError, StoreError};
