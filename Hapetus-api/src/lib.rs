// Hapetus-api lib.rs
//
// REST surface of the Hapetus health tracker: routing, handlers,
// OpenAPI documentation and runtime configuration.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;
