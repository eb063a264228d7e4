//! Web API module for depot.
//!
//! REST surface over the upload/query service: route wiring, request
//! parsing, and response formatting. All interesting behavior lives in
//! the service and worker layers.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use extract::{SessionToken, SESSION_TOKEN_HEADER};
pub use router::create_router;
pub use server::DepotServer;
