//! HTTP API for admission checks and runtime limit configuration.

mod handlers;
mod server;

pub use handlers::{router, ApiResponse, ClientStatus, CLIENT_ID_HEADER};
pub use server::HttpServer;
