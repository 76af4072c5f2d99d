pub mod models;
pub mod service;

pub use models::*;
pub use service::{AppState, MAX_REQUEST_BYTES, build_router, create_app};
