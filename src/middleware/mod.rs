mod auth;
mod error_handler;

pub use auth::{Identity, auth_middleware, authorize};
pub use error_handler::log_errors;
