mod handler;
mod model;

pub use handler::{login, root, verify_access};
pub use model::{LoginRequest, TokenResponse, VerifyAccessResponse};
