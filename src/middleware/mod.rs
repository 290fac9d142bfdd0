pub mod auth;
pub mod error;

pub use auth::jwt_auth_middleware;
pub use error::{error_handler, handle_panic, not_found_handler, FailureReport};
