pub mod auth_service;
pub mod student_service;

pub use auth_service::{AuthError, AuthService, LoginRequest, LoginResponse, SignupRequest};
pub use student_service::StudentService;
