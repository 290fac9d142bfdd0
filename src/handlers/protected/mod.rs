// handlers/protected/mod.rs - Handlers behind jwt_auth_middleware
//
// Each handler may read the decoded Claims from request extensions.

pub mod auth;
