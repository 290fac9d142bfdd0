// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth): /auth/signup, /auth/login, /api/cohorts/*, /api/students/*, /health
// Protected (bearer token): /auth/verify
pub mod protected;
pub mod public;
