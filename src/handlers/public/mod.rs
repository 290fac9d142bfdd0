// handlers/public/mod.rs - Handlers that need no authentication
//
// Inputs arrive from anonymous clients, so every body goes through ApiJson and
// every path identifier is parsed before it reaches the store.

pub mod auth;
pub mod cohorts;
pub mod health;
pub mod students;
