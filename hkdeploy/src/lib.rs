//! Heroku deployment helper
//!
//! Orchestrates zero-downtime-ish deploys: push code, run migrations,
//! toggle maintenance mode, and rescale worker/clock dynos.

pub mod api;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod models;
pub mod rendezvous;
