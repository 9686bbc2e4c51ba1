//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod bake;
pub mod extract;
pub mod health;
pub mod verify;

pub use crate::state::AppState;
pub use bake::{bake_handler, BakeResponse};
pub use extract::{extract_handler, ExtractResponse};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use verify::{verify_handler, VerifyResponse};
