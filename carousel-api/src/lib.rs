//! Carousel API - REST layer over the rotation engine
//!
//! Thin Axum handlers delegating to `carousel-rotation`. The feed route is
//! fail-soft; administrative routes return structured JSON errors.

pub mod config;
pub mod error;
pub mod macros;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
