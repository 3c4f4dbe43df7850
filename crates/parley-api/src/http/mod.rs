//! HTTP/REST API layer for Parley.
//!
//! Axum-based REST API at `/api/` with CORS support. Errors use the
//! `{"detail": "..."}` body shape throughout.

pub mod error;
pub mod handlers;
pub mod router;
