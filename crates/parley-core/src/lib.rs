//! Business logic and repository trait definitions for Parley.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the completion orchestrator. It depends only on
//! `parley-types` -- never on `parley-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod model;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
