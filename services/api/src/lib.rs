//! services/api/src/lib.rs
//!
//! The `api` service: configuration, the PostgreSQL adapter and the axum web layer
//! around the pantry planner core.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
