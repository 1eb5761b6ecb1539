//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod record_service;
