//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/session layers decoupled from storage details.

pub mod calculator_service;
pub mod element_service;
