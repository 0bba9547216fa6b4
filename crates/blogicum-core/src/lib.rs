//! # Blogicum Core
//!
//! The domain layer of the Blogicum backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the content entities, the visibility/ownership access policy, and the ports
//! the infrastructure must implement.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;

pub use error::DomainError;
