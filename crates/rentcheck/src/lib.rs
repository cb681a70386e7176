//! Rent affordability scoring and the collaborators around it.

pub mod config;
pub mod error;
pub mod identity;
pub mod market;
pub mod persona;
pub mod presentation;
pub mod scoring;
pub mod submissions;
pub mod telemetry;
