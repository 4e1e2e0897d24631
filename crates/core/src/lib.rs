//! Core business logic for marquee.

pub mod services;

pub use services::*;
