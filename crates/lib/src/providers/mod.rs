//! # Providers
//!
//! This module groups the two external seams of the library: AI providers,
//! which turn prompts into completions, and database backends, which hold
//! the data being asked about.

pub mod ai;
pub mod db;
