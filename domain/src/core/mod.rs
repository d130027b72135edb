//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: platform and repository identifiers

pub mod ids;
