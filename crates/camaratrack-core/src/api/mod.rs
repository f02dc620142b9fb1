//! Remote source access for the Chamber of Deputies.
//!
//! This module provides the `SourceClient` seam (structured JSON API plus raw
//! HTML pages), its HTTP implementation, typed endpoint wrappers, and the
//! `RemoteError` every remote failure is reported as.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{HttpSourceClient, SourceClient};
pub use error::RemoteError;
