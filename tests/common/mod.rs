//! Shared integration test utilities.
//!
//! - [`harness`] - router over an in-memory SQLite database
//! - [`fixtures`] - factories inserting rows directly through the service layer

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;
