//! Common utilities module
//!
//! This module contains shared error types used across the stack core.

pub mod error;

pub use error::{Result, StackError};
