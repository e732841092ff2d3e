//! Shared test utilities for tailview integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. The fakes are deterministic with
//! `tokio::time::pause()`.

pub mod builders;
pub mod fakes;

pub use builders::*;
pub use fakes::*;
