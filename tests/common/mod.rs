//! Shared test utilities for linkwall integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Fakes are deterministic and count their calls so
//! harnesses can assert on network traffic without a network.

#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod fake_chat_api;
pub mod fakes;
pub mod fixtures;

pub use builders::*;
pub use fakes::*;
pub use fixtures::*;
