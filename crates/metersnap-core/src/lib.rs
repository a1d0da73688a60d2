//! metersnap core: reading model, measurement registry, wire DTOs and the
//! shared error surface.
//!
//! Nothing here depends on the HTTP stack or on the vision provider, so the
//! business rules can be exercised directly from tests and reused by any
//! transport.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as `MeterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;
pub mod protocol;
pub mod registry;

/// Shared result type.
pub use error::{Result, MeterError};
