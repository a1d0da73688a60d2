//! metersnap server library entry.
//!
//! Wires config, the reading service, vision adapters and the HTTP surface.
//! Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod vision;
