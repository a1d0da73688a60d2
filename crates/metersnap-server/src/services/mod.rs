//! Request-independent business flows shared by the HTTP handlers.

pub mod readings;

pub use readings::ReadingService;
