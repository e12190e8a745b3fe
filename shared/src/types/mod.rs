//! Type definitions shared across crates
//!
//! - `response` - the `{ success, message, data }` envelope used on the wire

pub mod response;

pub use response::ApiEnvelope;
