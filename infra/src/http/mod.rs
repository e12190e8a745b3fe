//! HTTP transport used by the gateway
//!
//! The gateway only needs "POST this JSON, give me the status and body".
//! Keeping that behind a trait lets the response normalization be tested
//! without a server.

mod transport;

pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
