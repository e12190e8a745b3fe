//! Services containing the login flow and the contracts it drives.

pub mod flow;
pub mod gateway;
pub mod session;

// Re-export commonly used types
pub use flow::{CooldownTimer, FlowConfig, OtpFlow};
pub use gateway::{OtpGateway, SendCodeResult, VerifyCodeResult};
pub use session::SessionStore;
