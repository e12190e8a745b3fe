//! OTP gateway contract
//!
//! The gateway is the narrow translation layer between the two logical
//! operations of the login flow ("request code", "verify code") and the
//! backend. Implementations live in the infrastructure crate.

mod traits;
mod types;

pub use traits::OtpGateway;
pub use types::{
    SendCodeResult, VerifyCodeResult, RESEND_FAILURE_MESSAGE, SEND_FAILURE_MESSAGE,
    UNREACHABLE_MESSAGE, VERIFY_FAILURE_MESSAGE,
};
