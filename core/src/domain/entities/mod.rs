//! Domain entities representing the login flow's objects.

pub mod challenge;
pub mod session;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use challenge::{Channel, PendingChallenge};
pub use session::{AuthSession, SESSION_TTL_DAYS};
pub use user::UserRecord;
