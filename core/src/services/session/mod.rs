//! Session persistence contract

mod traits;

pub use traits::SessionStore;
