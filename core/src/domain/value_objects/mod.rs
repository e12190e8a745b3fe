//! Value objects describing the observable state of a login flow.

pub mod flow_state;

// Re-export commonly used types
pub use flow_state::{ErrorInfo, FlowState, Notice, Phase};
