
pub use event_helpers::*;
