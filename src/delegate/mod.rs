pub mod dispatcher;
pub mod executor;

// Re-export commonly used types
pub use dispatcher::{Dispatcher, REJECTED_EXIT_CODE};
pub use executor::{CommandOutput, DelegateExecutor};
