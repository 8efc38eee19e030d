pub mod idle;
pub mod scheduler;
pub mod task;

// Re-export commonly used types
pub use scheduler::{Error, FirstTask, Kernel, State, SVC_RESCHEDULE};
pub use task::{StackWord, TaskHandler, TaskStatus};
