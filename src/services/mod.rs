/// Services module - business logic layer
///
/// Services contain reusable logic that the screens call into, keeping the UI
/// layer thin.

pub mod downloads;
pub mod library;
pub mod updates;

// Re-export commonly used types
pub use library::Library;
pub use updates::UpdateStatus;
