// Utilities module
// Helper functions and tools

pub mod logging;
pub mod paths;

pub use paths::{is_inside, normalize_path, relative_to};
