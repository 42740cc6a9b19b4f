//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_confidence, format_coord, format_date, format_optional, truncate_string};
