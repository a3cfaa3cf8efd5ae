/// File utilities
pub mod files;

/// Utilities for classification labels
pub mod classes;
