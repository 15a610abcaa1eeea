//! File storage primitives.

pub mod atomic_file;

pub use atomic_file::{temp_path_for, write_atomic, write_atomic_sync};
