// src/fs/mod.rs
//! Filesystem module - input file type detection.

pub mod detection;

// Re-export commonly used types
pub use detection::{detect_file_type, ensure_audio, FileCategory, FileType};
