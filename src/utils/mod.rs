//! Utility modules for the static site generator.

pub mod date;
pub mod fs;
pub mod minify;
pub mod slug;
