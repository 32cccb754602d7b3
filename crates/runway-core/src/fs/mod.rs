//! Filesystem primitives shared across features.

pub mod layout;
pub mod remove;

pub use layout::{InstallLayout, is_single_segment};
pub use remove::{path_exists, remove_path_if_exists};
