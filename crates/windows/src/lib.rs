//! Windows-only COM glue over the portable `comic-thumbs` core.
//!
//! Builds to an empty crate everywhere else so the workspace still
//! compiles and tests on non-Windows hosts.

#[cfg(windows)]
pub mod providers;
#[cfg(windows)]
pub mod utils;
#[cfg(windows)]
pub mod win_stream;
