//! In-process COM server exporting the shell entry points.

#[cfg(windows)]
#[macro_use]
extern crate lazy_static;

#[cfg(windows)]
mod dll;
