//! Platform-specific conveniences.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::UserRightExt;
