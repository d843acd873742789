//! Error types for the curator command line.

use thiserror::Error;

use super::*;

/// Error type alias used by the `curator` binary.
pub type Result<T> = core::result::Result<T, CuratordError>;

/// Errors surfaced by the command line.
#[derive(Error, Debug)]
pub enum CuratordError {
  /// An error raised by the library.
  #[error(transparent)]
  Curator(#[from] CuratorError),

  /// Writing to the terminal failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}
