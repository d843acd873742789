//! Styled terminal replies.

use std::io::Write;

use console::style;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "⚠️ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for the lines of a listing
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last line of a listing
pub static LAST_ITEM_PREFIX: &str = "└─";

/// Something to tell the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// A finished step
  Success(&'a str),
  /// Neutral information
  Info(&'a str),
  /// Something the user should look at
  Warning(&'a str),
  /// A failure that ends the command
  Error(&'a CuratordError),
  /// A titled list of `(label, value)` pairs
  Listing(&'a str, &'a [(String, String)]),
}

/// Where replies go.
pub trait UserInteraction {
  /// Shows one reply.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Replies on standard output, errors on standard error.
pub struct Terminal;

impl UserInteraction for Terminal {
  fn reply(&self, content: ResponseContent) -> Result<()> {
    let mut out = std::io::stdout().lock();
    match content {
      ResponseContent::Success(message) => {
        writeln!(out, "{} {}", style(SUCCESS_PREFIX).green(), style(message).green())?
      },
      ResponseContent::Info(message) => writeln!(out, "{} {message}", style(INFO_PREFIX).blue())?,
      ResponseContent::Warning(message) => {
        writeln!(out, "{} {}", style(WARNING_PREFIX).yellow(), style(message).yellow())?
      },
      ResponseContent::Error(error) => {
        eprintln!("{} {}", style(ERROR_PREFIX).red(), style(error).red())
      },
      ResponseContent::Listing(title, items) => {
        writeln!(out, "{} {}", style(INFO_PREFIX).blue(), style(title).bold())?;
        for (idx, (label, value)) in items.iter().enumerate() {
          let prefix = if idx + 1 == items.len() { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
          writeln!(out, "   {} {}: {}", style(prefix).dim(), style(label).dim(), value)?;
        }
      },
    }
    Ok(())
  }
}
