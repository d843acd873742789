//! Database instruction implementations for paper management.
//!
//! Each instruction is a small value describing one store operation. Executing it runs
//! exactly one connection call, so every instruction is all-or-nothing on its own.

use rusqlite::params;

use super::*;

pub mod query;
pub mod update;
pub mod upsert;

pub use self::{query::*, update::*, upsert::*};

/// An operation that can be executed against the [`Database`].
#[async_trait]
pub trait DatabaseInstruction {
  /// What a successful execution yields.
  type Output;

  /// Runs the instruction.
  async fn execute(&self, db: &mut Database) -> Result<Self::Output>;
}
