//! One-way cutover of local data into the remote backend.

pub mod engine;
pub mod mapping;
pub mod progress;
pub mod report;
mod retry;

pub use engine::Migrator;
pub use mapping::IdMap;
pub use progress::{MigrationPhase, MigrationProgress};
pub use report::{MigrationFailure, MigrationOutcome, MigrationReport};
