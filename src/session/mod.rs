//! Resume checkpoint for interrupted backups
//!
//! A small JSON file in the user's backup directory records which datasets
//! are already on disk, so a `--resume` run can skip them.

mod checkpoint;

pub use checkpoint::{Session, SessionError, SessionState, SESSION_FILE};
