//! Filesystem primitives used by the lock manager.
//!
//! Lock state lives in the working copy as files inside `claimed/` and
//! `unclaimed/` folders, so every state transition is one of these calls.
//! None of them retry; failures surface as `ClaimerError::Io`.

mod listing;
mod move_file;
mod mutate;

pub use listing::{list_dirs, list_files};
pub use move_file::move_path;
pub use mutate::{remove_path, touch};
