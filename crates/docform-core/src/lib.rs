//! docform-core: path-addressed editing of nested JSON documents
//!
//! This crate focuses on a small, well-factored surface:
//! - Key paths with JSON Pointer text form
//! - Leaf/branch classification and raw-text coercion for form inputs
//! - Auto-vivifying writes at arbitrary paths
//! - Edit sessions (working copy + original + change log) with reset and diff
//! - Rendering contract for hosts (field descriptors, collapse state)
//! - File load/save with zip backup, and document discovery
//!
pub mod classify;
pub mod error;
pub mod io;
pub mod mutate;
pub mod path;
pub mod session;
pub mod view;

pub use classify::{FieldKind, coerce, display_text, is_branch, is_leaf};
pub use error::{EditError, Result};
pub use io::{SaveOpts, ScanOpts, backup_file, find_documents, load_file, save_file};
pub use mutate::{lookup, set_at_path, with_assignment};
pub use path::Path;
pub use session::{ChangeRecord, EditSession, ValueChange, diff_values};
pub use view::{CollapseState, Field, children, field};
