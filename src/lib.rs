//! dupe-imports library for detecting and merging duplicate Go imports.
//!
//! This library provides programmatic access to the import deduplication
//! functionality. The core workflow involves three phases:
//!
//! 1. **Collection**: Parse a file and gather its import specs
//! 2. **Resolution**: Group specs by import path and pick a survivor per group
//! 3. **Rewriting**: Trim the losing specs and rename qualified references
//!    that used them, refusing any rename that an enclosing scope shadows
//!
//! # Example
//!
//! ```no_run
//! use dupe_imports::{Config, Outcome, process_source};
//! use std::path::Path;
//!
//! let source = std::fs::read_to_string("main.go").unwrap();
//! let config = Config::default();
//!
//! match process_source(&source, Path::new("main.go"), &config) {
//!     Ok(Outcome::Changed(fixed)) => print!("{fixed}"),
//!     Ok(Outcome::Unchanged) => print!("{source}"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod cli;
pub mod dedupe;
pub mod driver;
pub mod imports;
pub mod rewrite;
pub mod scanner;
pub mod scope;
pub mod syntax;
pub mod trim;

// Re-export commonly used types at crate root
pub use dedupe::{GroupSummary, KeepPolicy};
pub use driver::{Config, Error, FileReport, Outcome, check_source, process_source};
pub use rewrite::{RewriteError, Violation};
