//! xtui Library
//!
//! Terminal UI building blocks for command line tools: validated input
//! forms, filterable and exportable tables, progress loaders fed by a
//! message queue, and a sequential package installer.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod tui;

pub use core::field::{Field, FieldCollection, FieldKind, FieldSpec, FieldValue, ValidationRule};
pub use core::form::{FormEngine, FormOutcome, FormState, SubmissionResult};
pub use core::installer::{InstallReport, InstallerState, PackageManager};
pub use core::loader::{LoaderEvent, LoaderExit, LoaderHandle, Severity};
pub use core::table::{ExportFormat, ExportStatus, TableView};
pub use domain::config::XtuiConfig;
pub use domain::error::{XtuiError, XtuiResult};
