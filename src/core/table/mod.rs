//! Table engine: view state over a fixed row set plus export.

pub mod export;
pub mod view;

pub use export::{export, export_to_writer, ExportError, ExportFormat, ExportStatus};
pub use view::{PageSizeSources, TableView, DEFAULT_PAGE_SIZE, SCREEN_CHROME_LINES};
