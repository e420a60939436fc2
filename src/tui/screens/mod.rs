// Screens - one per interactive command
pub mod form;
pub mod installer;
pub mod loader;
pub mod logs;
pub mod table;

pub use form::FormScreen;
pub use installer::InstallerScreen;
pub use loader::LoaderScreen;
pub use logs::LogScreen;
pub use table::TableScreen;
