pub mod field;
pub mod form;
pub mod input;
pub mod installer;
pub mod loader;
pub mod logview;
pub mod table;
