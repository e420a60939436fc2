pub mod help;
pub mod spinner;
pub mod status;
