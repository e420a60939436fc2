// TUI module - Terminal User Interface

pub mod app;
pub mod event;
pub mod screens;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{drive, App, Flow, Screen, ScreenEvent};
pub use event::{Event, EventHandler};
pub use theme::Theme;
