pub mod calendar;
pub mod config;
pub mod navigation;
pub mod ui;
