pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod error;
pub mod images;
pub mod runner;
pub mod session;
pub mod store;
pub mod ui;
pub mod wallpaper;
