pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod platform;
pub mod rules;
pub mod source;
pub mod ui;
