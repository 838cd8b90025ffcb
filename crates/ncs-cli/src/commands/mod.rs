//! CLI command handlers.

pub mod app;
pub mod config;
pub mod download;
pub mod install;
pub mod mail;
pub mod status;
pub mod update;
pub mod users;
