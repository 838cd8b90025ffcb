//! Lifecycle management for self-hosted NextCloud installations: download,
//! install, upgrades, app management, and typed system configuration, all
//! orchestrated through the `occ` administrative CLI.
//!
//! [`Instance`] represents one installation on disk and owns two lazily
//! computed, explicitly refreshable listings (installed apps and pending app
//! updates). [`App`] is a per-app view that reads through its instance's
//! current cache snapshot. Mutating operations never refresh the caches;
//! staleness is observable and resolved only by the `refresh_*` calls.
//! External commands run through the [`CommandRunner`] seam so tests can
//! drive every workflow without a live installation.

mod app;
mod cache;
mod config;
mod download;
mod error;
mod instance;
mod mail;
mod occ;

pub use app::App;
pub use config::ConfigValue;
pub use error::{NcsError, NcsResult};
pub use instance::{
    DatabaseType, InstallOptions, Instance, LATEST_RELEASE_URL, RawAppList, User,
};
pub use mail::{MailAccount, MailAccountAuthMethod, MailEndpoint, SslMode};
pub use occ::{CommandRunner, DynCommandRunner, SystemRunner};
