mod commands;
mod opts;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ncs_core::NcsError;

use commands::app::{AppInstallArgs, AppNameArgs};
use commands::config::{ConfigDeleteArgs, ConfigGetArgs, ConfigSetArgs};
use commands::download::DownloadArgs;
use commands::install::InstallArgs;
use commands::mail::MailCreateArgs;
use opts::InstanceOpts;

#[derive(Parser, Debug)]
#[command(name = "ncs", version, about = "NextCloud lifecycle management CLI")]
struct Cli {
    #[command(flatten)]
    opts: InstanceOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download and unpack a server release
    Download(DownloadArgs),

    /// Run the installer in an unpacked directory
    Install(InstallArgs),

    /// Show installed version and pending platform update
    Status,

    /// Run the release updater
    Update,

    /// System configuration commands
    #[command(subcommand)]
    Config(ConfigCommand),

    /// App management commands
    #[command(subcommand)]
    App(AppCommand),

    /// List user accounts
    Users,

    /// Mail app commands
    #[command(subcommand)]
    Mail(MailCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Read a system config value
    Get(ConfigGetArgs),

    /// Write a system config value, typed
    Set(ConfigSetArgs),

    /// Delete a system config key
    Delete(ConfigDeleteArgs),
}

#[derive(Subcommand, Debug)]
enum AppCommand {
    /// List installed apps
    List,

    /// List pending app updates
    Updates,

    /// Install an app by store id or package URL
    Install(AppInstallArgs),

    /// Enable an app
    Enable(AppNameArgs),

    /// Disable an app
    Disable(AppNameArgs),

    /// Remove an app
    Remove(AppNameArgs),

    /// Update an app
    Update(AppNameArgs),
}

#[derive(Subcommand, Debug)]
enum MailCommand {
    /// Provision a mail-app account for an existing user
    CreateAccount(MailCreateArgs),
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let opts = &cli.opts;

    let result = match cli.command {
        Command::Download(args) => commands::download::cmd_download(opts, &args),
        Command::Install(args) => commands::install::cmd_install(opts, &args),
        Command::Status => commands::status::cmd_status(opts),
        Command::Update => commands::update::cmd_update(opts),
        Command::Config(cmd) => match cmd {
            ConfigCommand::Get(args) => commands::config::cmd_config_get(opts, &args),
            ConfigCommand::Set(args) => commands::config::cmd_config_set(opts, &args),
            ConfigCommand::Delete(args) => commands::config::cmd_config_delete(opts, &args),
        },
        Command::App(cmd) => match cmd {
            AppCommand::List => commands::app::cmd_app_list(opts),
            AppCommand::Updates => commands::app::cmd_app_updates(opts),
            AppCommand::Install(args) => commands::app::cmd_app_install(opts, &args),
            AppCommand::Enable(args) => commands::app::cmd_app_enable(opts, &args),
            AppCommand::Disable(args) => commands::app::cmd_app_disable(opts, &args),
            AppCommand::Remove(args) => commands::app::cmd_app_remove(opts, &args),
            AppCommand::Update(args) => commands::app::cmd_app_update(opts, &args),
        },
        Command::Users => commands::users::cmd_users(opts),
        Command::Mail(cmd) => match cmd {
            MailCommand::CreateAccount(args) => commands::mail::cmd_mail_create(opts, &args),
        },
    };

    if let Err(err) = &result {
        // A failed occ call already carries its transcript; print it so the
        // operator sees what the command said, not just that it failed.
        if let Some(NcsError::CommandFailed { streams, .. }) = err.downcast_ref::<NcsError>() {
            if !streams.is_empty() {
                eprintln!("{streams}");
            }
        }
    }
    result
}

/// Set up tracing subscriber for command logging.
fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
