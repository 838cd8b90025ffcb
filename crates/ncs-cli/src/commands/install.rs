//! `ncs install` command.

use anyhow::Result;
use clap::{Args, ValueEnum};
use ncs_core::{DatabaseType, InstallOptions, Instance};

use crate::opts::{InstanceOpts, resolve_path};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Database {
    Mysql,
    Pgsql,
    Sqlite,
}

impl From<Database> for DatabaseType {
    fn from(value: Database) -> Self {
        match value {
            Database::Mysql => DatabaseType::Mysql,
            Database::Pgsql => DatabaseType::Pgsql,
            Database::Sqlite => DatabaseType::Sqlite,
        }
    }
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Database backend
    #[arg(long, value_enum, default_value_t = Database::Mysql)]
    pub database: Database,

    /// Database server host
    #[arg(long, default_value = "localhost")]
    pub database_host: String,

    /// Database name
    #[arg(long)]
    pub database_name: String,

    /// Database user
    #[arg(long)]
    pub database_user: String,

    /// Database password
    #[arg(long)]
    pub database_pass: String,

    /// Admin account name
    #[arg(long)]
    pub admin_user: String,

    /// Admin account password
    #[arg(long)]
    pub admin_pass: String,
}

pub fn cmd_install(opts: &InstanceOpts, args: &InstallArgs) -> Result<()> {
    let path = resolve_path(opts)?;
    let options = InstallOptions {
        database_type: args.database.into(),
        database_host: args.database_host.clone(),
        database_name: args.database_name.clone(),
        database_username: args.database_user.clone(),
        database_password: args.database_pass.clone(),
        admin_username: args.admin_user.clone(),
        admin_password: args.admin_pass.clone(),
    };
    Instance::install(&path, &options)?;
    println!("Installed at {}", path.display());
    Ok(())
}
