//! `ncs mail` commands.

use anyhow::Result;
use clap::{Args, ValueEnum};
use ncs_core::{MailAccount, MailAccountAuthMethod, MailEndpoint, SslMode};

use crate::opts::{InstanceOpts, instance};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Security {
    None,
    Ssl,
    Tls,
}

impl From<Security> for SslMode {
    fn from(value: Security) -> Self {
        match value {
            Security::None => SslMode::None,
            Security::Ssl => SslMode::Ssl,
            Security::Tls => SslMode::Tls,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum AuthMethod {
    Password,
    Xoauth2,
}

impl From<AuthMethod> for MailAccountAuthMethod {
    fn from(value: AuthMethod) -> Self {
        match value {
            AuthMethod::Password => MailAccountAuthMethod::Password,
            AuthMethod::Xoauth2 => MailAccountAuthMethod::Xoauth2,
        }
    }
}

#[derive(Args, Debug)]
pub struct MailCreateArgs {
    /// Owning user id
    pub user_id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    #[arg(long)]
    pub imap_host: String,
    #[arg(long, default_value_t = 993)]
    pub imap_port: u16,
    #[arg(long, value_enum, default_value_t = Security::Ssl)]
    pub imap_security: Security,
    #[arg(long)]
    pub imap_user: String,
    #[arg(long)]
    pub imap_password: String,

    #[arg(long)]
    pub smtp_host: String,
    #[arg(long, default_value_t = 587)]
    pub smtp_port: u16,
    #[arg(long, value_enum, default_value_t = Security::Tls)]
    pub smtp_security: Security,
    #[arg(long)]
    pub smtp_user: String,
    #[arg(long)]
    pub smtp_password: String,

    #[arg(long, value_enum, default_value_t = AuthMethod::Password)]
    pub auth_method: AuthMethod,
}

pub fn cmd_mail_create(opts: &InstanceOpts, args: &MailCreateArgs) -> Result<()> {
    let instance = instance(opts)?;
    let account = MailAccount {
        user_id: args.user_id.clone(),
        name: args.name.clone(),
        email_address: args.email.clone(),
        imap: MailEndpoint {
            host: args.imap_host.clone(),
            port: args.imap_port,
            ssl_mode: args.imap_security.into(),
            username: args.imap_user.clone(),
            password: args.imap_password.clone(),
        },
        smtp: MailEndpoint {
            host: args.smtp_host.clone(),
            port: args.smtp_port,
            ssl_mode: args.smtp_security.into(),
            username: args.smtp_user.clone(),
            password: args.smtp_password.clone(),
        },
        auth_method: args.auth_method.into(),
    };
    instance.create_mail_account(&account)?;
    println!("Created mail account {} for {}", args.email, args.user_id);
    Ok(())
}
