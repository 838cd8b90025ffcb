//! Parameter types for mail-app account provisioning.

/// Transport security for one mail endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    /// Plain connection.
    None,
    /// Implicit TLS on a dedicated port.
    Ssl,
    /// STARTTLS upgrade on the plain port.
    Tls,
}

impl SslMode {
    /// Wire name understood by `mail:account:create`.
    pub fn wire_name(self) -> &'static str {
        match self {
            SslMode::None => "none",
            SslMode::Ssl => "ssl",
            SslMode::Tls => "tls",
        }
    }
}

/// How the account authenticates against both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailAccountAuthMethod {
    Password,
    Xoauth2,
}

impl MailAccountAuthMethod {
    /// Wire name understood by `mail:account:create`.
    pub fn wire_name(self) -> &'static str {
        match self {
            MailAccountAuthMethod::Password => "password",
            MailAccountAuthMethod::Xoauth2 => "xoauth2",
        }
    }
}

/// One IMAP or SMTP endpoint plus its credentials.
#[derive(Debug, Clone)]
pub struct MailEndpoint {
    pub host: String,
    pub port: u16,
    pub ssl_mode: SslMode,
    pub username: String,
    pub password: String,
}

/// Everything `mail:account:create` takes: account identity plus the IMAP
/// and SMTP endpoint quintuples, in the command's positional order.
#[derive(Debug, Clone)]
pub struct MailAccount {
    pub user_id: String,
    pub name: String,
    pub email_address: String,
    pub imap: MailEndpoint,
    pub smtp: MailEndpoint,
    pub auth_method: MailAccountAuthMethod,
}

impl MailAccount {
    /// occ argument list for `mail:account:create`.
    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "mail:account:create".to_string(),
            self.user_id.clone(),
            self.name.clone(),
            self.email_address.clone(),
        ];
        for endpoint in [&self.imap, &self.smtp] {
            args.push(endpoint.host.clone());
            args.push(endpoint.port.to_string());
            args.push(endpoint.ssl_mode.wire_name().to_string());
            args.push(endpoint.username.clone());
            args.push(endpoint.password.clone());
        }
        args.push(format!("--auth-method={}", self.auth_method.wire_name()));
        args
    }
}
