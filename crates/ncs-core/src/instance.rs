//! One installed copy of the platform and its occ-backed views.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::app::App;
use crate::cache::CacheSlot;
use crate::config::ConfigValue;
use crate::download::{self, ArchiveKind};
use crate::error::{NcsError, NcsResult};
use crate::mail::MailAccount;
use crate::occ::{CommandRunner, DynCommandRunner, SystemRunner, occ, updater};

/// Distribution archive for the latest server release.
pub const LATEST_RELEASE_URL: &str =
    "https://download.nextcloud.com/server/releases/latest.zip";

static OC_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$OC_Version\s*=\s*array\s*\(([^)]*)\)").expect("version regex must compile")
});

static UPDATE_AVAILABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Nextcloud\s+(\S+)\s+is available").expect("update-check regex must compile")
});

/// Database backend selected at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Mysql,
    Pgsql,
    Sqlite,
}

impl DatabaseType {
    /// Value for the installer's `--database` flag.
    pub fn driver(self) -> &'static str {
        match self {
            DatabaseType::Mysql => "mysql",
            DatabaseType::Pgsql => "pgsql",
            DatabaseType::Sqlite => "sqlite",
        }
    }
}

/// Parameters for `occ maintenance:install`.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub database_type: DatabaseType,
    pub database_host: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,
    pub admin_username: String,
    pub admin_password: String,
}

/// One account known to the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// Enabled/disabled app-name sets as reported by `occ app:list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAppList {
    pub enabled: BTreeSet<String>,
    pub disabled: BTreeSet<String>,
}

impl RawAppList {
    /// True when the name is present in either set.
    pub fn contains(&self, name: &str) -> bool {
        self.enabled.contains(name) || self.disabled.contains(name)
    }
}

#[derive(Deserialize)]
struct AppListPayload {
    #[serde(default)]
    enabled: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    disabled: BTreeMap<String, serde_json::Value>,
}

/// One installation of the platform at a directory path.
///
/// Every command runs through an injected [`CommandRunner`] with `path` as
/// its working directory. The two listings ([`raw_app_list`] and
/// [`raw_app_update_list`]) are computed on first read, then served from
/// cache until the matching `refresh_*` call; mutating operations never
/// refresh them. Reads right after an enable/install/remove are therefore
/// stale on purpose, and callers decide when to pay for a re-query.
///
/// [`raw_app_list`]: Self::raw_app_list
/// [`raw_app_update_list`]: Self::raw_app_update_list
pub struct Instance {
    path: PathBuf,
    runner: DynCommandRunner,
    raw_app_list: CacheSlot<RawAppList>,
    raw_app_update_list: CacheSlot<Vec<String>>,
}

impl Instance {
    /// Instance over `path` using the system command runner.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_runner(path, Arc::new(SystemRunner))
    }

    /// Instance over `path` with an injected command runner.
    pub fn with_runner(path: impl Into<PathBuf>, runner: DynCommandRunner) -> Self {
        Self {
            path: path.into(),
            runner,
            raw_app_list: CacheSlot::new(),
            raw_app_update_list: CacheSlot::new(),
        }
    }

    /// Installation directory this instance manages.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn run(&self, argv: &[String]) -> NcsResult<String> {
        self.runner.run(argv, &self.path)
    }

    /// Download and unpack a server release into `target_dir`.
    ///
    /// A local archive is used when `zip_path` is given; otherwise the
    /// latest release is fetched from [`LATEST_RELEASE_URL`]. The archive's
    /// root component is stripped so `index.php` lands directly in
    /// `target_dir`. Refuses to touch a directory that already has entries.
    pub fn download(target_dir: impl AsRef<Path>, zip_path: Option<&Path>) -> NcsResult<()> {
        let target_dir = target_dir.as_ref();
        download::ensure_empty(target_dir)?;
        match zip_path {
            Some(archive) => {
                let kind = ArchiveKind::for_path(archive)?;
                download::extract_archive(archive, kind, target_dir, true)?;
            }
            None => {
                let kind = ArchiveKind::for_url(LATEST_RELEASE_URL)?;
                let archive = download::fetch_archive(LATEST_RELEASE_URL)?;
                download::extract_archive(archive.path(), kind, target_dir, true)?;
            }
        }
        tracing::info!(path = %target_dir.display(), "unpacked server release");
        Ok(())
    }

    /// Run the installer in a freshly unpacked `target_dir`.
    pub fn install(target_dir: impl AsRef<Path>, options: &InstallOptions) -> NcsResult<()> {
        let target_dir = target_dir.as_ref();
        SystemRunner.run(&install_args(options), target_dir)?;
        tracing::info!(path = %target_dir.display(), "installer finished");
        Ok(())
    }

    /// Installed platform version, read fresh from `version.php`.
    pub fn version(&self) -> NcsResult<String> {
        read_version(&self.path)
    }

    /// Run the release updater, returning the platform versions before and
    /// after. Equal versions mean there was nothing to update.
    pub fn update(&self) -> NcsResult<(String, String)> {
        let old_version = self.version()?;
        self.run(&updater())?;
        let new_version = self.version()?;
        tracing::info!(from = %old_version, to = %new_version, "updater finished");
        Ok((old_version, new_version))
    }

    /// Version reported ready by `occ update:check`, if any.
    ///
    /// The platform caches the check result itself, keyed by the
    /// `core lastupdatedat` app-config value; this layer does not manage
    /// that staleness. Clear the key via
    /// [`delete_app_config`](Self::delete_app_config) to force a fresh
    /// check.
    pub fn available_version(&self) -> NcsResult<Option<String>> {
        let output = self.run(&occ(["update:check"]))?;
        Ok(parse_update_check(&output))
    }

    /// Read a system config value, optionally one element of an array
    /// value.
    pub fn get_system_config(
        &self,
        name: &str,
        index: Option<usize>,
    ) -> NcsResult<ConfigValue> {
        let mut args = vec!["config:system:get".to_string(), name.to_string()];
        if let Some(index) = index {
            args.push(index.to_string());
        }
        let output = self.run(&occ(args))?;
        Ok(ConfigValue::parse(output.trim_end_matches('\n')))
    }

    /// Write a system config value, optionally one element of an array
    /// value, tagging the stored type so reads come back in the same
    /// domain.
    pub fn set_system_config(
        &self,
        name: &str,
        value: impl Into<ConfigValue>,
        index: Option<usize>,
    ) -> NcsResult<()> {
        let value = value.into();
        let mut args = vec!["config:system:set".to_string(), name.to_string()];
        if let Some(index) = index {
            args.push(index.to_string());
        }
        args.push(format!("--value={}", value.to_cli_text()));
        args.push(format!("--type={}", value.type_flag()));
        self.run(&occ(args))?;
        Ok(())
    }

    /// Delete a system config key.
    pub fn delete_system_config(&self, name: &str) -> NcsResult<()> {
        self.run(&occ(["config:system:delete", name]))?;
        Ok(())
    }

    /// Read an app-scoped config value as bare text.
    pub fn get_app_config(&self, app: &str, name: &str) -> NcsResult<String> {
        let output = self.run(&occ(["config:app:get", app, name]))?;
        Ok(output.trim_end_matches('\n').to_string())
    }

    /// Delete an app-scoped config key, e.g. `core lastupdatedat` to force
    /// the platform's next update check to run fresh.
    pub fn delete_app_config(&self, app: &str, name: &str) -> NcsResult<()> {
        self.run(&occ(["config:app:delete", app, name]))?;
        Ok(())
    }

    /// Enabled/disabled app sets, computed on first read and then served
    /// from cache.
    pub fn raw_app_list(&self) -> NcsResult<RawAppList> {
        self.raw_app_list
            .get_or_load(|| self.fetch_raw_app_list())
    }

    /// Unconditionally re-query the app listing and overwrite the cache.
    /// Works with or without a prior read.
    pub fn refresh_raw_app_list(&self) -> NcsResult<()> {
        let list = self.fetch_raw_app_list()?;
        self.raw_app_list.store(list);
        Ok(())
    }

    fn fetch_raw_app_list(&self) -> NcsResult<RawAppList> {
        let output = self.run(&occ(["app:list", "--output=json"]))?;
        parse_app_list(&output)
    }

    /// Pending app updates as raw listing lines, cached like
    /// [`raw_app_list`](Self::raw_app_list).
    pub fn raw_app_update_list(&self) -> NcsResult<Vec<String>> {
        self.raw_app_update_list
            .get_or_load(|| self.fetch_raw_app_update_list())
    }

    /// Unconditionally re-query the pending app updates and overwrite the
    /// cache.
    pub fn refresh_raw_app_update_list(&self) -> NcsResult<()> {
        let lines = self.fetch_raw_app_update_list()?;
        self.raw_app_update_list.store(lines);
        Ok(())
    }

    fn fetch_raw_app_update_list(&self) -> NcsResult<Vec<String>> {
        let output = self.run(&occ(["app:update", "--all", "--showonly"]))?;
        Ok(parse_update_lines(&output))
    }

    /// Bind an [`App`] view for `name` if the currently cached listing
    /// knows it, in either set. A name installed after the listing was
    /// cached stays invisible until [`refresh_raw_app_list`] runs.
    ///
    /// [`refresh_raw_app_list`]: Self::refresh_raw_app_list
    pub fn get_app(&self, name: &str) -> NcsResult<App<'_>> {
        let list = self.raw_app_list()?;
        if !list.contains(name) {
            return Err(NcsError::AppNotInstalled {
                name: name.to_string(),
            });
        }
        Ok(App::new(self, name))
    }

    /// Views over every app in the cached listing, enabled and disabled.
    pub fn installed_apps(&self) -> NcsResult<Vec<App<'_>>> {
        let list = self.raw_app_list()?;
        Ok(list
            .enabled
            .union(&list.disabled)
            .map(|name| App::new(self, name.clone()))
            .collect())
    }

    /// Accounts known to the instance, queried fresh on every call.
    pub fn users(&self) -> NcsResult<Vec<User>> {
        let output = self.run(&occ(["user:list", "--output=json"]))?;
        parse_user_list(&output)
    }

    /// Provision a mail-app account for an existing user.
    ///
    /// The mail app must already be installed and enabled; anything missing
    /// surfaces as the underlying command failure.
    pub fn create_mail_account(&self, account: &MailAccount) -> NcsResult<()> {
        self.run(&occ(account.to_args()))?;
        Ok(())
    }
}

fn install_args(options: &InstallOptions) -> Vec<String> {
    occ([
        "maintenance:install".to_string(),
        format!("--database={}", options.database_type.driver()),
        format!("--database-host={}", options.database_host),
        format!("--database-name={}", options.database_name),
        format!("--database-user={}", options.database_username),
        format!("--database-pass={}", options.database_password),
        format!("--admin-user={}", options.admin_username),
        format!("--admin-pass={}", options.admin_password),
    ])
}

fn read_version(path: &Path) -> NcsResult<String> {
    let version_php = path.join("version.php");
    let raw = fs::read_to_string(&version_php).map_err(|err| NcsError::VersionParse {
        path: version_php.clone(),
        reason: err.to_string(),
    })?;
    parse_version_php(&raw).ok_or_else(|| NcsError::VersionParse {
        path: version_php,
        reason: "no well-formed $OC_Version array".to_string(),
    })
}

/// `version.php` carries `$OC_Version = array(29, 0, 0, 19);`; the dotted
/// join of the array is the platform version.
fn parse_version_php(raw: &str) -> Option<String> {
    let captures = OC_VERSION_RE.captures(raw)?;
    let inner = captures.get(1)?.as_str();
    let mut parts = Vec::new();
    for part in inner.split(',') {
        let part = part.trim();
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        parts.push(part);
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("."))
}

fn parse_update_check(output: &str) -> Option<String> {
    UPDATE_AVAILABLE_RE
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|matched| matched.as_str().to_string())
}

fn parse_app_list(raw: &str) -> NcsResult<RawAppList> {
    let payload: AppListPayload = serde_json::from_str(raw).map_err(|err| NcsError::Json {
        context: "app:list",
        source: err,
    })?;
    Ok(RawAppList {
        enabled: payload.enabled.into_keys().collect(),
        disabled: payload.disabled.into_keys().collect(),
    })
}

fn parse_update_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_user_list(raw: &str) -> NcsResult<Vec<User>> {
    let payload: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(raw).map_err(|err| NcsError::Json {
            context: "user:list",
            source: err,
        })?;
    Ok(payload
        .into_iter()
        .map(|(id, value)| {
            let name = value
                .as_str()
                .map(ToString::to_string)
                .unwrap_or_else(|| id.clone());
            User { id, name }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn install_args_cover_database_and_admin_credentials() {
        let options = InstallOptions {
            database_type: DatabaseType::Mysql,
            database_host: "localhost".to_string(),
            database_name: "nextcloud".to_string(),
            database_username: "nextcloud".to_string(),
            database_password: "secret".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "adminpass".to_string(),
        };
        let argv = install_args(&options);
        assert_eq!(argv[5], "maintenance:install");
        assert!(argv.contains(&"--database=mysql".to_string()));
        assert!(argv.contains(&"--database-host=localhost".to_string()));
        assert!(argv.contains(&"--database-name=nextcloud".to_string()));
        assert!(argv.contains(&"--database-user=nextcloud".to_string()));
        assert!(argv.contains(&"--database-pass=secret".to_string()));
        assert!(argv.contains(&"--admin-user=admin".to_string()));
        assert!(argv.contains(&"--admin-pass=adminpass".to_string()));
    }

    #[test]
    fn database_drivers_match_the_installer_flags() {
        assert_eq!(DatabaseType::Mysql.driver(), "mysql");
        assert_eq!(DatabaseType::Pgsql.driver(), "pgsql");
        assert_eq!(DatabaseType::Sqlite.driver(), "sqlite");
    }

    #[test]
    fn version_php_parses_into_a_dotted_version() {
        let raw = "<?php\n$OC_Version = array(29,0,0,19);\n$OC_VersionString = '29.0.0';\n";
        assert_eq!(parse_version_php(raw), Some("29.0.0.19".to_string()));

        let spaced = "<?php\n$OC_Version = array( 30, 0, 1, 2 );\n";
        assert_eq!(parse_version_php(spaced), Some("30.0.1.2".to_string()));
    }

    #[test]
    fn malformed_version_php_is_rejected() {
        assert_eq!(parse_version_php("<?php\n"), None);
        assert_eq!(parse_version_php("$OC_Version = array();"), None);
        assert_eq!(parse_version_php("$OC_Version = array(29,'x');"), None);
    }

    #[test]
    fn read_version_reports_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        match read_version(dir.path()).unwrap_err() {
            NcsError::VersionParse { path, .. } => {
                assert_eq!(path, dir.path().join("version.php"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        fs::write(dir.path().join("version.php"), "<?php\n").unwrap();
        assert!(matches!(
            read_version(dir.path()),
            Err(NcsError::VersionParse { .. })
        ));

        fs::write(
            dir.path().join("version.php"),
            "<?php\n$OC_Version = array(29,0,0,19);\n",
        )
        .unwrap();
        assert_eq!(read_version(dir.path()).unwrap(), "29.0.0.19");
    }

    #[test]
    fn update_check_output_yields_the_available_version() {
        let output = "Nextcloud 29.0.8 is available. Get more information on how to update.\n\
                      Update for bookmarks to version 14.2.2 is available.\n";
        assert_eq!(parse_update_check(output), Some("29.0.8".to_string()));

        assert_eq!(parse_update_check("Everything up to date\n"), None);
    }

    #[test]
    fn app_list_json_becomes_name_sets() {
        let raw = r#"{"enabled":{"dashboard":"7.9.0","mail":"3.6.1"},"disabled":{"bookmarks":"14.2.1"}}"#;
        let list = parse_app_list(raw).unwrap();
        assert_eq!(
            list.enabled,
            BTreeSet::from(["dashboard".to_string(), "mail".to_string()])
        );
        assert_eq!(list.disabled, BTreeSet::from(["bookmarks".to_string()]));
        assert!(list.contains("mail"));
        assert!(list.contains("bookmarks"));
        assert!(!list.contains("calendar"));
    }

    #[test]
    fn app_list_decode_failure_carries_context() {
        match parse_app_list("not json").unwrap_err() {
            NcsError::Json { context, .. } => assert_eq!(context, "app:list"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn update_lines_are_trimmed_and_non_empty() {
        let output = "\nbookmarks new version available: 14.2.2\n\n  mail new version available: 3.7.0  \n";
        assert_eq!(
            parse_update_lines(output),
            vec![
                "bookmarks new version available: 14.2.2".to_string(),
                "mail new version available: 3.7.0".to_string(),
            ]
        );
        assert!(parse_update_lines("\n\n").is_empty());
    }

    #[test]
    fn user_list_json_becomes_users() {
        let users = parse_user_list(r#"{"admin":"Administrator","jane":"Jane Doe"}"#).unwrap();
        assert_eq!(
            users,
            vec![
                User {
                    id: "admin".to_string(),
                    name: "Administrator".to_string(),
                },
                User {
                    id: "jane".to_string(),
                    name: "Jane Doe".to_string(),
                },
            ]
        );
    }

    #[test]
    fn user_list_falls_back_to_the_id_for_unnamed_users() {
        let users = parse_user_list(r#"{"svc":null}"#).unwrap();
        assert_eq!(users[0].id, "svc");
        assert_eq!(users[0].name, "svc");
    }
}
