//! Per-app views bound to an instance.

use std::path::PathBuf;

use crate::download::{self, ArchiveKind};
use crate::error::{NcsError, NcsResult};
use crate::instance::Instance;
use crate::occ::occ;

/// View over one app of an [`Instance`].
///
/// Construction does no I/O; accessors read through the instance's cached
/// listings as they stand at call time.
pub struct App<'a> {
    instance: &'a Instance,
    name: String,
}

impl std::fmt::Debug for App<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<'a> App<'a> {
    pub(crate) fn new(instance: &'a Instance, name: impl Into<String>) -> Self {
        Self {
            instance,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installed version, fetched fresh from the per-app config store.
    ///
    /// A completed [`update`](Self::update) is visible here immediately,
    /// even while the instance's cached listings still predate it. Fails
    /// with [`NcsError::AppNotInstalled`] when the cached listing has the
    /// name in neither set.
    pub fn version(&self) -> NcsResult<String> {
        self.ensure_installed()?;
        self.instance
            .get_app_config(&self.name, "installed_version")
    }

    /// Whether the cached listing has this app in the enabled set.
    pub fn is_enabled(&self) -> NcsResult<bool> {
        let list = self.instance.raw_app_list()?;
        if list.enabled.contains(&self.name) {
            return Ok(true);
        }
        if list.disabled.contains(&self.name) {
            return Ok(false);
        }
        Err(NcsError::AppNotInstalled {
            name: self.name.clone(),
        })
    }

    /// Version pending for this app in the cached update listing, if any.
    pub fn available_version(&self) -> NcsResult<Option<String>> {
        let lines = self.instance.raw_app_update_list()?;
        Ok(lines
            .iter()
            .find_map(|line| update_line_version(line, &self.name)))
    }

    /// Enable the app. The instance's cached listing is left untouched.
    pub fn enable(&self) -> NcsResult<()> {
        self.instance.run(&occ(["app:enable", self.name.as_str()]))?;
        Ok(())
    }

    /// Disable the app. The instance's cached listing is left untouched.
    pub fn disable(&self) -> NcsResult<()> {
        self.instance
            .run(&occ(["app:disable", self.name.as_str()]))?;
        Ok(())
    }

    /// Update the app, returning its versions before and after. Equal
    /// versions mean nothing was pending.
    pub fn update(&self) -> NcsResult<(String, String)> {
        let old_version = self.version()?;
        self.instance.run(&occ(["app:update", self.name.as_str()]))?;
        let new_version = self.version()?;
        tracing::info!(app = %self.name, from = %old_version, to = %new_version, "app update finished");
        Ok((old_version, new_version))
    }

    /// Remove the app. Refresh the instance listing to observe the change.
    pub fn remove(&self) -> NcsResult<()> {
        self.instance.run(&occ(["app:remove", self.name.as_str()]))?;
        Ok(())
    }

    /// Install an app from the store (`name`) or from a package URL.
    ///
    /// Exactly one source must be given; both or neither fail with
    /// [`NcsError::InvalidInstallSource`] before any I/O happens. Neither
    /// path refreshes the instance caches.
    pub fn install(instance: &Instance, name: Option<&str>, url: Option<&str>) -> NcsResult<()> {
        match (name, url) {
            (Some(name), None) => {
                instance.run(&occ(["app:install", name]))?;
                Ok(())
            }
            (None, Some(url)) => install_from_url(instance, url),
            _ => Err(NcsError::InvalidInstallSource),
        }
    }

    fn ensure_installed(&self) -> NcsResult<()> {
        let list = self.instance.raw_app_list()?;
        if list.contains(&self.name) {
            Ok(())
        } else {
            Err(NcsError::AppNotInstalled {
                name: self.name.clone(),
            })
        }
    }
}

/// App packages unpack to a single root directory named after the app id;
/// enabling that id registers the unpacked app.
fn install_from_url(instance: &Instance, url: &str) -> NcsResult<()> {
    let kind = ArchiveKind::for_url(url)?;
    let archive = download::fetch_archive(url)?;
    let apps_dir = instance.path().join("apps");
    let roots = download::extract_archive(archive.path(), kind, &apps_dir, false)?;
    let mut ids = roots.into_iter();
    let (Some(app_id), None) = (ids.next(), ids.next()) else {
        return Err(NcsError::UnsupportedArchive {
            path: PathBuf::from(url),
            reason: "expected exactly one top-level app directory".to_string(),
        });
    };
    tracing::info!(app = %app_id, "unpacked app package");
    instance.run(&occ(["app:enable", app_id.as_str()]))?;
    Ok(())
}

/// Update listing lines read `<app> new version available: <version>`; the
/// app id leads the line and the version trails it.
fn update_line_version(line: &str, name: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != name {
        return None;
    }
    tokens.next_back().map(ToString::to_string)
}
