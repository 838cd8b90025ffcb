//! Global CLI options and installation-path resolution.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ncs_core::Instance;

/// Global options for CLI commands.
///
/// These options apply to all commands and can be set via env vars.
#[derive(Args, Debug, Clone)]
pub struct InstanceOpts {
    /// Installation directory (env: NCS_PATH)
    #[arg(short = 'p', long, global = true, env = "NCS_PATH")]
    pub path: Option<PathBuf>,

    /// JSON output for listing commands
    #[arg(long, global = true)]
    pub json: bool,
}

/// Resolve the installation directory from options.
pub fn resolve_path(opts: &InstanceOpts) -> Result<PathBuf> {
    match &opts.path {
        Some(path) => Ok(path.clone()),
        None => anyhow::bail!(
            "No installation directory specified. Pass --path <DIR> or set NCS_PATH"
        ),
    }
}

/// Instance over the resolved installation directory.
pub fn instance(opts: &InstanceOpts) -> Result<Instance> {
    Ok(Instance::new(resolve_path(opts)?))
}
