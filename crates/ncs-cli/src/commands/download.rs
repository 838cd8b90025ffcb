//! `ncs download` command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ncs_core::Instance;

use crate::opts::{InstanceOpts, resolve_path};

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Unpack this local release archive instead of fetching the latest
    /// release
    #[arg(long)]
    pub archive: Option<PathBuf>,
}

pub fn cmd_download(opts: &InstanceOpts, args: &DownloadArgs) -> Result<()> {
    let path = resolve_path(opts)?;
    Instance::download(&path, args.archive.as_deref())?;
    println!("Unpacked server release into {}", path.display());
    Ok(())
}
