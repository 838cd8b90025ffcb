//! `ncs update` command.

use anyhow::Result;

use crate::opts::{InstanceOpts, instance};

pub fn cmd_update(opts: &InstanceOpts) -> Result<()> {
    let instance = instance(opts)?;
    let (old_version, new_version) = instance.update()?;
    if old_version == new_version {
        println!("Already up to date at {old_version}");
    } else {
        println!("Updated {old_version} -> {new_version}");
    }
    Ok(())
}
