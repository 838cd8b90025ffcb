//! `ncs status` command.

use anyhow::Result;
use serde_json::json;

use crate::opts::{InstanceOpts, instance};

pub fn cmd_status(opts: &InstanceOpts) -> Result<()> {
    let instance = instance(opts)?;
    let version = instance.version()?;
    let available = instance.available_version()?;

    if opts.json {
        let payload = json!({ "version": version, "available": available });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Version:   {version}");
    match available {
        Some(available) => println!("Available: {available}"),
        None => println!("Available: up to date"),
    }
    Ok(())
}
