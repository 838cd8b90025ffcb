//! `ncs app` commands.

use anyhow::Result;
use clap::Args;
use ncs_core::App;
use serde_json::json;

use crate::opts::{InstanceOpts, instance};

#[derive(Args, Debug)]
pub struct AppNameArgs {
    /// App id
    pub name: String,
}

#[derive(Args, Debug)]
pub struct AppInstallArgs {
    /// Install from the app store by id
    #[arg(long)]
    pub name: Option<String>,

    /// Install from a package archive URL
    #[arg(long)]
    pub url: Option<String>,
}

pub fn cmd_app_list(opts: &InstanceOpts) -> Result<()> {
    let instance = instance(opts)?;
    let list = instance.raw_app_list()?;

    if opts.json {
        let payload = json!({ "enabled": list.enabled, "disabled": list.disabled });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for name in &list.enabled {
        println!("{name} (enabled)");
    }
    for name in &list.disabled {
        println!("{name} (disabled)");
    }
    Ok(())
}

pub fn cmd_app_updates(opts: &InstanceOpts) -> Result<()> {
    let instance = instance(opts)?;
    let lines = instance.raw_app_update_list()?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&json!(lines))?);
        return Ok(());
    }

    if lines.is_empty() {
        println!("No app updates pending");
        return Ok(());
    }
    for line in &lines {
        println!("{line}");
    }
    Ok(())
}

pub fn cmd_app_install(opts: &InstanceOpts, args: &AppInstallArgs) -> Result<()> {
    let instance = instance(opts)?;
    App::install(&instance, args.name.as_deref(), args.url.as_deref())?;
    println!("Installed {}", args.name.as_deref().unwrap_or("app package"));
    Ok(())
}

pub fn cmd_app_enable(opts: &InstanceOpts, args: &AppNameArgs) -> Result<()> {
    let instance = instance(opts)?;
    instance.get_app(&args.name)?.enable()?;
    println!("Enabled {}", args.name);
    Ok(())
}

pub fn cmd_app_disable(opts: &InstanceOpts, args: &AppNameArgs) -> Result<()> {
    let instance = instance(opts)?;
    instance.get_app(&args.name)?.disable()?;
    println!("Disabled {}", args.name);
    Ok(())
}

pub fn cmd_app_remove(opts: &InstanceOpts, args: &AppNameArgs) -> Result<()> {
    let instance = instance(opts)?;
    instance.get_app(&args.name)?.remove()?;
    println!("Removed {}", args.name);
    Ok(())
}

pub fn cmd_app_update(opts: &InstanceOpts, args: &AppNameArgs) -> Result<()> {
    let instance = instance(opts)?;
    let (old_version, new_version) = instance.get_app(&args.name)?.update()?;
    if old_version == new_version {
        println!("{} already up to date at {old_version}", args.name);
    } else {
        println!("Updated {} {old_version} -> {new_version}", args.name);
    }
    Ok(())
}
