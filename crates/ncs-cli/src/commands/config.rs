//! `ncs config` commands.

use anyhow::Result;
use clap::Args;
use ncs_core::ConfigValue;
use serde_json::{Value, json};

use crate::opts::{InstanceOpts, instance};

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Config key
    pub name: String,

    /// Element of an array-valued key
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Config key
    pub name: String,

    /// Value; booleans and numbers are stored typed
    pub value: String,

    /// Element of an array-valued key
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ConfigDeleteArgs {
    /// Config key
    pub name: String,
}

pub fn cmd_config_get(opts: &InstanceOpts, args: &ConfigGetArgs) -> Result<()> {
    let instance = instance(opts)?;
    let value = instance.get_system_config(&args.name, args.index)?;
    if opts.json {
        println!("{}", serde_json::to_string(&json_value(&value))?);
    } else {
        println!("{value}");
    }
    Ok(())
}

pub fn cmd_config_set(opts: &InstanceOpts, args: &ConfigSetArgs) -> Result<()> {
    let instance = instance(opts)?;
    let value = ConfigValue::parse(&args.value);
    instance.set_system_config(&args.name, value, args.index)?;
    Ok(())
}

pub fn cmd_config_delete(opts: &InstanceOpts, args: &ConfigDeleteArgs) -> Result<()> {
    let instance = instance(opts)?;
    instance.delete_system_config(&args.name)?;
    Ok(())
}

fn json_value(value: &ConfigValue) -> Value {
    match value {
        ConfigValue::Bool(value) => json!(value),
        ConfigValue::Int(value) => json!(value),
        ConfigValue::Float(value) => json!(value),
        ConfigValue::Str(value) => json!(value),
    }
}
