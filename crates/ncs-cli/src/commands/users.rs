//! `ncs users` command.

use anyhow::Result;
use serde_json::json;

use crate::opts::{InstanceOpts, instance};

pub fn cmd_users(opts: &InstanceOpts) -> Result<()> {
    let instance = instance(opts)?;
    let users = instance.users()?;

    if opts.json {
        let payload: Vec<_> = users
            .iter()
            .map(|user| json!({ "id": user.id, "name": user.name }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for user in &users {
        println!("{}: {}", user.id, user.name);
    }
    Ok(())
}
