//! External command execution for `occ` and the release updater.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use crate::error::{NcsError, NcsResult};

/// occ runs out of memory with stock PHP limits on larger installations.
const PHP_MEMORY_LIMIT: &str = "memory_limit=512M";

/// Return code reported when a command could not be spawned at all.
const SPAWN_FAILURE_CODE: i32 = 127;

pub type DynCommandRunner = Arc<dyn CommandRunner>;

/// Executes external commands on behalf of an [`Instance`](crate::Instance).
///
/// The production implementation is [`SystemRunner`]; tests inject scripted
/// runners to drive instance behavior without a live installation.
pub trait CommandRunner: Send + Sync {
    /// Run `argv` in `cwd` and return captured stdout.
    ///
    /// A non-zero exit or a spawn failure yields
    /// [`NcsError::CommandFailed`] with every field populated.
    fn run(&self, argv: &[String], cwd: &Path) -> NcsResult<String>;
}

/// Runner backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], cwd: &Path) -> NcsResult<String> {
        let Some((program, args)) = argv.split_first() else {
            return Err(spawn_failure(argv, "empty command line".to_string()));
        };
        tracing::debug!(command = ?argv, cwd = %cwd.display(), "running command");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|err| spawn_failure(argv, err.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let return_code = output.status.code().unwrap_or(-1);
            tracing::debug!(command = ?argv, return_code, "command failed");
            return Err(NcsError::CommandFailed {
                command: argv.to_vec(),
                return_code,
                streams: combine_streams(&stdout, &stderr),
                stdout,
                stderr,
            });
        }

        Ok(stdout)
    }
}

fn spawn_failure(argv: &[String], message: String) -> NcsError {
    NcsError::CommandFailed {
        command: argv.to_vec(),
        return_code: SPAWN_FAILURE_CODE,
        stdout: String::new(),
        stderr: message.clone(),
        streams: message,
    }
}

/// stdout followed by stderr, the closest reconstruction of the terminal
/// transcript two separately captured pipes allow.
fn combine_streams(stdout: &str, stderr: &str) -> String {
    if stdout.is_empty() || stderr.is_empty() {
        return format!("{stdout}{stderr}");
    }
    let mut streams = String::with_capacity(stdout.len() + stderr.len() + 1);
    streams.push_str(stdout);
    if !stdout.ends_with('\n') {
        streams.push('\n');
    }
    streams.push_str(stderr);
    streams
}

/// argv for an occ subcommand, run from the installation directory.
pub(crate) fn occ<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut argv = vec![
        "php".to_string(),
        "-d".to_string(),
        PHP_MEMORY_LIMIT.to_string(),
        "occ".to_string(),
        "--no-interaction".to_string(),
    ];
    argv.extend(args.into_iter().map(Into::into));
    argv
}

/// argv for the release updater phar, run from the installation directory.
pub(crate) fn updater() -> Vec<String> {
    vec![
        "php".to_string(),
        "-d".to_string(),
        PHP_MEMORY_LIMIT.to_string(),
        "updater/updater.phar".to_string(),
        "--no-interaction".to_string(),
    ]
}
