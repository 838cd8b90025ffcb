//! Shared test helpers: a scripted command runner standing in for occ.
//!
//! Each integration test compiles this module separately, so some helpers
//! may appear unused in one test binary while another relies on them.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ncs_core::{CommandRunner, Instance, NcsError, NcsResult};

/// Stock `app:list --output=json` payload: dashboard and mail enabled,
/// bookmarks disabled.
pub const APP_LIST_JSON: &str =
    r#"{"enabled":{"dashboard":"7.9.0","mail":"3.6.1"},"disabled":{"bookmarks":"14.2.1"}}"#;

/// One canned outcome for the next command the runner sees.
pub enum Reply {
    /// Succeed with this stdout.
    Ok(&'static str),
    /// Succeed with this stdout after running a side effect in the
    /// command's working directory (the updater rewriting `version.php`,
    /// for instance).
    OkThen(&'static str, Box<dyn Fn(&Path) + Send + Sync>),
    /// Fail with a fully populated command failure.
    Fail {
        return_code: i32,
        stdout: &'static str,
        stderr: &'static str,
    },
}

/// Pops one scripted [`Reply`] per invocation and records every argv it
/// sees. Panics, failing the test, when invoked with no replies left.
#[derive(Default)]
pub struct ScriptedRunner {
    state: Mutex<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<Reply>,
    calls: Vec<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                replies: replies.into_iter().collect(),
                calls: Vec::new(),
            }),
        }
    }

    /// Queue another reply behind the remaining script.
    pub fn push(&self, reply: Reply) {
        self.state.lock().unwrap().replies.push_back(reply);
    }

    /// Every argv seen so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// The trailing occ subcommand tokens of call `index`, with the shared
    /// `php -d memory_limit=512M occ --no-interaction` prefix stripped.
    pub fn occ_args(&self, index: usize) -> Vec<String> {
        let calls = self.calls();
        let argv = &calls[index];
        assert_eq!(
            &argv[..5],
            &[
                "php".to_string(),
                "-d".to_string(),
                "memory_limit=512M".to_string(),
                "occ".to_string(),
                "--no-interaction".to_string(),
            ],
            "call {index} is not an occ invocation: {argv:?}"
        );
        argv[5..].to_vec()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, argv: &[String], cwd: &Path) -> NcsResult<String> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(argv.to_vec());
            state.replies.pop_front()
        };
        match reply {
            Some(Reply::Ok(stdout)) => Ok(stdout.to_string()),
            Some(Reply::OkThen(stdout, side_effect)) => {
                side_effect(cwd);
                Ok(stdout.to_string())
            }
            Some(Reply::Fail {
                return_code,
                stdout,
                stderr,
            }) => Err(NcsError::CommandFailed {
                command: argv.to_vec(),
                return_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                streams: format!("{stdout}{stderr}"),
            }),
            None => panic!("no scripted reply left for {argv:?}"),
        }
    }
}

/// Instance over a placeholder path, driven by the given script.
pub fn scripted_instance(
    replies: impl IntoIterator<Item = Reply>,
) -> (Instance, Arc<ScriptedRunner>) {
    scripted_instance_at("/srv/nextcloud", replies)
}

/// Instance over `path`, driven by the given script.
pub fn scripted_instance_at(
    path: impl Into<PathBuf>,
    replies: impl IntoIterator<Item = Reply>,
) -> (Instance, Arc<ScriptedRunner>) {
    let runner = Arc::new(ScriptedRunner::new(replies));
    let instance = Instance::with_runner(path, runner.clone());
    (instance, runner)
}

/// Build a minimal release-style zip with everything under a `nextcloud/`
/// root, the layout the real distribution archives use.
pub fn write_release_zip(path: &Path) {
    use std::io::Write as _;

    let mut writer = zip::ZipWriter::new(fs::File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    writer.add_directory("nextcloud", options).unwrap();
    writer.start_file("nextcloud/index.php", options).unwrap();
    writer.write_all(b"<?php\n").unwrap();
    writer.start_file("nextcloud/version.php", options).unwrap();
    writer
        .write_all(b"<?php\n$OC_Version = array(29,0,0,19);\n")
        .unwrap();
    writer.finish().unwrap();
}

/// Write a `version.php` with the given `$OC_Version` array into `dir`.
pub fn write_version_php(dir: &Path, parts: &[u32]) {
    let joined = parts
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    fs::write(
        dir.join("version.php"),
        format!("<?php\n$OC_Version = array({joined});\n"),
    )
    .unwrap();
}
