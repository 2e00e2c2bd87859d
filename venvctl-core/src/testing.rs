//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use wiremock::MockServer;

use crate::config::Settings;
use crate::error::Result;
use crate::runner::{CommandRunner, CommandSpec, ExecOptions};

type Hook = Box<dyn Fn(&CommandSpec) + Send + Sync>;

/// Records every command instead of spawning it.
///
/// Replies are taken from a queue; an empty queue answers with empty stdout.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<(CommandSpec, ExecOptions)>>,
    replies: Mutex<VecDeque<Result<String>>>,
    hook: Option<Hook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next command.
    pub fn reply(self, result: Result<String>) -> Self {
        self.replies.lock().unwrap().push_back(result);
        self
    }

    /// Runs `hook` for every command before replying.
    pub fn on_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CommandSpec) + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<(CommandSpec, ExecOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec, options: &ExecOptions) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((command.clone(), options.clone()));

        if let Some(hook) = &self.hook {
            hook(command);
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

/// Builds an in-memory zip with the given `(name, contents)` entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;

    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, contents) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// Settings pointing every URL at a local mock server.
pub fn local_settings(home: &Path, server: &MockServer) -> Settings {
    Settings {
        releases_url: format!("{}/tags", server.uri()),
        bootstrap_url: format!("{}/get-pip.py", server.uri()),
        allowed_domains: vec!["127.0.0.1".to_string()],
        require_https: false,
        ..Settings::default().with_home_dir(home)
    }
}
