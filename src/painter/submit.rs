//! Submit back-ends: where a record goes once the painter decides to paint it

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use tokio::process::Command;
use tracing::{debug, info};

use super::client::SnapshotClient;
use crate::config::SubmitMode;
use crate::errors::{PlaceError, Result};

lazy_static! {
    /// Everything a record may legitimately contain
    #[allow(clippy::expect_used)]
    static ref UNSAFE_RECORD_CHARS: Regex =
        Regex::new(r"[^a-zA-Z0-9 ▀_]").expect("Invalid record sanitizer regex");
}

/// Strip characters outside `[A-Za-z0-9 ▀_]` before a record reaches a command line
pub fn sanitize_record(record: &str) -> String {
    UNSAFE_RECORD_CHARS.replace_all(record, "").into_owned()
}

/// Delivers one serialized cell to the canvas
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Paint one record
    async fn submit(&self, record: &str) -> Result<()>;

    /// Name of this submitter
    fn name(&self) -> &'static str;
}

/// `GET {base}/put?pixel=<record>`
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    put_url: String,
}

impl HttpSubmitter {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            put_url: format!("{}/put", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, record: &str) -> Result<()> {
        let response = self
            .client
            .get(&self.put_url)
            .query(&[("pixel", record)])
            .send()
            .await
            .map_err(|e| PlaceError::network(format!("Failed to put pixel: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaceError::network(format!(
                "Failed to put pixel {record:?}. Status code: {status}"
            )));
        }
        debug!("Put pixel {}", record);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Runs an external paint command, `program args.. <record tokens..>`.
///
/// No shell is involved; the record is sanitized and split on spaces.
#[derive(Debug, Clone)]
pub struct CommandSubmitter {
    program: String,
    args: Vec<String>,
}

impl CommandSubmitter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argument list for one record
    pub fn command_args(&self, record: &str) -> Vec<String> {
        let sanitized = sanitize_record(record);
        self.args
            .iter()
            .cloned()
            .chain(
                sanitized
                    .split(' ')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            )
            .collect()
    }
}

#[async_trait]
impl Submitter for CommandSubmitter {
    async fn submit(&self, record: &str) -> Result<()> {
        let args = self.command_args(record);
        info!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PlaceError::CommandError(format!("{}: {e}", self.program).into()))?;

        if !output.status.success() {
            return Err(PlaceError::CommandError(
                format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )
                .into(),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Select the submitter named by the configuration
pub fn select_submitter(mode: &SubmitMode, client: &SnapshotClient) -> Box<dyn Submitter> {
    match mode {
        SubmitMode::Http => Box::new(HttpSubmitter::new(client.http().clone(), client.base_url())),
        SubmitMode::Command { program, args } => {
            Box::new(CommandSubmitter::new(program.clone(), args.clone()))
        }
    }
}
