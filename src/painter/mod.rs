//! Painter: polls the snapshot server and paints what is still missing
//!
//! One cycle fetches the desired records and the live canvas, plans the
//! difference, and submits each remaining record through a [`Submitter`].
//! A failed submission is logged and left for the next cycle.

pub mod client;
pub mod plan;
pub mod submit;

pub use client::{SnapshotClient, SnapshotSource};
pub use plan::{plan, Plan};
pub use submit::{select_submitter, sanitize_record, CommandSubmitter, HttpSubmitter, Submitter};

use tracing::{debug, info, warn};

use crate::config::PainterConfig;
use crate::errors::Result;

/// Counters for one painter cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub submitted: usize,
    pub failed: usize,
    /// Already correct or malformed
    pub skipped: usize,
}

/// Fetch / plan / submit loop
pub struct Painter {
    source: Box<dyn SnapshotSource>,
    submitter: Box<dyn Submitter>,
    config: PainterConfig,
}

impl Painter {
    /// Painter with the submitter selected by `config.submit`
    pub fn new(config: PainterConfig) -> Result<Self> {
        let client = SnapshotClient::new(&config)?;
        let submitter = select_submitter(&config.submit, &client);
        Ok(Self::with_submitter(config, client, submitter))
    }

    /// Painter reading from any snapshot source
    pub fn with_submitter(
        config: PainterConfig,
        source: impl SnapshotSource + 'static,
        submitter: Box<dyn Submitter>,
    ) -> Self {
        info!("Painter using {} submitter", submitter.name());
        Self {
            source: Box::new(source),
            submitter,
            config,
        }
    }

    pub fn submitter_name(&self) -> &'static str {
        self.submitter.name()
    }

    /// Run one fetch / plan / submit pass
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let desired = self.source.fetch_desired().await?;
        let live = match self.source.fetch_canvas().await {
            Ok(live) => live,
            Err(e) => {
                warn!("Could not read live canvas, painting everything: {}", e);
                None
            }
        };

        let plan = plan(&desired, live.as_deref());
        let mut report = CycleReport {
            skipped: plan.already_correct + plan.malformed,
            ..CycleReport::default()
        };
        debug!(
            "Planned {} records ({} already correct, {} malformed)",
            plan.records.len(),
            plan.already_correct,
            plan.malformed
        );

        for (i, record) in plan.records.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.pixel_delay()).await;
            }
            match self.submitter.submit(record).await {
                Ok(()) => report.submitted += 1,
                Err(e) => {
                    warn!("Submitting {:?} failed: {}", record, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Poll forever; stops only when the future is dropped
    pub async fn run(&self) -> Result<()> {
        loop {
            let submitted = match self.run_cycle().await {
                Ok(report) => {
                    info!(
                        "Cycle done: {} submitted, {} failed, {} skipped",
                        report.submitted, report.failed, report.skipped
                    );
                    report.submitted
                }
                Err(e) => {
                    warn!("Cycle failed: {}", e);
                    0
                }
            };

            if submitted == 0 {
                // Nothing to paint, don't spin
                tokio::time::sleep(self.config.idle_delay()).await;
            }
            tokio::time::sleep(self.config.poll_delay()).await;
        }
    }
}
