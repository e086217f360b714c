// Batch generation: splits a requested alias count into batches of at most
// `concurrency` generate-then-reserve sequences, runs each batch to
// completion before starting the next, and persists every reserved alias
// once the whole run has finished.

use std::fmt;

use crossterm::style::Stylize;
use futures::future::join_all;
use indicatif::ProgressBar;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{ApiError, HideMyEmailApi};
use crate::envelope::GeneratedAlias;
use crate::store::{AliasStore, StoreError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Reserve,
}

/// A sequence that ended without a reserved alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasFailure {
    pub stage: Stage,
    /// Set when generation succeeded and the reserve step failed.
    pub address: Option<String>,
    pub reason: String,
}

impl fmt::Display for AliasFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.stage, &self.address) {
            (Stage::Reserve, Some(address)) => {
                write!(f, "\"{address}\" - failed to reserve alias: {}", self.reason)
            }
            _ => write!(f, "failed to generate alias: {}", self.reason),
        }
    }
}

/// Outcome of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Reserved addresses in dispatch order; these are what got persisted.
    pub aliases: Vec<String>,
    pub failures: Vec<AliasFailure>,
    /// Batches that ran to completion.
    pub batches: usize,
    pub cancelled: bool,
}

/// Batch sizes for `count` aliases with at most `cap` in flight:
/// `ceil(count / cap)` batches, each of size `<= cap`.
pub fn plan_batches(count: usize, cap: usize) -> Vec<usize> {
    let cap = cap.max(1);
    let mut remaining = count;
    let mut batches = Vec::with_capacity(count.div_ceil(cap));
    while remaining > 0 {
        let size = remaining.min(cap);
        batches.push(size);
        remaining -= size;
    }
    batches
}

pub struct BatchOrchestrator<'a, A> {
    api: &'a A,
    concurrency: usize,
    store: AliasStore,
}

impl<'a, A: HideMyEmailApi> BatchOrchestrator<'a, A> {
    pub fn new(api: &'a A, concurrency: usize, store: AliasStore) -> Self {
        BatchOrchestrator {
            api,
            concurrency: concurrency.max(1),
            store,
        }
    }

    /// Generate `count` aliases.
    ///
    /// Per-alias failures are collected in the report and never stop the
    /// run. Transport or decode errors abort it. When `cancel` fires the run
    /// stops at once and nothing from it is written.
    pub async fn run(
        &self,
        count: usize,
        progress: &ProgressBar,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport, GenerateError> {
        let plan = plan_batches(count, self.concurrency);
        info!(count, batches = plan.len(), concurrency = self.concurrency, "starting generation");

        let mut report = GenerationReport::default();
        for (index, size) in plan.into_iter().enumerate() {
            debug!(batch = index + 1, size, "dispatching batch");
            let batch = join_all((0..size).map(|_| self.generate_one(progress)));
            let outcomes = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(completed_batches = report.batches, "generation cancelled");
                    return Ok(GenerationReport {
                        cancelled: true,
                        ..GenerationReport::default()
                    });
                }
                outcomes = batch => outcomes,
            };

            for outcome in outcomes {
                match outcome? {
                    Ok(address) => report.aliases.push(address),
                    Err(failure) => report.failures.push(failure),
                }
            }
            report.batches += 1;
        }

        self.store.append(&report.aliases)?;
        info!(
            created = report.aliases.len(),
            failed = report.failures.len(),
            "generation finished"
        );
        Ok(report)
    }

    /// One generate-then-reserve sequence.
    async fn generate_one(
        &self,
        progress: &ProgressBar,
    ) -> Result<Result<String, AliasFailure>, ApiError> {
        let generated = match self.api.generate_email().await?.into_result() {
            Ok(result) => serde_json::from_value::<GeneratedAlias>(result)?,
            Err(failure) => {
                return Ok(Err(self.fail(progress, Stage::Generate, None, failure.reason)));
            }
        };
        let address = generated.hme;
        progress.println(format!("[50%] \"{address}\" - generated, reserving..."));

        if let Err(failure) = self.api.reserve_email(&address).await?.into_result() {
            return Ok(Err(self.fail(
                progress,
                Stage::Reserve,
                Some(address),
                failure.reason,
            )));
        }

        progress.println(format!("[100%] \"{address}\" - reserved"));
        Ok(Ok(address))
    }

    fn fail(
        &self,
        progress: &ProgressBar,
        stage: Stage,
        address: Option<String>,
        reason: String,
    ) -> AliasFailure {
        let failure = AliasFailure {
            stage,
            address,
            reason,
        };
        debug!(stage = ?failure.stage, reason = %failure.reason, "alias sequence failed");
        progress.println(format!("{} {failure}", "[ERR]".red().bold()));
        failure
    }
}
