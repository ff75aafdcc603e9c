//! Retry-bounded generation loop.
//!
//! Each item walks `Pending -> Attempting -> {Accepted, Exhausted}`. An attempt
//! is one backend call, one parse, and one fingerprint check. Backend
//! failures, parse failures and duplicate bodies each consume an attempt; only
//! acceptance appends a row. The item's id is consumed either way.
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::backend::Backend;
use crate::dedupe::{DedupStore, Fingerprint};
use crate::journal::{BestEffort, Journal};
use crate::model::{
    AttemptFailure, GenerationRequest, ItemOutcome, RunSummary, SamplingOptions,
};
use crate::parser;
use crate::prompt::{PromptTemplate, Vocabulary};
use crate::stop::StopSignal;
use crate::table::{Resume, TableFile};

/// Pacing and retry knobs, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// Last id to generate.
    pub target_count: u64,
    pub max_retries: u32,
    /// Pause between items.
    pub delay: Duration,
    /// Pause after a failed attempt when another one follows.
    pub retry_delay: Duration,
    pub sampling: SamplingOptions,
}

pub struct Generator<'a> {
    backend: &'a dyn Backend,
    template: PromptTemplate,
    vocabulary: Vocabulary,
    settings: GeneratorSettings,
    table: TableFile,
    dedup: DedupStore,
    next_id: u64,
    journal: Journal,
    stop: StopSignal,
    rng: StdRng,
}

impl<'a> Generator<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backend: &'a dyn Backend,
        template: PromptTemplate,
        vocabulary: Vocabulary,
        settings: GeneratorSettings,
        table: TableFile,
        resume: Resume,
        journal: Journal,
        stop: StopSignal,
    ) -> Self {
        Self {
            backend,
            template,
            vocabulary,
            settings,
            table,
            dedup: resume.dedup,
            next_id: resume.next_id,
            journal,
            stop,
            rng: StdRng::from_entropy(),
        }
    }

    /// Make role/adjective selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn dedup(&self) -> &DedupStore {
        &self.dedup
    }

    /// Process ids from the resume point up to `target_count`, honouring the
    /// stop signal between items.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let start_id = self.next_id;
        let target = self.settings.target_count;
        let mut summary = RunSummary {
            start_id,
            next_id: start_id,
            requested: target.checked_sub(start_id).map_or(0, |n| n.saturating_add(1)),
            ..Default::default()
        };

        info!(
            start_id,
            target,
            known_bodies = self.dedup.len(),
            template = %self.template.name,
            "starting generation session"
        );
        self.journal
            .event(&format!(
                "--- STARTING SESSION FROM ID {} ({} existing unique emails) ---",
                start_id,
                self.dedup.len()
            ))
            .await;

        while self.next_id <= target {
            if self.stop.requested() {
                info!(id = self.next_id, "stop requested; closing safely");
                self.journal
                    .event(&format!(
                        "MANUAL STOP: {} detected before ID {}.",
                        self.stop.sentinel().display(),
                        self.next_id
                    ))
                    .await;
                summary.stopped = true;
                break;
            }

            let id = self.next_id;
            let outcome = self.process_item(id).await?;
            self.next_id += 1;

            match &outcome {
                ItemOutcome::Accepted { attempts } => {
                    summary.succeeded += 1;
                    info!(id, target, attempts, "saved");
                }
                ItemOutcome::Exhausted { failures } => {
                    summary.failed += 1;
                    if failures.contains(&AttemptFailure::Parse) {
                        summary.unparsable += 1;
                    }
                    let reasons: Vec<&str> = failures.iter().map(AttemptFailure::as_str).collect();
                    warn!(id, target, ?reasons, "skipping id after exhausting attempts");
                }
            }

            if self.next_id <= target && !self.settings.delay.is_zero() {
                tokio::time::sleep(self.settings.delay).await;
            }
        }

        summary.next_id = self.next_id;
        self.journal
            .event(&format!(
                "--- SESSION STOPPED. TOTAL NEW EMAILS: {} ---",
                summary.succeeded
            ))
            .await;
        Ok(summary)
    }

    /// Attempt a single item. Only a table write failure is returned as an error.
    #[instrument(skip_all, fields(id = id))]
    pub async fn process_item(&mut self, id: u64) -> Result<ItemOutcome> {
        let (role, adjective) = self.vocabulary.pick(&mut self.rng);
        let request = GenerationRequest {
            role: role.to_string(),
            adjective: adjective.to_string(),
            prompt: self.template.render(role, adjective),
            system: self.template.system.clone(),
            sampling: self.settings.sampling,
        };

        let max = self.settings.max_retries;
        let mut failures = Vec::with_capacity(max as usize);
        for attempt in 1..=max {
            let failure = match self.backend.generate(&request).await {
                Err(err) => {
                    warn!(id, attempt, error = %err, "backend call failed");
                    AttemptFailure::Backend
                }
                Ok(raw) => match parser::parse(&raw) {
                    Err(err) => {
                        let preview: String = raw.chars().take(200).collect();
                        warn!(id, attempt, error = %err, %preview, "format invalid");
                        self.journal
                            .debug
                            .write(id, attempt, &raw)
                            .await
                            .best_effort("debug artifact write");
                        AttemptFailure::Parse
                    }
                    Ok(parsed) => {
                        let fingerprint = Fingerprint::of(&parsed.body);
                        if self.dedup.contains(&fingerprint) {
                            info!(id, attempt, %fingerprint, "duplicate body discarded");
                            AttemptFailure::Duplicate
                        } else {
                            let record = parsed.with_id(id);
                            self.table
                                .append(&record)
                                .with_context(|| format!("failed to append email {}", id))?;
                            self.dedup.add(fingerprint);
                            self.journal
                                .debug
                                .clear(id, attempt)
                                .await
                                .best_effort("debug artifact cleanup");
                            self.journal
                                .event(&format!(
                                    "SUCCESS: Email ID {} saved. (Role: {}, Adjective: {})",
                                    id, request.role, request.adjective
                                ))
                                .await;
                            return Ok(ItemOutcome::Accepted { attempts: attempt });
                        }
                    }
                },
            };
            failures.push(failure);

            if attempt < max && !self.settings.retry_delay.is_zero() {
                tokio::time::sleep(self.settings.retry_delay).await;
            }
        }

        self.journal
            .event(&format!(
                "SKIPPED: Email ID {} failed after {} attempts.",
                id, max
            ))
            .await;
        Ok(ItemOutcome::Exhausted { failures })
    }
}
