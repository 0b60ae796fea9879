//! Fire-and-forget score submission.
//!
//! One long-lived worker thread takes submissions off a job channel, in
//! order, and reports back over a second channel that the front-end drains
//! with `poll()` once per frame. A failed submission is queued in the local
//! cache and retried by `flush_pending()`.

use super::cache::{LocalCache, PendingScore};
use super::{ProfileBackend, SessionContext, SyncError};
use crate::accounts::{AuthSession, ScoreReceipt};
use crate::core::game_state::RunSummary;
use crate::progression::Tier;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How a submitted score ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Stored by the backend.
    Saved { score: u64, receipt: ScoreReceipt },
    /// Backend failed; kept as pending.
    Queued { score: u64, error: String },
    /// Backend refused it outright (not retried).
    Rejected { score: u64, error: String },
    /// Anonymous play: recorded in the local cache only.
    Cached { score: u64, high_score: u64 },
}

struct Job {
    token: String,
    pending: PendingScore,
}

struct Submission {
    pending: PendingScore,
    result: Result<ScoreReceipt, SyncError>,
}

pub struct ScoreSync {
    cache: LocalCache,
    cache_path: Option<PathBuf>,
    jobs: Sender<Job>,
    results: Receiver<Submission>,
    in_flight: usize,
}

/// Worker loop. Ends when `ScoreSync` is dropped and the job channel closes.
fn submission_worker(
    backend: Arc<dyn ProfileBackend>,
    jobs: Receiver<Job>,
    results: Sender<Submission>,
) {
    debug!(backend = backend.name(), "score worker started");
    for Job { token, pending } in jobs {
        let result = backend.submit_score(&token, pending.score, pending.character_color);
        if results.send(Submission { pending, result }).is_err() {
            break;
        }
    }
    debug!("score worker stopped");
}

impl ScoreSync {
    pub fn new(backend: Arc<dyn ProfileBackend>, cache: LocalCache, cache_path: Option<PathBuf>) -> Self {
        let (jobs, job_rx) = mpsc::channel();
        let (result_tx, results) = mpsc::channel();
        std::thread::spawn(move || submission_worker(backend, job_rx, result_tx));
        Self {
            cache,
            cache_path,
            jobs,
            results,
            in_flight: 0,
        }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn save_cache(&self) {
        if let Some(path) = &self.cache_path {
            if let Err(e) = self.cache.save(path) {
                warn!(error = %e, "could not write local cache");
            }
        }
    }

    /// Remember a login (or forget it with `None`). Guest progress in the
    /// cache is left alone either way.
    pub fn remember_session(&mut self, session: Option<&AuthSession>) {
        self.cache.session = session.cloned();
        self.save_cache();
    }

    pub fn remember_character(&mut self, tier: Tier) {
        self.cache.selected_character = tier;
        self.save_cache();
    }

    /// The login remembered from a previous launch, if any.
    pub fn restored_context(&self) -> SessionContext {
        match &self.cache.session {
            Some(session) => SessionContext::Authenticated(session.clone()),
            None => SessionContext::Anonymous,
        }
    }

    /// Hand a finished run to the backend (logged in) or the cache (anonymous).
    /// Anonymous runs resolve immediately; the others arrive via `poll()`.
    pub fn submit(&mut self, context: &SessionContext, run: &RunSummary) -> Option<SyncOutcome> {
        match context {
            SessionContext::Anonymous => {
                let unlocked = self.cache.record_score(run.score);
                self.save_cache();
                info!(score = run.score, unlocked = unlocked.len(), "score cached locally");
                Some(SyncOutcome::Cached {
                    score: run.score,
                    high_score: self.cache.high_score,
                })
            }
            SessionContext::Authenticated(session) => {
                let pending = PendingScore {
                    username: session.profile.username.clone(),
                    score: run.score,
                    character_color: run.character,
                    recorded_at: Utc::now(),
                };
                self.enqueue(&session.token, vec![pending]);
                None
            }
        }
    }

    /// Re-submit scores queued for the logged-in user. Returns how many.
    pub fn flush_pending(&mut self, context: &SessionContext) -> usize {
        let SessionContext::Authenticated(session) = context else {
            return 0;
        };
        let pending = self.cache.take_pending_for(&session.profile.username);
        let count = pending.len();
        if count > 0 {
            info!(count, "retrying pending scores");
            self.save_cache();
            self.enqueue(&session.token, pending);
        }
        count
    }

    fn enqueue(&mut self, token: &str, scores: Vec<PendingScore>) {
        for pending in scores {
            let job = Job {
                token: token.to_string(),
                pending,
            };
            match self.jobs.send(job) {
                Ok(()) => self.in_flight += 1,
                Err(mpsc::SendError(Job { pending, .. })) => {
                    warn!(score = pending.score, "score worker is gone, queued for retry");
                    self.cache.record_pending_score(&pending.username, pending.score);
                    self.cache.queue(pending);
                    self.save_cache();
                }
            }
        }
    }

    /// Drain finished submissions without blocking.
    pub fn poll(&mut self) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(submission) = self.results.try_recv() {
            outcomes.push(self.settle(submission));
        }
        if !outcomes.is_empty() {
            self.save_cache();
        }
        outcomes
    }

    /// Block until every in-flight submission settles or `timeout` passes.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<SyncOutcome> {
        let deadline = Instant::now() + timeout;
        let mut outcomes = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(submission) => outcomes.push(self.settle(submission)),
                Err(_) => break,
            }
        }
        if !outcomes.is_empty() {
            self.save_cache();
        }
        outcomes
    }

    fn settle(&mut self, submission: Submission) -> SyncOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Submission { pending, result } = submission;
        let score = pending.score;

        match result {
            Ok(receipt) => {
                self.cache.absorb_receipt(&pending.username, &receipt);
                info!(score, high_score = receipt.high_score, "score saved");
                SyncOutcome::Saved { score, receipt }
            }
            Err(e) if e.is_transient() => {
                warn!(score, error = %e, "score submission failed, queued for retry");
                self.cache.record_pending_score(&pending.username, score);
                self.cache.queue(pending);
                SyncOutcome::Queued {
                    score,
                    error: e.to_string(),
                }
            }
            Err(e) => {
                warn!(score, error = %e, "score submission rejected");
                SyncOutcome::Rejected {
                    score,
                    error: e.to_string(),
                }
            }
        }
    }
}
