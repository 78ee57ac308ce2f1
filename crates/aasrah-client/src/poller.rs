//! Report poller behind the NGO dashboard.
//!
//! Three status buckets are refreshed concurrently on a fixed period. A
//! bucket is replaced (and views notified) only when its set of report ids
//! changed, so an idle dashboard does not redraw every tick.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aasrah_shared::{
    Report, ReportFilter, ReportId, ReportStatus, ReportStore, ServiceError, StatusUpdate,
    ValidationError,
};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::events::{AppEvent, EventBus, Toast};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    New,
    InProgress,
    Completed,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::New, Bucket::InProgress, Bucket::Completed];

    pub fn status(&self) -> ReportStatus {
        match self {
            Bucket::New => ReportStatus::Submitted,
            Bucket::InProgress => ReportStatus::InProgress,
            Bucket::Completed => ReportStatus::Completed,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Bucket::New => "New Reports",
            Bucket::InProgress => "In Progress",
            Bucket::Completed => "Completed",
        }
    }
}

/// Latest snapshot of the three buckets, each sorted newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub new: Vec<Report>,
    pub in_progress: Vec<Report>,
    pub completed: Vec<Report>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &[Report] {
        match bucket {
            Bucket::New => &self.new,
            Bucket::InProgress => &self.in_progress,
            Bucket::Completed => &self.completed,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Report> {
        match bucket {
            Bucket::New => &mut self.new,
            Bucket::InProgress => &mut self.in_progress,
            Bucket::Completed => &mut self.completed,
        }
    }

    pub fn find(&self, id: &ReportId) -> Option<(Bucket, &Report)> {
        Bucket::ALL
            .into_iter()
            .find_map(|b| self.get(b).iter().find(|r| r.id == *id).map(|r| (b, r)))
    }

    /// Resolve a full id or an unambiguous id prefix (as shown on cards).
    pub fn resolve(&self, prefix: &str) -> Option<ReportId> {
        let mut hits = Bucket::ALL
            .into_iter()
            .flat_map(|b| self.get(b).iter())
            .filter(|r| r.id.0.starts_with(prefix));
        let first = hits.next()?;
        if first.id.0 == prefix || hits.next().is_none() {
            Some(first.id.clone())
        } else {
            None
        }
    }
}

fn ids(reports: &[Report]) -> HashSet<&ReportId> {
    reports.iter().map(|r| &r.id).collect()
}

/// True iff the id sets differ (non-empty symmetric difference).
pub fn ids_changed(prev: &[Report], next: &[Report]) -> bool {
    let prev = ids(prev);
    let next = ids(next);
    prev.symmetric_difference(&next).next().is_some()
}

/// Number of ids in `next` that were not in `prev`.
pub fn arrivals(prev: &[Report], next: &[Report]) -> usize {
    let prev = ids(prev);
    next.iter().filter(|r| !prev.contains(&r.id)).count()
}

pub fn arrivals_message(count: usize) -> String {
    if count == 1 {
        "1 new report".to_string()
    } else {
        format!("{count} new reports")
    }
}

/// What one refresh did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub changed: Vec<Bucket>,
    pub arrivals: usize,
    pub failed: Vec<Bucket>,
}

pub struct ReportPoller {
    reports: Arc<dyn ReportStore>,
    events: EventBus,
    snapshot: watch::Sender<Buckets>,
    /// The first successful load of the New bucket is a baseline and does
    /// not count as arrivals.
    baseline_taken: AtomicBool,
    refresh_lock: Mutex<()>,
}

impl ReportPoller {
    pub fn new(reports: Arc<dyn ReportStore>, events: EventBus) -> Self {
        let (snapshot, _) = watch::channel(Buckets::default());
        Self {
            reports,
            events,
            snapshot,
            baseline_taken: AtomicBool::new(false),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Views subscribe here; the value changes only when membership does.
    pub fn subscribe(&self) -> watch::Receiver<Buckets> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Buckets {
        self.snapshot.borrow().clone()
    }

    async fn fetch(&self, bucket: Bucket) -> std::result::Result<Vec<Report>, ServiceError> {
        let mut reports = self
            .reports
            .query(&ReportFilter::Status(bucket.status()))
            .await?;
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    /// Query all three buckets and fold changed ones into the snapshot.
    /// A failed bucket keeps its previous contents.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;

        let (new, in_progress, completed) = futures::join!(
            self.fetch(Bucket::New),
            self.fetch(Bucket::InProgress),
            self.fetch(Bucket::Completed),
        );

        let mut outcome = RefreshOutcome::default();
        let mut results = Vec::with_capacity(3);
        for (bucket, result) in [
            (Bucket::New, new),
            (Bucket::InProgress, in_progress),
            (Bucket::Completed, completed),
        ] {
            match result {
                Ok(reports) => results.push((bucket, reports)),
                Err(e) => {
                    error!(?bucket, error = %e, "Failed to fetch reports");
                    outcome.failed.push(bucket);
                }
            }
        }

        let new_loaded = results.iter().any(|(b, _)| *b == Bucket::New);
        let first_load = new_loaded && !self.baseline_taken.swap(true, Ordering::SeqCst);

        self.snapshot.send_if_modified(|current| {
            for (bucket, reports) in results {
                let slot = current.get_mut(bucket);
                if !ids_changed(slot, &reports) {
                    continue;
                }
                if bucket == Bucket::New && !first_load {
                    outcome.arrivals = arrivals(slot, &reports);
                }
                *slot = reports;
                outcome.changed.push(bucket);
            }
            !outcome.changed.is_empty()
        });

        if !outcome.failed.is_empty() {
            self.events.toast(Toast::error(
                "Error",
                "Failed to fetch reports. Please try again.",
            ));
        }
        if !outcome.changed.is_empty() {
            debug!(changed = ?outcome.changed, "Report buckets changed");
            self.events.emit(AppEvent::ReportsChanged);
        }
        if outcome.arrivals > 0 {
            info!(count = outcome.arrivals, "New reports arrived");
            self.events
                .toast(Toast::info("New Reports", arrivals_message(outcome.arrivals)));
        }

        outcome
    }

    pub async fn accept(&self, id: &ReportId, actor_id: &str) -> Result<()> {
        self.transition(id, ReportStatus::InProgress, actor_id).await
    }

    pub async fn decline(&self, id: &ReportId, actor_id: &str) -> Result<()> {
        self.transition(id, ReportStatus::Declined, actor_id).await
    }

    pub async fn mark_complete(&self, id: &ReportId, actor_id: &str) -> Result<()> {
        self.transition(id, ReportStatus::Completed, actor_id).await
    }

    /// Single targeted write, then an immediate refresh. The move must be
    /// legal against the local snapshot; remote writes stay last-writer-wins.
    async fn transition(&self, id: &ReportId, to: ReportStatus, actor_id: &str) -> Result<()> {
        let from = self.snapshot.borrow().find(id).map(|(_, r)| r.status);
        match from {
            Some(from) if from.can_transition_to(to) => {}
            _ => {
                return Err(ValidationError::IllegalTransition {
                    id: id.to_string(),
                    from: from.map_or("unknown", |s| s.as_str()).to_string(),
                    to: to.as_str().to_string(),
                }
                .into())
            }
        }

        self.reports
            .update_status(id, &StatusUpdate::new(to, actor_id))
            .await?;
        info!(report_id = %id, status = %to, "Report status updated");

        self.refresh().await;
        Ok(())
    }
}

/// Running poll loop. Dropping the handle cancels the timer.
pub struct PollerHandle {
    poller: Arc<ReportPoller>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Refresh immediately, then every `period`.
    pub fn spawn(poller: Arc<ReportPoller>, period: Duration) -> Self {
        let looped = poller.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                looped.refresh().await;
            }
        });
        debug!(period_secs = period.as_secs(), "Report poller started");
        Self { poller, task }
    }

    pub fn poller(&self) -> &Arc<ReportPoller> {
        &self.poller
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Report poller stopped");
    }
}
