//! Reminder delivery
//!
//! Two paths lead to [`ReminderScheduler::fire`]: a per-item timer armed when the user sets
//! a reminder, and a periodic sweep over [`Database::due_reminders`]. The sweep runs on
//! start and at a steady interval, so a timer lost to a restart only delays delivery.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::job::ReminderJob;
use crate::core::StoreError;
use crate::database::Database;
use crate::features::items::ItemId;
use crate::gateway::ReplySink;
use crate::message_components::reminder_notification;

/// Result of one delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Notification sent and reminder cleared
    Delivered,
    /// Item no longer exists
    Dropped,
    /// Not due, already cleared, or being delivered by the other path
    Skipped,
    /// Send failed; the reminder stays set for the next sweep
    Failed,
}

/// Counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub due: usize,
    pub delivered: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub failed: usize,
}

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    database: Database,
    sink: Arc<dyn ReplySink>,
    timers: DashMap<ItemId, Timer>,
    in_flight: DashMap<ItemId, ()>,
    generation: AtomicU64,
    sweep_interval: std::time::Duration,
    purge_interval: std::time::Duration,
    retention: Duration,
}

/// Marks an item as being delivered until dropped
struct InFlight<'a> {
    map: &'a DashMap<ItemId, ()>,
    item_id: ItemId,
}

impl<'a> InFlight<'a> {
    fn acquire(map: &'a DashMap<ItemId, ()>, item_id: ItemId) -> Option<Self> {
        match map.entry(item_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self { map, item_id })
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.item_id);
    }
}

/// Shortest sweep or purge period; `tokio::time::interval` rejects zero
const MIN_TICK: std::time::Duration = std::time::Duration::from_secs(1);

/// Schedules and delivers item reminders; cheap to clone
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<Inner>,
}

impl ReminderScheduler {
    pub fn new(database: Database, sink: Arc<dyn ReplySink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                database,
                sink,
                timers: DashMap::new(),
                in_flight: DashMap::new(),
                generation: AtomicU64::new(0),
                sweep_interval: std::time::Duration::from_secs(60),
                purge_interval: std::time::Duration::from_secs(6 * 3600),
                retention: Duration::days(7),
            }),
        }
    }

    /// Override sweep interval, purge interval and stale-reminder retention
    ///
    /// Must be called before the scheduler is cloned.
    pub fn with_intervals(
        mut self,
        sweep: std::time::Duration,
        purge: std::time::Duration,
        retention: Duration,
    ) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.sweep_interval = sweep.max(MIN_TICK);
            inner.purge_interval = purge.max(MIN_TICK);
            inner.retention = retention;
        } else {
            warn!("Scheduler already shared; keeping existing intervals");
        }
        self
    }

    /// Persist the reminder on the item and arm its timer
    ///
    /// Returns false when the item no longer exists.
    pub async fn arm(&self, job: ReminderJob) -> Result<bool, StoreError> {
        if !self
            .inner
            .database
            .set_reminder(job.item_id, job.firing_time)
            .await?
        {
            return Ok(false);
        }
        self.schedule(job);
        Ok(true)
    }

    /// Register an in-process timer for a job, replacing any earlier one for the item
    pub fn schedule(&self, job: ReminderJob) {
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let delay = job.delay_from(Utc::now());
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let item_id = job.item_id;
        let firing_time = job.firing_time;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let scheduler = ReminderScheduler { inner };
            let now = Utc::now().max(firing_time);
            match scheduler.fire(item_id, now).await {
                Ok(outcome) => debug!("Timer for item {item_id}: {outcome:?}"),
                Err(e) => error!("Timer for item {item_id} failed: {e}"),
            }
            scheduler
                .inner
                .timers
                .remove_if(&item_id, |_, timer| timer.generation == generation);
        });

        debug!(
            "Armed timer for item {} (owner {}) in {}s",
            item_id,
            job.owner,
            delay.as_secs()
        );
        if let Some(previous) = self
            .inner
            .timers
            .insert(item_id, Timer { generation, handle })
        {
            previous.handle.abort();
        }
    }

    /// Drop the item's timer, if any. The stored reminder is left alone.
    pub fn cancel(&self, item_id: ItemId) {
        if let Some((_, timer)) = self.inner.timers.remove(&item_id) {
            timer.handle.abort();
            debug!("Cancelled timer for item {item_id}");
        }
    }

    /// Number of armed timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.retain(|_, timer| !timer.handle.is_finished());
        self.inner.timers.len()
    }

    /// Deliver the item's reminder if it is due at `now`
    ///
    /// The item is fetched fresh. The reminder is cleared only after the send succeeded.
    pub async fn fire(&self, item_id: ItemId, now: DateTime<Utc>) -> Result<FireOutcome, StoreError> {
        let Some(_guard) = InFlight::acquire(&self.inner.in_flight, item_id) else {
            return Ok(FireOutcome::Skipped);
        };

        let Some(item) = self.inner.database.get(item_id).await? else {
            debug!("Reminder for deleted item {item_id} dropped");
            return Ok(FireOutcome::Dropped);
        };
        let fired_at = match item.reminder_at {
            Some(at) if at <= now => at,
            _ => return Ok(FireOutcome::Skipped),
        };

        if let Err(e) = self
            .inner
            .sink
            .send(&item.owner, reminder_notification(&item))
            .await
        {
            warn!(
                "Failed to deliver reminder for item {} to {}: {}",
                item_id, item.owner, e
            );
            return Ok(FireOutcome::Failed);
        }

        self.inner
            .database
            .clear_fired_reminder(item_id, fired_at)
            .await?;
        Ok(FireOutcome::Delivered)
    }

    /// Deliver every reminder due at `now`; failures are isolated per item
    pub async fn run_sweep_once(&self, now: DateTime<Utc>) -> Result<SweepReport, StoreError> {
        let due = self.inner.database.due_reminders(now).await?;
        let mut report = SweepReport {
            due: due.len(),
            ..SweepReport::default()
        };

        for item in due {
            match self.fire(item.id, now).await {
                Ok(FireOutcome::Delivered) => report.delivered += 1,
                Ok(FireOutcome::Dropped) => report.dropped += 1,
                Ok(FireOutcome::Skipped) => report.skipped += 1,
                Ok(FireOutcome::Failed) => report.failed += 1,
                Err(e) => {
                    error!("Reminder for item {} (owner {}) failed: {}", item.id, item.owner, e);
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Clear reminders that stayed undelivered past the retention window
    pub async fn purge_stale(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        self.inner
            .database
            .purge_stale_reminders(now - self.inner.retention)
            .await
    }

    /// Sweep and purge forever. The first sweep runs immediately, before the first purge.
    pub async fn run(self) {
        info!(
            "⏰ Reminder scheduler started (sweep every {}s, purge every {}s)",
            self.inner.sweep_interval.as_secs(),
            self.inner.purge_interval.as_secs()
        );

        let mut sweep = tokio::time::interval(self.inner.sweep_interval);
        let mut purge = tokio::time::interval(self.inner.purge_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        purge.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = sweep.tick() => {
                    match self.run_sweep_once(Utc::now()).await {
                        Ok(report) if report.due > 0 => info!(
                            "🔔 Reminder sweep: {} due, {} delivered, {} dropped, {} failed",
                            report.due, report.delivered, report.dropped, report.failed
                        ),
                        Ok(_) => {}
                        Err(e) => error!("Reminder sweep failed: {e}"),
                    }
                }
                _ = purge.tick() => {
                    match self.purge_stale(Utc::now()).await {
                        Ok(0) => {}
                        Ok(count) => info!("🧹 Purged {count} stale reminders"),
                        Err(e) => error!("Stale reminder purge failed: {e}"),
                    }
                }
            }
        }
    }
}
