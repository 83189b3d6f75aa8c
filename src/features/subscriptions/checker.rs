//! Periodic check for upcoming subscription charges

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

use crate::core::StoreError;
use crate::database::Database;
use crate::gateway::ReplySink;
use crate::message_components::subscription_notice;

const MIN_TICK: std::time::Duration = std::time::Duration::from_secs(1);
const MAX_LEAD_DAYS: i64 = 31;

/// Counts from one check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub notified: usize,
    pub failed: usize,
}

/// Notifies owners `lead_days` before a subscription bills
pub struct SubscriptionReminder {
    database: Database,
    sink: Arc<dyn ReplySink>,
    lead_days: i64,
    interval: std::time::Duration,
}

impl SubscriptionReminder {
    pub fn new(
        database: Database,
        sink: Arc<dyn ReplySink>,
        lead_days: i64,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            database,
            sink,
            lead_days: lead_days.clamp(0, MAX_LEAD_DAYS),
            interval: interval.max(MIN_TICK),
        }
    }

    /// Billing dates covered by a check on `today`
    fn window(&self, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        (0..=self.lead_days).map(move |offset| today + Duration::days(offset))
    }

    /// Notify every subscription billing within the lead window that was not yet notified
    ///
    /// A failed send leaves the subscription unmarked so the next check retries it.
    pub async fn run_check_once(&self, now: DateTime<Utc>) -> Result<CheckReport, StoreError> {
        let today = now.date_naive();
        let mut report = CheckReport::default();

        for billing_date in self.window(today) {
            let days_until = (billing_date - today).num_days();
            for sub in self.database.subscriptions_billing_on(billing_date).await? {
                let notice = subscription_notice(&sub, billing_date, days_until);
                if let Err(e) = self.sink.send(&sub.owner, notice).await {
                    warn!(
                        "Failed to notify {} about subscription {}: {}",
                        sub.owner, sub.id, e
                    );
                    report.failed += 1;
                    continue;
                }
                self.database
                    .mark_subscription_notified(sub.id, billing_date)
                    .await?;
                report.notified += 1;
            }
        }
        Ok(report)
    }

    /// Check on start and then at the configured interval
    pub async fn run(self) {
        info!(
            "💳 Subscription reminder started (lead {} day(s), every {}s)",
            self.lead_days,
            self.interval.as_secs()
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.run_check_once(Utc::now()).await {
                Ok(report) if report.notified + report.failed > 0 => info!(
                    "💳 Subscription check: {} notified, {} failed",
                    report.notified, report.failed
                ),
                Ok(_) => {}
                Err(e) => error!("Subscription check failed: {e}"),
            }
        }
    }
}
