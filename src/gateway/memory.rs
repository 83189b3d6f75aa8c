//! In-process reply sink
//!
//! Records every delivered reply. Can be switched into a failing mode to exercise
//! retry paths.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::ReplySink;
use crate::core::Reply;

#[derive(Default)]
pub struct MemorySink {
    sent: Mutex<Vec<(String, Reply)>>,
    failing: AtomicBool,
    /// Owners whose deliveries always fail
    unreachable: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make sends to one owner fail
    pub fn set_unreachable(&self, owner: &str) {
        if let Ok(mut list) = self.unreachable.lock() {
            list.push(owner.to_string());
        }
    }

    /// Snapshot of delivered replies in order
    pub fn sent(&self) -> Vec<(String, Reply)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sent_to(&self, owner: &str) -> Vec<Reply> {
        self.sent()
            .into_iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, r)| r)
            .collect()
    }
}

#[async_trait]
impl ReplySink for MemorySink {
    async fn send(&self, owner: &str, reply: Reply) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("delivery to {owner} failed");
        }
        let unreachable = self
            .unreachable
            .lock()
            .map(|list| list.iter().any(|o| o == owner))
            .unwrap_or(false);
        if unreachable {
            anyhow::bail!("{owner} is unreachable");
        }

        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("sink poisoned"))?
            .push((owner.to_string(), reply));
        Ok(())
    }
}
