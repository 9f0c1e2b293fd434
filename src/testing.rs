//! Test doubles shared by the unit tests.

use crate::proxy::{Executor, ProxyEntry, ProxyFetcher};
use crate::retry::Sleeper;

use anyhow::bail;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Executor that echoes the request, or fails while `failing` is set.
pub(crate) struct MockExecutor {
    pub failing: AtomicBool,
    pub calls: AtomicUsize,
}

impl MockExecutor {
    pub fn healthy() -> Self {
        Self {
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn broken() -> Self {
        let executor = Self::healthy();
        executor.failing.store(true, Ordering::SeqCst);
        executor
    }
}

#[async_trait]
impl Executor for MockExecutor {
    type Request = String;
    type Response = String;

    async fn execute(&self, request: &String) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        Ok(format!("ok {request}"))
    }
}

pub(crate) fn live(label: &str) -> ProxyEntry<MockExecutor> {
    ProxyEntry::new(label, MockExecutor::healthy(), Instant::now() + Duration::from_secs(3600))
}

pub(crate) fn broken(label: &str) -> ProxyEntry<MockExecutor> {
    ProxyEntry::new(label, MockExecutor::broken(), Instant::now() + Duration::from_secs(3600))
}

pub(crate) fn expired(label: &str) -> ProxyEntry<MockExecutor> {
    ProxyEntry::new(label, MockExecutor::healthy(), Instant::now())
}

/// One scripted answer of [`MockFetcher`].
pub(crate) enum Batch {
    Entries(Vec<ProxyEntry<MockExecutor>>),
    Fail(&'static str),
}

/// Fetcher that replays scripted batches, then either generates `count`
/// fresh healthy entries or returns nothing.
pub(crate) struct MockFetcher {
    script: Mutex<VecDeque<Batch>>,
    generate: bool,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn scripted(batches: Vec<Batch>) -> Self {
        Self {
            script: Mutex::new(batches.into()),
            generate: false,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn generating() -> Self {
        Self {
            generate: true,
            ..Self::scripted(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Counter of `fetch` calls that stays readable after the pool takes the fetcher.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ProxyFetcher<MockExecutor> for MockFetcher {
    async fn fetch(&self, count: usize) -> anyhow::Result<Vec<ProxyEntry<MockExecutor>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = self.script.lock().pop_front();
        match next {
            Some(Batch::Entries(entries)) => Ok(entries),
            Some(Batch::Fail(reason)) => bail!(reason),
            None if self.generate => Ok((0..count)
                .map(|i| live(&format!("socks5://10.0.{call}.{i}:1080")))
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}

/// Sleeper that records requested delays instead of waiting.
#[derive(Clone, Default)]
pub(crate) struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}
