use crate::traits::NetworkTool;
use crate::{AdapterError, AdapterErrorKind, FailureCause};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// A mock network tool for testing purposes.
/// It replays scripted results without touching any real hardware, and counts
/// how often each operation was invoked.
#[derive(Debug)]
pub struct MockTool {
    rescan: Result<(), FailureCause>,
    list: Result<String, FailureCause>,
    join: Result<(), FailureCause>,
    delay: Duration,
    rescan_calls: AtomicUsize,
    list_calls: AtomicUsize,
    join_calls: AtomicUsize,
}

impl Default for MockTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTool {
    /// Every call succeeds and the network list is empty.
    pub fn new() -> Self {
        Self {
            rescan: Ok(()),
            list: Ok(String::new()),
            join: Ok(()),
            delay: Duration::ZERO,
            rescan_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            join_calls: AtomicUsize::new(0),
        }
    }

    /// 一组固定的假网络，用于本地调试 UI
    pub fn with_demo_networks() -> Self {
        Self::new()
            .with_list_output(
                "MyHomeWiFi:95\nxfinitywifi:88\nCafeGuest:78\nMyHomeWiFi:61\nNeighbor's Network:55\n:40\nHiddenNetwork:42\n",
            )
            .with_delay(Duration::from_millis(500))
    }

    pub fn with_list_output(mut self, output: &str) -> Self {
        self.list = Ok(output.to_string());
        self
    }

    pub fn failing_rescan(mut self, cause: FailureCause) -> Self {
        self.rescan = Err(cause);
        self
    }

    pub fn failing_list(mut self, cause: FailureCause) -> Self {
        self.list = Err(cause);
        self
    }

    pub fn failing_join(mut self, cause: FailureCause) -> Self {
        self.join = Err(cause);
        self
    }

    /// 每次调用前模拟的耗时
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn rescan_calls(&self) -> usize {
        self.rescan_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn join_calls(&self) -> usize {
        self.join_calls.load(Ordering::SeqCst)
    }

    async fn simulate(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl NetworkTool for MockTool {
    async fn trigger_rescan(&self) -> Result<(), AdapterError> {
        self.rescan_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("[MockTool] Rescan requested (simulated)");
        self.simulate().await;
        self.rescan
            .clone()
            .map_err(|cause| AdapterError::new(AdapterErrorKind::RescanFailed, cause))
    }

    async fn list_networks(&self) -> Result<String, AdapterError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate().await;
        self.list
            .clone()
            .map_err(|cause| AdapterError::new(AdapterErrorKind::ListFailed, cause))
    }

    async fn join_network(&self, ssid: &str, _password: &str) -> Result<(), AdapterError> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(ssid = %ssid, "[MockTool] Join requested (simulated)");
        self.simulate().await;
        self.join
            .clone()
            .map_err(|cause| AdapterError::new(AdapterErrorKind::ConnectFailed, cause))
    }
}
