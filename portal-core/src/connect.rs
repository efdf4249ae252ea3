//! Connect Orchestrator：校验输入，调用适配器加入网络，并对结果分类。

use crate::structs::{ConnectPayload, ConnectionOutcome, ConnectionRequest};
use crate::traits::NetworkTool;
use crate::ValidationError;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 连接失败时返回给用户的统一提示。
/// 仅凭 nmcli 的退出状态无法区分密码错误与网络不可达，因此不暴露主机诊断信息。
pub const CONNECT_FAILURE_REASON: &str = "Failed to connect. Check password?";

pub struct ConnectOrchestrator {
    tool: Arc<dyn NetworkTool>,
    // Some 时，同一时间只允许一个连接尝试
    single_flight: Option<Mutex<()>>,
}

impl ConnectOrchestrator {
    pub fn new(tool: Arc<dyn NetworkTool>, serialize_connects: bool) -> Self {
        Self {
            tool,
            single_flight: serialize_connects.then(|| Mutex::new(())),
        }
    }

    /// 校验请求并尝试连接。
    ///
    /// 输入不合法时返回 `ValidationError`，此时不会调用任何外部工具。
    /// 连接失败不是错误，而是 `ConnectionOutcome::Failure`；不会自动重试。
    pub async fn connect(
        &self,
        payload: &ConnectPayload,
    ) -> Result<ConnectionOutcome, ValidationError> {
        let request = ConnectionRequest::try_from(payload)?;

        let _guard = match &self.single_flight {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        tracing::info!(ssid = %request.ssid(), "Attempting to connect");
        match self
            .tool
            .join_network(request.ssid(), request.password())
            .await
        {
            Ok(()) => {
                tracing::info!(ssid = %request.ssid(), "Connected");
                Ok(ConnectionOutcome::Success)
            }
            Err(e) => {
                tracing::warn!(ssid = %request.ssid(), error = %e, "Connection attempt failed");
                Ok(ConnectionOutcome::Failure {
                    reason: CONNECT_FAILURE_REASON.to_string(),
                })
            }
        }
    }
}
