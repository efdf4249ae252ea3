use crate::ValidationError;
use serde::{Deserialize, Serialize};

/// 扫描到的单个 Wi-Fi 网络
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WirelessNetwork {
    pub ssid: String,
    /// 信号强度，按 nmcli 输出原样透传（通常是 0 到 100 的百分比）
    pub signal: String,
}

impl WirelessNetwork {
    pub fn new(ssid: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            signal: signal.into(),
        }
    }
}

/// /api/connect 的请求体（未校验）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectPayload {
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// 经过校验的连接请求：ssid 和 password 都非空。
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    ssid: String,
    password: String,
}

impl ConnectionRequest {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ValidationError> {
        if ssid.is_empty() || password.is_empty() {
            return Err(ValidationError);
        }
        Ok(Self {
            ssid: ssid.to_string(),
            password: password.to_string(),
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl TryFrom<&ConnectPayload> for ConnectionRequest {
    type Error = ValidationError;

    fn try_from(payload: &ConnectPayload) -> Result<Self, Self::Error> {
        match (payload.ssid.as_deref(), payload.password.as_deref()) {
            (Some(ssid), Some(password)) => ConnectionRequest::new(ssid, password),
            _ => Err(ValidationError),
        }
    }
}

// 密码不能出现在日志里
impl std::fmt::Debug for ConnectionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRequest")
            .field("ssid", &self.ssid)
            .field("password", &"********")
            .finish()
    }
}

/// 一次连接尝试的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Success,
    Failure { reason: String },
}
