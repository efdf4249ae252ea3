//! Core library for the Wi-Fi onboarding portal.
//! This crate defines the core traits (interfaces) and data structures,
//! the `nmcli` adapter, the scan/connect orchestrators and the axum web server
//! that exposes them together with the bundled UI.

pub mod backends;
pub mod config;
pub mod connect;
pub mod frontends;
pub mod scan;
pub mod structs;
pub mod traits;
pub mod web_server;

// Define a shared Error and Result type for the entire crate.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

/// 外部工具调用失败的类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    RescanFailed,
    ListFailed,
    ConnectFailed,
}

impl AdapterErrorKind {
    /// 返回给客户端的通用描述，不包含任何主机诊断信息。
    pub fn public_message(&self) -> &'static str {
        match self {
            AdapterErrorKind::RescanFailed => "Wi-Fi rescan failed",
            AdapterErrorKind::ListFailed => "Failed to list Wi-Fi networks",
            AdapterErrorKind::ConnectFailed => "Failed to connect to Wi-Fi network",
        }
    }
}

impl fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.public_message())
    }
}

/// 子进程失败的具体原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// 无法启动子进程（例如程序不存在）
    Spawn(String),
    /// 子进程以非零状态退出
    Exit { code: Option<i32>, stderr: String },
    /// 超出等待时限，子进程已被终止
    TimedOut(Duration),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Spawn(msg) => write!(f, "could not spawn process: {}", msg),
            FailureCause::Exit { code: Some(code), stderr } => {
                write!(f, "exited with status {}: {}", code, stderr.trim())
            }
            FailureCause::Exit { code: None, stderr } => {
                write!(f, "terminated by signal: {}", stderr.trim())
            }
            FailureCause::TimedOut(limit) => write!(f, "timed out after {:?}", limit),
        }
    }
}

/// Network Tool Adapter 返回的错误。
#[derive(Debug, Clone, Error)]
#[error("{kind} ({cause})")]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub cause: FailureCause,
}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind, cause: FailureCause) -> Self {
        Self { kind, cause }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, FailureCause::TimedOut(_))
    }
}

/// 客户端输入错误，在调用任何外部工具之前产生。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing SSID or password")]
pub struct ValidationError;
