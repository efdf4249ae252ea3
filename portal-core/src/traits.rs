use crate::AdapterError;
use async_trait::async_trait;
use std::borrow::Cow;

// 在这里定义所有后端和前端共享的 trait。

/// 主机无线工具的适配接口。
///
/// 每个方法恰好对应一次外部进程调用，不做任何重试；
/// 重试与否由上层编排逻辑决定（目前不重试）。
#[async_trait]
pub trait NetworkTool: Send + Sync {
    /// 请求主机刷新附近网络列表，有限时等待。
    async fn trigger_rescan(&self) -> Result<(), AdapterError>;

    /// 获取网络列表的原始文本输出（每行 `SSID:SIGNAL`），不会额外触发扫描。
    async fn list_networks(&self) -> Result<String, AdapterError>;

    /// 加入指定网络，有限时等待。
    async fn join_network(&self, ssid: &str, password: &str) -> Result<(), AdapterError>;
}

/// 前端资源提供者接口。
#[async_trait]
pub trait UiAssetProvider: Send + Sync {
    /// Retrieves a single UI asset.
    ///
    /// # Arguments
    /// * `path` - The path to the asset (e.g., "index.html", "main.js").
    ///
    /// # Returns
    /// A `Result` containing a tuple of (`Cow<'static, [u8]>`, `String`)
    /// representing the asset's content and its MIME type, or an `Error` if not found.
    async fn get_asset(&self, path: &str) -> crate::Result<(Cow<'static, [u8]>, String)>;
}
