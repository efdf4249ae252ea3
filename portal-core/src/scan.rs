//! Scan Orchestrator：触发重新扫描、读取列表、按 SSID 去重。

use crate::backends::utils::split_terse_fields;
use crate::structs::WirelessNetwork;
use crate::traits::NetworkTool;
use crate::AdapterError;
use std::collections::HashSet;
use std::sync::Arc;

pub struct ScanOrchestrator {
    tool: Arc<dyn NetworkTool>,
}

impl ScanOrchestrator {
    pub fn new(tool: Arc<dyn NetworkTool>) -> Self {
        Self { tool }
    }

    /// 执行一次完整扫描。每次调用都从主机的实时状态重新生成结果，不做缓存。
    ///
    /// 任何一步失败都直接返回错误，不会返回部分结果。
    pub async fn scan(&self) -> Result<Vec<WirelessNetwork>, AdapterError> {
        // rescan 必须在读取列表之前完成
        self.tool.trigger_rescan().await?;
        let output = self.tool.list_networks().await?;
        let networks = parse_network_list(&output);
        tracing::info!(count = networks.len(), "Scan complete");
        Ok(networks)
    }
}

/// 解析 `SSID:SIGNAL` 格式的列表输出。
///
/// 字段少于 2 个的行和 SSID 为空的行被跳过；同名网络只保留第一次出现的条目。
/// 输出顺序与主机工具的顺序一致，不重新排序。
pub fn parse_network_list(output: &str) -> Vec<WirelessNetwork> {
    let mut networks = Vec::new();
    let mut seen = HashSet::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = split_terse_fields(line).into_iter();
        let (Some(ssid), Some(signal)) = (fields.next(), fields.next()) else {
            tracing::trace!(line = %line, "Skipping malformed scan line");
            continue;
        };
        if ssid.is_empty() || !seen.insert(ssid.clone()) {
            continue;
        }
        networks.push(WirelessNetwork { ssid, signal });
    }
    networks
}
