use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// 指向可选 TOML 配置文件的环境变量
pub const CONFIG_PATH_ENV: &str = "PORTAL_CONFIG";
/// UI 根目录（安装脚本通常设为 `/opt/beatnik-portal/ui`）
pub const UI_PATH_ENV: &str = "PORTAL_UI_PATH";
pub const BIND_ADDR_ENV: &str = "PORTAL_BIND_ADDR";

const DEFAULT_UI_PATH: &str = "dist/portal-ui";
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 5001);

/// 顶层应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// 前端静态文件所在目录
    pub ui_path: PathBuf,
    /// 找不到文件时回退的入口文档
    pub index_file: String,
    pub bind_addr: SocketAddr,
    /// 是否让并发的连接请求排队执行
    pub serialize_connects: bool,
    pub nmcli: NmcliConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            ui_path: PathBuf::from(DEFAULT_UI_PATH),
            index_file: "index.html".to_string(),
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            serialize_connects: true,
            nmcli: NmcliConfig::default(),
        }
    }
}

/// nmcli 调用方式
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NmcliConfig {
    pub program: String,
    /// 通过 sudo 提权执行 nmcli
    pub use_sudo: bool,
    pub sudo_program: String,
    /// 固定使用的无线网卡，None 时交给 NetworkManager 选择
    pub interface: Option<String>,
    pub rescan_timeout_secs: u64,
    pub list_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NmcliConfig {
    fn default() -> Self {
        Self {
            program: "nmcli".to_string(),
            use_sudo: true,
            sudo_program: "sudo".to_string(),
            interface: None,
            rescan_timeout_secs: 5,
            list_timeout_secs: 10,
            connect_timeout_secs: 20,
        }
    }
}

impl NmcliConfig {
    pub fn rescan_timeout(&self) -> Duration {
        Duration::from_secs(self.rescan_timeout_secs)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl PortalConfig {
    /// 从进程环境加载配置：先读 `PORTAL_CONFIG` 指向的 TOML 文件（可选），
    /// 再应用 `PORTAL_UI_PATH` / `PORTAL_BIND_ADDR` 覆盖。
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("cannot read config file {}: {}", path, e))
                })?;
                tracing::info!(path = %path, "Loaded config file");
                Self::from_toml_str(&content)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 字符串加载配置，缺失的字段使用默认值
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(format!("failed to parse TOML: {}", e)))
    }

    /// 用环境变量覆盖配置项。`lookup` 抽象出来便于测试。
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(UI_PATH_ENV).filter(|p| !p.is_empty()) {
            self.ui_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup(BIND_ADDR_ENV).filter(|a| !a.is_empty()) {
            self.bind_addr = addr
                .parse()
                .map_err(|_| Error::Config(format!("invalid {}: {}", BIND_ADDR_ENV, addr)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_file.is_empty() {
            return Err(Error::Config("index_file must not be empty".into()));
        }
        if self.nmcli.program.is_empty() {
            return Err(Error::Config("nmcli.program must not be empty".into()));
        }
        if self.nmcli.use_sudo && self.nmcli.sudo_program.is_empty() {
            return Err(Error::Config(
                "nmcli.sudo_program must not be empty when use_sudo is set".into(),
            ));
        }
        let n = &self.nmcli;
        if n.rescan_timeout_secs == 0 || n.list_timeout_secs == 0 || n.connect_timeout_secs == 0 {
            return Err(Error::Config("nmcli timeouts must be at least 1 second".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_deployment_layout() {
        let config = PortalConfig::default();
        assert_eq!(config.ui_path, PathBuf::from("dist/portal-ui"));
        assert_eq!(config.bind_addr, "0.0.0.0:5001".parse::<SocketAddr>().unwrap());
        assert!(config.nmcli.use_sudo);
        assert_eq!(config.nmcli.rescan_timeout(), Duration::from_secs(5));
        assert_eq!(config.nmcli.connect_timeout(), Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PortalConfig::from_toml_str(
            r#"
            serialize_connects = false

            [nmcli]
            use_sudo = false
            interface = "wlan1"
            "#,
        )
        .unwrap();
        assert!(!config.serialize_connects);
        assert!(!config.nmcli.use_sudo);
        assert_eq!(config.nmcli.interface.as_deref(), Some("wlan1"));
        assert_eq!(config.nmcli.program, "nmcli");
        assert_eq!(config.index_file, "index.html");
    }

    #[test]
    fn example_config_parses() {
        const EXAMPLE: &str = include_str!("../../configs/portal.example.toml");
        let config = PortalConfig::from_toml_str(EXAMPLE).unwrap();
        assert_eq!(config.ui_path, PathBuf::from("/opt/beatnik-portal/ui"));
        assert!(config.nmcli.interface.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = PortalConfig::from_toml_str("ui_path = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            (UI_PATH_ENV, "/opt/beatnik-portal/ui"),
            (BIND_ADDR_ENV, "127.0.0.1:8080"),
        ]
        .into_iter()
        .collect();

        let mut config = PortalConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.ui_path, PathBuf::from("/opt/beatnik-portal/ui"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn empty_ui_path_override_is_ignored() {
        let mut config = PortalConfig::default();
        config
            .apply_overrides(|k| (k == UI_PATH_ENV).then(String::new))
            .unwrap();
        assert_eq!(config.ui_path, PathBuf::from("dist/portal-ui"));
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let mut config = PortalConfig::default();
        let err = config
            .apply_overrides(|k| (k == BIND_ADDR_ENV).then(|| "not-an-addr".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = PortalConfig::default();
        config.nmcli.connect_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
