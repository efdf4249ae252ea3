mod runner;

use anyhow::Result;
use portal_core::config::PortalConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 初始化日志（这是入口点的职责），未设置 RUST_LOG 时默认 info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. 读取配置并启动服务
    let result = match PortalConfig::from_env() {
        Ok(config) => runner::run_portal(config).await,
        Err(e) => Err(e.into()),
    };

    // 3. 处理顶层错误
    if let Err(e) = result {
        tracing::error!("❌ Portal failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
