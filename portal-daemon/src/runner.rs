use portal_core::{
    config::PortalConfig,
    traits::NetworkTool,
    web_server::{self, Portal},
};
use std::sync::Arc;

/// 根据编译时选择的后端特性创建网络工具
#[cfg(not(feature = "backend_mock"))]
fn create_tool(config: &PortalConfig) -> Arc<dyn NetworkTool> {
    use portal_core::backends::nmcli::NmcliTool;
    tracing::info!(
        sudo = config.nmcli.use_sudo,
        interface = ?config.nmcli.interface,
        "📡 Backend: nmcli"
    );
    Arc::new(NmcliTool::new(config.nmcli.clone()))
}

#[cfg(feature = "backend_mock")]
fn create_tool(_config: &PortalConfig) -> Arc<dyn NetworkTool> {
    use portal_core::backends::mock::MockTool;
    tracing::info!("🤖 Backend: mock (canned scan results, no host changes)");
    Arc::new(MockTool::with_demo_networks())
}

/// 构建服务对象并运行 Web 服务器，直到收到退出信号
pub async fn run_portal(config: PortalConfig) -> anyhow::Result<()> {
    tracing::info!(ui_path = %config.ui_path.display(), "🚀 Starting portal");
    if !config.ui_path.join(&config.index_file).is_file() {
        tracing::warn!(
            "UI index {} not found under {}; static requests will return 404",
            config.index_file,
            config.ui_path.display()
        );
    }

    let tool = create_tool(&config);
    let portal = Arc::new(Portal::new(&config, tool));
    web_server::run_server(portal, config.bind_addr, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
