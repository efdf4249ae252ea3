use crate::config::PortalConfig;
use crate::connect::ConnectOrchestrator;
use crate::frontends::DiskFrontend;
use crate::scan::ScanOrchestrator;
use crate::structs::{ConnectPayload, ConnectionOutcome};
use crate::traits::{NetworkTool, UiAssetProvider};
use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::borrow::Cow;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

// The shared state for our web server.
pub type PortalState = State<Arc<Portal>>;

/// 服务对象：启动时构建一次，持有编排器和 UI 资源提供者，
/// 每个 HTTP 端点都对应一个方法。
pub struct Portal {
    scanner: ScanOrchestrator,
    connector: ConnectOrchestrator,
    frontend: Arc<dyn UiAssetProvider>,
    index_file: String,
}

impl Portal {
    /// 按配置构建：UI 从 `config.ui_path` 目录读取。
    pub fn new(config: &PortalConfig, tool: Arc<dyn NetworkTool>) -> Self {
        let frontend = Arc::new(DiskFrontend::new(config.ui_path.clone()));
        Self::with_frontend(
            tool,
            frontend,
            config.index_file.clone(),
            config.serialize_connects,
        )
    }

    pub fn with_frontend(
        tool: Arc<dyn NetworkTool>,
        frontend: Arc<dyn UiAssetProvider>,
        index_file: String,
        serialize_connects: bool,
    ) -> Self {
        Self {
            scanner: ScanOrchestrator::new(tool.clone()),
            connector: ConnectOrchestrator::new(tool, serialize_connects),
            frontend,
            index_file,
        }
    }

    /// GET /api/scan
    pub async fn api_scan(&self) -> Response {
        match self.scanner.scan().await {
            Ok(networks) => (StatusCode::OK, Json(networks)).into_response(),
            Err(e) => {
                tracing::error!(kind = ?e.kind, cause = %e.cause, "Scan failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.kind.public_message())
            }
        }
    }

    /// POST /api/connect
    ///
    /// `payload` 为 None 表示请求体不是合法的 JSON，按缺少字段处理。
    pub async fn api_connect(&self, payload: Option<ConnectPayload>) -> Response {
        let payload = payload.unwrap_or_default();
        match self.connector.connect(&payload).await {
            Ok(ConnectionOutcome::Success) => (
                StatusCode::OK,
                Json(serde_json::json!({ "status": "success" })),
            )
                .into_response(),
            Ok(ConnectionOutcome::Failure { reason }) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, &reason)
            }
            Err(e) => {
                tracing::debug!("Rejected connect request: {}", e);
                error_response(StatusCode::BAD_REQUEST, &e.to_string())
            }
        }
    }

    /// 静态资源：存在的文件直接返回，其余一律回退到入口文档，
    /// 以支持前端路由。
    pub async fn serve_asset(&self, path: &str) -> Response {
        let path = path.trim_start_matches('/');

        if !path.is_empty() {
            if let Ok((data, mime)) = self.frontend.get_asset(path).await {
                return asset_response(data, mime);
            }
            tracing::debug!(path = %path, "Asset not found, falling back to index");
        }

        match self.frontend.get_asset(&self.index_file).await {
            Ok((data, mime)) => asset_response(data, mime),
            Err(e) => {
                tracing::warn!("Failed to get index document: {}", e);
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn asset_response(data: Cow<'static, [u8]>, mime: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime)
        .body(Body::from(data))
        .unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
        })
}

/// 构建路由：两个 API 端点，其余 GET 请求交给静态资源处理。
pub fn router(portal: Arc<Portal>) -> Router {
    Router::new()
        .route("/api/scan", get(api_scan_wifi))
        .route("/api/connect", post(api_connect_wifi))
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static_asset))
        .layer(TraceLayer::new_for_http())
        .with_state(portal)
}

/// Starts the Axum web server and runs until `shutdown` resolves.
pub async fn run_server<F>(portal: Arc<Portal>, addr: SocketAddr, shutdown: F) -> crate::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(portal);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 Web server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("🛑 Web server stopped");
    Ok(())
}

// --- Route Handlers ---

async fn api_scan_wifi(State(portal): PortalState) -> Response {
    tracing::debug!("Handling /api/scan");
    portal.api_scan().await
}

async fn api_connect_wifi(
    State(portal): PortalState,
    payload: Result<Json<ConnectPayload>, JsonRejection>,
) -> Response {
    tracing::debug!("Handling /api/connect");
    let payload = match payload {
        Ok(Json(payload)) => Some(payload),
        Err(rejection) => {
            tracing::debug!("Invalid connect body: {}", rejection);
            None
        }
    };
    portal.api_connect(payload).await
}

/// Serves the main `index.html` file.
async fn serve_index(State(portal): PortalState) -> Response {
    portal.serve_asset("").await
}

/// `Path` 提取器已经完成百分号解码，例如 `my%20font.woff2` -> `my font.woff2`。
async fn serve_static_asset(
    State(portal): PortalState,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    match path {
        Ok(Path(path)) => portal.serve_asset(&path).await,
        Err(rejection) => {
            tracing::debug!("Undecodable asset path: {}", rejection);
            portal.serve_asset("").await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::MockTool;
    use crate::connect::CONNECT_FAILURE_REASON;
    use crate::FailureCause;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct Fixture {
        app: Router,
        tool: Arc<MockTool>,
        ui: tempfile::TempDir,
    }

    fn fixture(tool: MockTool) -> Fixture {
        let ui = tempfile::tempdir().unwrap();
        std::fs::write(ui.path().join("index.html"), "<html>portal</html>").unwrap();
        std::fs::write(ui.path().join("styles.css"), "body {}").unwrap();

        let tool = Arc::new(tool);
        let config = PortalConfig {
            ui_path: ui.path().to_path_buf(),
            ..PortalConfig::default()
        };
        let portal = Arc::new(Portal::new(&config, tool.clone()));
        Fixture {
            app: router(portal),
            tool,
            ui,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn connect_req(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/connect")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn scan_returns_deduplicated_networks() {
        let f = fixture(MockTool::new().with_list_output("HomeNet:80\nHomeNet:60\nGuest:40\n"));

        let (status, body) = send(f.app, get_req("/api/scan")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json(&body),
            serde_json::json!([
                { "ssid": "HomeNet", "signal": "80" },
                { "ssid": "Guest", "signal": "40" }
            ])
        );
    }

    #[tokio::test]
    async fn scan_failure_is_500_without_host_detail() {
        let f = fixture(MockTool::new().failing_rescan(FailureCause::Exit {
            code: Some(1),
            stderr: "Error: NetworkManager is not running.".into(),
        }));

        let (status, body) = send(f.app, get_req("/api/scan")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = json(&body)["error"].as_str().unwrap().to_string();
        assert!(!error.contains("NetworkManager"));
        assert_eq!(f.tool.list_calls(), 0);
    }

    #[tokio::test]
    async fn connect_success() {
        let f = fixture(MockTool::new());

        let (status, body) =
            send(f.app, connect_req(r#"{"ssid":"HomeNet","password":"secret"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!({ "status": "success" }));
        assert_eq!(f.tool.join_calls(), 1);
    }

    #[tokio::test]
    async fn connect_missing_password_is_400() {
        let f = fixture(MockTool::new());

        let (status, body) = send(f.app, connect_req(r#"{"ssid":"Net"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json(&body),
            serde_json::json!({ "error": "Missing SSID or password" })
        );
        assert_eq!(f.tool.join_calls(), 0);
    }

    #[tokio::test]
    async fn connect_invalid_json_is_400() {
        let f = fixture(MockTool::new());

        let (status, _) = send(f.app, connect_req("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(f.tool.join_calls(), 0);
    }

    #[tokio::test]
    async fn connect_failure_is_generic_500() {
        let f = fixture(MockTool::new().failing_join(FailureCause::Exit {
            code: Some(4),
            stderr: "Error: 802.1X supplicant took too long to authenticate.".into(),
        }));

        let (status, body) =
            send(f.app, connect_req(r#"{"ssid":"HomeNet","password":"wrong"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body), serde_json::json!({ "error": CONNECT_FAILURE_REASON }));
    }

    #[tokio::test]
    async fn existing_asset_is_served() {
        let f = fixture(MockTool::new());

        let (status, body) = send(f.app, get_req("/styles.css")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"body {}");
    }

    #[tokio::test]
    async fn percent_encoded_asset_names_are_decoded() {
        let f = fixture(MockTool::new());
        std::fs::write(f.ui.path().join("my font.woff2"), b"wOF2").unwrap();
        std::fs::write(f.ui.path().join("café.txt"), "menu").unwrap();

        let response = f
            .app
            .clone()
            .oneshot(get_req("/my%20font.woff2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_ne!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"wOF2");

        let (status, body) = send(f.app, get_req("/caf%C3%A9.txt")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"menu");
    }

    #[tokio::test]
    async fn unknown_paths_fall_back_to_index() {
        for uri in [
            "/",
            "/settings/wifi",
            "/missing.js",
            "/../etc/passwd",
            "/%2e%2e/etc/passwd",
            "/%FF",
        ] {
            let f = fixture(MockTool::new());
            let (status, body) = send(f.app, get_req(uri)).await;
            assert_eq!(status, StatusCode::OK, "uri {}", uri);
            assert_eq!(body, b"<html>portal</html>", "uri {}", uri);
        }
    }

    #[tokio::test]
    async fn missing_index_is_404() {
        let tool: Arc<dyn NetworkTool> = Arc::new(MockTool::new());
        let empty = tempfile::tempdir().unwrap();
        let portal = Portal::with_frontend(
            tool,
            Arc::new(DiskFrontend::new(empty.path())),
            "index.html".into(),
            true,
        );

        let (status, _) = send(router(Arc::new(portal)), get_req("/anything")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
