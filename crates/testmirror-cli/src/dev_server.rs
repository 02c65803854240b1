//! Static HTTP server for generated test reports

use crate::error::{CliError, CliResult};
use axum::http::{header, HeaderValue};
use axum::Router;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

/// Report server configuration
#[derive(Debug, Clone)]
pub struct ReportServerConfig {
    /// Directory to serve
    pub directory: PathBuf,
    /// Listen address
    pub host: IpAddr,
    /// HTTP port (0 picks a free port)
    pub port: u16,
    /// Enable CORS
    pub cors: bool,
}

impl Default for ReportServerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: crate::commands::DEFAULT_PORT,
            cors: false,
        }
    }
}

impl ReportServerConfig {
    /// Create a builder
    #[must_use]
    pub fn builder() -> ReportServerConfigBuilder {
        ReportServerConfigBuilder::default()
    }
}

/// Builder for `ReportServerConfig`
#[derive(Debug, Clone, Default)]
pub struct ReportServerConfigBuilder {
    config: ReportServerConfig,
}

impl ReportServerConfigBuilder {
    /// Set directory to serve
    #[must_use]
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.directory = dir.into();
        self
    }

    /// Set listen address
    #[must_use]
    pub const fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    /// Set HTTP port
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable CORS
    #[must_use]
    pub const fn cors(mut self, enabled: bool) -> Self {
        self.config.cors = enabled;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> ReportServerConfig {
        self.config
    }
}

/// Serves a reports directory until shut down
#[derive(Debug)]
pub struct ReportServer {
    config: ReportServerConfig,
}

impl ReportServer {
    /// Create a new report server
    #[must_use]
    pub const fn new(config: ReportServerConfig) -> Self {
        Self { config }
    }

    /// Local URL for the configured port
    #[must_use]
    pub fn http_url(&self) -> String {
        format_server_url(self.config.port)
    }

    /// Router serving the directory; `index.html` answers directory requests.
    ///
    /// Responses are marked `no-store` since reports are regenerated in place.
    #[must_use]
    pub fn router(&self) -> Router {
        let files = ServeDir::new(&self.config.directory).append_index_html_on_directories(true);
        let app = Router::new()
            .fallback_service(files)
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ));

        if self.config.cors {
            app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            app
        }
    }

    /// Bind the listener, checking the directory first.
    pub async fn bind(&self) -> CliResult<TcpListener> {
        if !self.config.directory.is_dir() {
            return Err(CliError::server(format!(
                "reports directory '{}' does not exist",
                self.config.directory.display()
            )));
        }
        let addr = SocketAddr::new(self.config.host, self.config.port);
        TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::server(format!("cannot listen on {addr}: {e}")))
    }

    /// Serve on `listener` until `shutdown` completes.
    pub async fn serve<S>(&self, listener: TcpListener, shutdown: S) -> CliResult<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|e| CliError::server(e.to_string()))?;
        info!(
            addr = %local,
            dir = %self.config.directory.display(),
            "serving reports"
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| CliError::server(e.to_string()))
    }

    /// Serve until Ctrl+C, optionally opening a browser once bound.
    pub async fn run(&self, open: bool) -> CliResult<()> {
        let listener = self.bind().await?;
        if open {
            open_browser(&self.http_url());
        }
        self.serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down report server");
        })
        .await
    }
}

/// Build a runtime and serve until Ctrl+C.
pub fn serve_blocking(config: ReportServerConfig, open: bool) -> CliResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::server(format!("cannot start runtime: {e}")))?;
    runtime.block_on(ReportServer::new(config).run(open))
}

/// Open a URL in the platform browser; failures are ignored.
pub fn open_browser(url: &str) {
    info!(%url, "opening browser");
    #[cfg(target_os = "macos")]
    let _ = std::process::Command::new("open").arg(url).spawn();
    #[cfg(target_os = "linux")]
    let _ = std::process::Command::new("xdg-open").arg(url).spawn();
    #[cfg(target_os = "windows")]
    let _ = std::process::Command::new("cmd")
        .args(["/C", "start", url])
        .spawn();
}

/// Format a server URL from port
#[must_use]
pub fn format_server_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn reports() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.html"), "<h1>reports</h1>").unwrap();
        std::fs::create_dir(temp.path().join("allure-report")).unwrap();
        std::fs::write(
            temp.path().join("allure-report/index.html"),
            "<h1>allure</h1>",
        )
        .unwrap();
        temp
    }

    #[test]
    fn test_config_default() {
        let config = ReportServerConfig::default();
        assert_eq!(config.port, 8000);
        assert!(!config.cors);
        assert_eq!(config.directory, PathBuf::from("."));
    }

    #[test]
    fn test_config_builder() {
        let config = ReportServerConfig::builder()
            .directory("_tests/_reports")
            .port(9000)
            .cors(true)
            .build();
        assert_eq!(config.port, 9000);
        assert!(config.cors);
        assert_eq!(ReportServer::new(config).http_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_serves_index_on_root() {
        let temp = reports();
        let server = ReportServer::new(ReportServerConfig::builder().directory(temp.path()).build());

        let response = server
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"<h1>reports</h1>");
    }

    #[tokio::test]
    async fn test_serves_nested_report() {
        let temp = reports();
        let server = ReportServer::new(ReportServerConfig::builder().directory(temp.path()).build());

        let response = server
            .router()
            .oneshot(
                Request::get("/allure-report/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let temp = reports();
        let server = ReportServer::new(ReportServerConfig::builder().directory(temp.path()).build());

        let response = server
            .router()
            .oneshot(Request::get("/nope.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bind_rejects_missing_directory() {
        let temp = TempDir::new().unwrap();
        let server = ReportServer::new(
            ReportServerConfig::builder()
                .directory(temp.path().join("absent"))
                .port(0)
                .build(),
        );
        assert!(matches!(server.bind().await, Err(CliError::Server { .. })));
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let temp = reports();
        let server = ReportServer::new(
            ReportServerConfig::builder()
                .directory(temp.path())
                .host(IpAddr::V4(Ipv4Addr::LOCALHOST))
                .port(0)
                .build(),
        );
        let listener = server.bind().await.unwrap();
        server.serve(listener, async {}).await.unwrap();
    }
}
