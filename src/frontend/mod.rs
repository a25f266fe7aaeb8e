pub mod http;

pub async fn start_all() -> anyhow::Result<()> {
    http::listener::run_http_server().await
}
