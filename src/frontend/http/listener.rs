use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::shared::config::CONFIG;

use super::handler::handle_request;

pub async fn run_http_server() -> anyhow::Result<()> {
    let addr: SocketAddr = CONFIG.server.http_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("HTTP server running at http://{addr}/upload-parquet");

    let keep_alive = CONFIG.server.keep_alive;

    loop {
        let (stream, _peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept HTTP connection: {}", e);
                continue;
            }
        };
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            let mut builder = hyper::server::conn::http1::Builder::new();
            builder.keep_alive(keep_alive);

            if let Err(err) = builder
                .serve_connection(io, service_fn(handle_request))
                .await
            {
                let msg = err.to_string();
                if !msg.contains("connection closed") && !msg.contains("broken pipe") {
                    warn!("HTTP connection error: {}", msg);
                }
            }
        });
    }
}
