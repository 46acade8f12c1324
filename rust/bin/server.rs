//! HTTP Server for the kit compatibility widget
//! Simple HTTP server using tokio and basic HTTP handling

use kit_compat::api::{create_response, handle_request, ApiState};
use kit_compat::{init_tracing, Config, GeometryClient, GeometrySource, StaticTable};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    let source: Option<Arc<dyn GeometrySource>> = match GeometryClient::from_config(&config)? {
        Some(client) => {
            info!(
                endpoint = client.endpoint(),
                timeout = ?config.geometry_timeout,
                "geometry lookups enabled"
            );
            Some(Arc::new(client))
        }
        None => {
            info!("geometry lookups disabled, static table only");
            None
        }
    };
    let state = Arc::new(ApiState::new(source));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        bikes = StaticTable::reference().len(),
        "compatibility API listening"
    );

    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(%addr, "new connection");
        let state = Arc::clone(&state);
        tokio::spawn(async move { handle_connection(stream, state).await });
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<ApiState>) {
    // Read request with timeout to prevent hanging
    let mut buffer = Vec::new();
    let mut temp_buf = [0; 8192];

    let read_result = timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut temp_buf).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    buffer.extend_from_slice(&temp_buf[..n]);
                    // GET-only API: the request ends with the headers
                    if buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                    if buffer.len() > MAX_REQUEST_BYTES {
                        break;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    })
    .await;

    match read_result {
        Err(_) => {
            warn!("request read timeout");
            return;
        }
        Ok(Err(e)) => {
            warn!(error = %e, "failed to read from stream");
            return;
        }
        Ok(Ok(())) => {}
    }

    if buffer.is_empty() {
        return;
    }

    let response = match String::from_utf8(buffer) {
        Ok(request) => handle_request(&state, &request).await,
        Err(e) => {
            warn!(error = %e, "request is not valid UTF-8");
            create_response(400, "Bad Request", r#"{"error":"Bad request"}"#)
        }
    };

    if let Err(e) = stream.write_all(response.as_bytes()).await {
        warn!(error = %e, "failed to write response");
    }
}
