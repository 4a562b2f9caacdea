use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};

use crate::logging::Logger;

pub mod element;
pub mod user_agent;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// 預設的請求逾時
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-request knobs. The client itself carries no overall timeout so that
/// long polling and short upstream fetches can share it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Upper bound for the whole request, body included.
    pub timeout: Duration,
    /// Extra attempts after a transport failure. `0` means exactly one call.
    pub retries: usize,
}

impl RequestOptions {
    pub fn new(timeout: Duration, retries: usize) -> Self {
        RequestOptions { timeout, retries }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions::new(DEFAULT_TIMEOUT, 0)
    }
}

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
///
/// # Returns
///
/// * Result<&'static Client>: A reference to the reqwest client instance,
///   or an error if the client cannot be created.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        // reqwest 編譯時未指定 crypto provider，這裡安裝 ring；已安裝過則忽略
        let _ = rustls::crypto::ring::default_provider().install_default();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== 連接池 =====
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .referer(true)
            .user_agent(user_agent::gen_random_ua())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and returns the raw response, whatever its status.
pub async fn get_response(
    url: &str,
    headers: Option<header::HeaderMap>,
    options: RequestOptions,
) -> Result<Response> {
    send(Method::GET, url, headers, None::<fn(_) -> _>, options).await
}

/// Performs an HTTP POST request with JSON request and response, and specified headers.
///
/// # Type Parameters
///
/// * `REQ`: The request type to serialize as JSON. It must implement `Serialize`.
/// * `RES`: The response type to deserialize from JSON. It must implement `DeserializeOwned`.
///
/// # Returns
///
/// * `Result<RES>`: The deserialized response, or an error if the request fails or the response cannot be deserialized.
pub async fn post_use_json<REQ, RES>(
    url: &str,
    headers: Option<header::HeaderMap>,
    req: Option<&REQ>,
    options: RequestOptions,
) -> Result<RES>
where
    REQ: Serialize,
    RES: DeserializeOwned,
{
    let res = send(
        Method::POST,
        url,
        headers,
        Some(|rb: RequestBuilder| {
            if let Some(r) = req {
                rb.json(r)
            } else {
                rb
            }
        }),
        options,
    )
    .await?;

    let res_body = res
        .text()
        .await
        .map_err(|e| anyhow!("Error reading response body: {}", e))?;

    serde_json::from_str(&res_body)
        .map_err(|e| anyhow!("Error parsing response JSON({}): {:?}", &res_body, e))
}

/// Sends an HTTP request, retrying transport failures up to `options.retries` times.
///
/// Retries back off exponentially (500 ms, 1 s, 2 s, ... capped at 5 s) with
/// jitter. A response with any status counts as a success here; callers
/// decide what a non-success status means to them.
///
/// # Errors
///
/// Returns the last `reqwest::Error` (wrapped in `anyhow`) once every attempt failed.
async fn send(
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
    options: RequestOptions,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let visit_log = &visit_log;
    let client = get_client()?;
    let mut rb = client.request(method, url).timeout(options.timeout);

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(options.retries);
    let mut attempt = 0;

    Retry::spawn(strategy, || {
        attempt += 1;
        let n = attempt;
        let rb = rb.try_clone();

        async move {
            let Some(rb) = rb else {
                return Err(anyhow!("Failed to clone RequestBuilder"));
            };

            let start = Instant::now();
            let res = rb.send().await;
            let elapsed = start.elapsed().as_millis();

            match res {
                Ok(response) => {
                    LOGGER.info(format!(
                        "Attempt {} to send {} {} {} ms",
                        n,
                        visit_log,
                        response.status(),
                        elapsed
                    ));
                    Ok(response)
                }
                Err(why) => {
                    LOGGER.error(format!(
                        "Attempt {} to send {} failed because {:?}. {} ms",
                        n, visit_log, why, elapsed
                    ));
                    Err(anyhow::Error::from(why))
                }
            }
        }
    })
    .await
}

/// Tiny HTTP servers on loopback for exercising the client without the internet.
#[cfg(test)]
pub(crate) mod stub {
    use std::sync::{Arc, Mutex};

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };

    /// Request bodies in the order they arrived.
    pub type Received = Arc<Mutex<Vec<String>>>;

    /// Answers every connection with the same canned response.
    pub async fn respond_with(status: u16, content_type: &'static str, body: &str) -> String {
        recording(status, content_type, body).await.0
    }

    /// Same as [`respond_with`], also keeping every request body.
    pub async fn recording(
        status: u16,
        content_type: &'static str,
        body: &str,
    ) -> (String, Received) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason(status),
            content_type,
            body.len(),
            body
        );
        let received = Received::default();
        let log = Arc::clone(&received);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request_body = read_body(&mut socket).await;
                log.lock().unwrap().push(request_body);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}/", addr), received)
    }

    /// Accepts connections and never answers, so every request times out.
    pub async fn never_respond() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        format!("http://{}/", addr)
    }

    /// Reads one request and returns its body, sized by `Content-Length`.
    async fn read_body(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return String::new();
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let start = end + 4;

            if buf.len() >= start + len {
                return String::from_utf8_lossy(&buf[start..start + len]).into_owned();
            }
        }
    }

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }
}
