//! Snapshot server
//!
//! Serves the desired image as records and, optionally, an in-memory canvas
//! that accepts painted records.
//!
//! | Route                  | Reply                                        |
//! |------------------------|----------------------------------------------|
//! | `GET /data`            | JSON array of desired records                |
//! | `GET /put?pixel=<rec>` | `ok`, or `error` with 400 / 404              |
//! | `GET /canvas`          | JSON array of the live canvas, 404 if absent |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use crate::canvas::{Canvas, HalfBlockFolder};
use crate::config::Config;
use crate::errors::{PlaceError, Result};

/// Request head limit
const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Time a client gets to send its whole request head
const HEAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimal HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn json(records: &[String]) -> Self {
        match serde_json::to_string(records) {
            Ok(body) => Self {
                status: 200,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                error!("Failed to encode snapshot: {}", e);
                Self::text(500, "error")
            }
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            431 => "Request Header Fields Too Large",
            _ => "Internal Server Error",
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}

/// Shared server state
pub struct CanvasServer {
    desired: Arc<Vec<String>>,
    canvas: Option<Arc<Mutex<Canvas>>>,
    render_board: bool,
}

impl CanvasServer {
    pub fn new(desired: Vec<String>, canvas: Option<Canvas>, render_board: bool) -> Self {
        Self {
            desired: Arc::new(desired),
            canvas: canvas.map(|c| Arc::new(Mutex::new(c))),
            render_board,
        }
    }

    /// Load the configured image and size the virtual canvas to hold it
    pub fn from_config(config: &Config) -> Result<Self> {
        let server = &config.server;
        let image = server
            .image
            .as_deref()
            .ok_or_else(|| PlaceError::config("server.image is not set"))?;

        let rendered = HalfBlockFolder::new(config.palette()?).open(image)?;
        let desired = rendered.records(server.x_offset, server.y_offset)?;

        let canvas = if server.virtual_canvas {
            Some(Canvas::new(
                u32::from(rendered.width) + u32::from(server.x_offset),
                u32::from(rendered.rows) + u32::from(server.y_offset),
            )?)
        } else {
            None
        };

        Ok(Self::new(desired, canvas, server.render_board))
    }

    /// Handle to the virtual canvas, if any
    pub fn canvas(&self) -> Option<Arc<Mutex<Canvas>>> {
        self.canvas.clone()
    }

    /// Route one request
    pub async fn handle(&self, method: &str, target: &str) -> Response {
        if method != "GET" {
            return Response::text(405, "error");
        }

        let url = match Url::parse("http://localhost/").and_then(|base| base.join(target)) {
            Ok(url) => url,
            Err(e) => {
                warn!("Bad request target {:?}: {}", target, e);
                return Response::text(400, "error");
            }
        };

        match url.path() {
            "/data" => Response::json(&self.desired),
            "/put" => {
                let pixel = url
                    .query_pairs()
                    .find(|(key, _)| key == "pixel")
                    .map(|(_, value)| value.into_owned());
                self.put(pixel).await
            }
            "/canvas" => self.snapshot().await,
            _ => Response::text(404, "error"),
        }
    }

    async fn put(&self, pixel: Option<String>) -> Response {
        let Some(canvas) = &self.canvas else {
            return Response::text(404, "error");
        };
        let Some(pixel) = pixel else {
            return Response::text(400, "error");
        };

        let mut canvas = canvas.lock().await;
        match canvas.apply(&pixel) {
            Ok(()) => {
                debug!("Applied pixel {:?}", pixel);
                if self.render_board {
                    debug!("Board:\n{}", canvas.render());
                }
                Response::text(200, "ok")
            }
            Err(e) => {
                warn!("Rejected pixel {:?}: {}", pixel, e);
                Response::text(if e.is_protocol_error() { 400 } else { 500 }, "error")
            }
        }
    }

    async fn snapshot(&self) -> Response {
        let Some(canvas) = &self.canvas else {
            return Response::text(404, "error");
        };
        match canvas.lock().await.snapshot() {
            Ok(records) => Response::json(&records),
            Err(e) => {
                error!("Canvas snapshot failed: {}", e);
                Response::text(500, "error")
            }
        }
    }

    /// Bind `addr` and serve until the task is dropped
    pub async fn run(self: Arc<Self>, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        info!("Canvas server listening on {}", listener.local_addr()?);
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = server.connection(stream, peer).await {
                    debug!("Connection from {} ended with error: {}", peer, e);
                }
            });
        }
    }

    #[instrument(level = "debug", skip(self, stream))]
    async fn connection(&self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        // One byte past the limit is enough to tell an oversized head apart
        let mut reader = BufReader::new(reader.take(MAX_HEAD_BYTES as u64 + 1));

        let Ok(head) = timeout(HEAD_TIMEOUT, read_head(&mut reader)).await else {
            debug!("No request head within {:?}, closing", HEAD_TIMEOUT);
            return Ok(());
        };

        let response = match head? {
            None => {
                warn!("Request head over {} bytes", MAX_HEAD_BYTES);
                Response::text(431, "error")
            }
            Some(request_line) => {
                let mut parts = request_line.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(method), Some(target)) => {
                        debug!("{} {}", method, target);
                        self.handle(method, target).await
                    }
                    _ => Response::text(400, "error"),
                }
            }
        };

        writer.write_all(&response.to_bytes()).await?;
        writer.shutdown().await?;
        Ok(())
    }
}

/// Read a request head and return its request line, or `None` once the head
/// grows past `MAX_HEAD_BYTES`
async fn read_head<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut head_bytes = reader.read_until(b'\n', &mut line).await?;
    let request_line = String::from_utf8_lossy(&line).into_owned();

    loop {
        if head_bytes > MAX_HEAD_BYTES {
            return Ok(None);
        }
        line.clear();
        let n = reader.read_until(b'\n', &mut line).await?;
        head_bytes += n;
        if n == 0 || line == b"\r\n" || line == b"\n" {
            break;
        }
    }

    Ok((head_bytes <= MAX_HEAD_BYTES).then_some(request_line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Cell, WHITE};

    fn server() -> CanvasServer {
        let canvas = Canvas::new(4, 4).unwrap();
        CanvasServer::new(vec!["2AB 3 7 ▀".to_string()], Some(canvas), true)
    }

    async fn listen(server: CanvasServer) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(Arc::new(server).serve(listener));
        addr
    }

    async fn exchange(addr: SocketAddr, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        let mut response = String::new();
        timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
            .await
            .expect("Server did not answer")
            .unwrap();
        response
    }

    #[tokio::test]
    async fn test_data_route() {
        let response = server().handle("GET", "/data").await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"["2AB 3 7 ▀"]"#);
    }

    #[tokio::test]
    async fn test_put_route_decodes_query() {
        let server = server();
        let response = server.handle("GET", "/put?pixel=2AB+3+7+%E2%96%80").await;
        assert_eq!(response, Response::text(200, "ok"));

        let canvas = server.canvas().unwrap();
        let canvas = canvas.lock().await;
        assert_eq!(canvas.get(2, 1), Some(&Cell::half_block(2, 1, 3, 7)));
    }

    #[tokio::test]
    async fn test_put_route_rejections() {
        let server = server();
        assert_eq!(server.handle("GET", "/put").await.status, 400);
        assert_eq!(server.handle("GET", "/put?pixel=garbage").await.status, 400);
        assert_eq!(server.handle("GET", "/put?pixel=4AA+1+1+x").await.status, 400);
        assert_eq!(server.handle("POST", "/put?pixel=0AA+1+1+x").await.status, 405);
        assert_eq!(server.handle("GET", "/nope").await.status, 404);

        let canvas = server.canvas().unwrap();
        assert!(canvas
            .lock()
            .await
            .cells()
            .iter()
            .all(|c| c.bg() == WHITE && c.fg() == WHITE));
    }

    #[tokio::test]
    async fn test_without_virtual_canvas() {
        let server = CanvasServer::new(vec![], None, false);
        assert_eq!(server.handle("GET", "/put?pixel=0AA+1+1+x").await.status, 404);
        assert_eq!(server.handle("GET", "/canvas").await.status, 404);
        assert_eq!(server.handle("GET", "/data").await.body, "[]");
    }

    #[tokio::test]
    async fn test_request_over_the_wire() {
        let addr = listen(server()).await;
        let response = exchange(addr, b"GET /data HTTP/1.1\r\nHost: canvas\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with(r#"["2AB 3 7 ▀"]"#));
    }

    #[tokio::test]
    async fn test_unterminated_request_line_is_cut_off() {
        let addr = listen(server()).await;
        // A request line with no newline, one byte past the limit
        let request = vec![b'A'; MAX_HEAD_BYTES + 1];
        let response = exchange(addr, &request).await;
        assert!(response.starts_with("HTTP/1.1 431 Request Header Fields Too Large\r\n"));
    }

    #[tokio::test]
    async fn test_long_header_block_is_cut_off() {
        let addr = listen(server()).await;
        let mut request = b"GET /data HTTP/1.1\r\n".to_vec();
        while request.len() <= MAX_HEAD_BYTES {
            request.extend_from_slice(b"X-Filler: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
        }
        request.truncate(MAX_HEAD_BYTES + 1);
        let response = exchange(addr, &request).await;
        assert!(response.starts_with("HTTP/1.1 431 "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_client_is_dropped() {
        let addr = listen(server()).await;
        let started = tokio::time::Instant::now();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.is_empty());
        assert!(started.elapsed() >= HEAD_TIMEOUT);
    }
}
