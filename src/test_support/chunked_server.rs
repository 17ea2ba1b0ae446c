//! One-shot HTTP server that answers with a chunked body and no Content-Length.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::socket_guard::should_skip_socket_bound_test;

/// Serves `body` once with `Transfer-Encoding: chunked` and returns its URL,
/// or `None` when localhost sockets are unavailable.
pub async fn serve_chunked_once(body: &'static [u8]) -> Option<String> {
    if should_skip_socket_bound_test() {
        return None;
    }
    let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
    let addr = listener.local_addr().ok()?;

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let mut response = b"HTTP/1.1 200 OK\r\n\
            Content-Type: application/octet-stream\r\n\
            Transfer-Encoding: chunked\r\n\
            Connection: close\r\n\r\n"
            .to_vec();
        response.extend_from_slice(format!("{:x}\r\n", body.len()).as_bytes());
        response.extend_from_slice(body);
        response.extend_from_slice(b"\r\n0\r\n\r\n");
        let _ = socket.write_all(&response).await;
        let _ = socket.shutdown().await;
    });

    Some(format!("http://{addr}/uc?id=chunked"))
}
