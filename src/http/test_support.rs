use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos.saturating_add(4))
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy)]
enum Reply {
    /// Waits, then writes the whole response at once.
    Delayed(Duration),
    /// Writes headers and half the body, waits, then writes the rest.
    SlowBody(Duration),
}

async fn serve_connection(mut stream: TcpStream, status: u16, reply: Reply) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => read,
        };
        buf.extend_from_slice(chunk.get(..read).unwrap_or_default());
        if let Some(end) = find_header_end(&buf) {
            let head = buf.get(..end).unwrap_or_default();
            if buf.len() >= end.saturating_add(content_length(head)) {
                break;
            }
        }
    }
    let written = match reply {
        Reply::Delayed(delay) => {
            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {} Test\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                status
            );
            stream.write_all(response.as_bytes()).await
        }
        Reply::SlowBody(body_delay) => {
            let head = format!(
                "HTTP/1.1 {} Test\r\nContent-Length: 4\r\nConnection: close\r\n\r\nab",
                status
            );
            match stream.write_all(head.as_bytes()).await {
                Ok(()) => {
                    drop(stream.flush().await);
                    tokio::time::sleep(body_delay).await;
                    stream.write_all(b"cd").await
                }
                Err(err) => Err(err),
            }
        }
    };
    if written.is_ok() {
        drop(stream.shutdown().await);
    }
}

async fn spawn_with(status: u16, reply: Reply) -> Result<SocketAddr, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_connection(stream, status, reply));
        }
    });
    Ok(addr)
}

/// Serves every connection with `status` after `delay`, then closes it.
///
/// The full request (headers and body) is read first so the client never
/// sees a reset while still writing.
pub(crate) async fn spawn_server(status: u16, delay: Duration) -> Result<SocketAddr, String> {
    spawn_with(status, Reply::Delayed(delay)).await
}

/// Like [`spawn_server`], but the status line and headers go out at once
/// while the last half of the body is held back for `body_delay`.
pub(crate) async fn spawn_slow_body_server(
    status: u16,
    body_delay: Duration,
) -> Result<SocketAddr, String> {
    spawn_with(status, Reply::SlowBody(body_delay)).await
}
