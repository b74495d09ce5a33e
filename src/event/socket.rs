use super::{Event, EventMessage};
use color_eyre::Result;
use std::os::unix::io::{FromRawFd, IntoRawFd};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::{timeout, Duration};

/// Maximum concurrent connections to prevent resource exhaustion
const MAX_CONNECTIONS: usize = 100;

/// Socket receive buffer size (event messages are a few hundred bytes)
const SOCKET_RECV_BUF: usize = 4096;

/// How long a sender may take to deliver its line
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// How long `send` waits to connect and write
const SEND_TIMEOUT: Duration = Duration::from_millis(500);

/// Listen for page events on a Unix socket
///
/// Each connection carries one JSON `EventMessage` line. Valid messages are
/// forwarded as `Event::Page`; everything else is logged and dropped.
pub async fn listen(tx: mpsc::Sender<Event>, socket_path: &Path) -> Result<()> {
    // Remove stale socket file
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }

    // Create socket with socket2 for buffer tuning
    let socket = socket2::Socket::new(socket2::Domain::UNIX, socket2::Type::STREAM, None)?;

    // OS may clamp to its minimum, which is fine
    if let Err(e) = socket.set_recv_buffer_size(SOCKET_RECV_BUF) {
        tracing::debug!("Could not set recv buffer size: {}", e);
    }

    socket.bind(&socket2::SockAddr::unix(socket_path)?)?;
    socket.listen(128)?;
    socket.set_nonblocking(true)?;

    // Convert to tokio UnixListener
    let std_listener: std::os::unix::net::UnixListener =
        unsafe { std::os::unix::net::UnixListener::from_raw_fd(socket.into_raw_fd()) };
    let listener = UnixListener::from_std(std_listener)?;

    tracing::info!("Listening on {:?}", socket_path);

    let semaphore = Arc::new(Semaphore::new(MAX_CONNECTIONS));

    // Backoff state for accept errors
    let mut backoff_ms: u64 = 0;
    const MAX_BACKOFF_MS: u64 = 5000;

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                backoff_ms = 0;

                let permit = match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!(
                            "Connection limit reached ({} max), dropping connection",
                            MAX_CONNECTIONS
                        );
                        continue;
                    }
                };

                let tx = tx.clone();
                tokio::spawn(async move {
                    // Permit is held until this task completes
                    let _permit = permit;

                    let mut lines = BufReader::new(stream).lines();

                    match timeout(READ_TIMEOUT, lines.next_line()).await {
                        Ok(Ok(Some(line))) if !line.trim().is_empty() => {
                            if let Some(event) = parse_line(&line) {
                                let _ = tx.send(event).await;
                            }
                        }
                        Ok(Ok(Some(_))) => {} // Empty line, ignore
                        Ok(Ok(None)) => {}    // Stream closed
                        Ok(Err(e)) => {
                            tracing::warn!("Read error: {}", e);
                        }
                        Err(_) => {
                            tracing::debug!("Read timeout (connection may be stale)");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::error!("Accept error: {}", e);

                // Exponential backoff to prevent CPU spin on persistent errors
                backoff_ms = if backoff_ms == 0 {
                    100
                } else {
                    (backoff_ms * 2).min(MAX_BACKOFF_MS)
                };

                tracing::debug!("Backing off for {}ms", backoff_ms);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Decode and validate one wire line
fn parse_line(line: &str) -> Option<Event> {
    match serde_json::from_str::<EventMessage>(line) {
        Ok(message) => {
            if let Err(e) = message.validate() {
                tracing::warn!("{} - {:?}", e, message);
                None
            } else {
                tracing::debug!("Received event: {:?}", message);
                Some(Event::Page(message.into_custom_event()))
            }
        }
        Err(e) => {
            tracing::warn!("Failed to parse event: {} - {}", e, line);
            None
        }
    }
}

/// Deliver `message` to the page listening on `socket_path`
///
/// Returns `Ok(false)` without error when nothing is listening, so callers
/// such as form hooks can fire and forget.
pub async fn send(socket_path: &Path, message: &EventMessage) -> Result<bool> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');

    let connect = timeout(SEND_TIMEOUT, UnixStream::connect(socket_path)).await;
    let mut stream = match connect {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::debug!("No page listening on {:?}: {}", socket_path, e);
            return Ok(false);
        }
        Err(_) => {
            tracing::debug!("Timed out connecting to {:?}", socket_path);
            return Ok(false);
        }
    };

    timeout(SEND_TIMEOUT, stream.write_all(line.as_bytes()))
        .await
        .map_err(|_| color_eyre::eyre::eyre!("Timed out sending event to {:?}", socket_path))??;
    stream.shutdown().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CustomEvent;

    #[test]
    fn test_parse_line_valid() {
        let event = parse_line(r#"{"event":"urlAdded"}"#).unwrap();
        match event {
            Event::Page(custom) => assert_eq!(custom.name, "urlAdded"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_line_rejects_invalid() {
        assert!(parse_line("not json").is_none());
        assert!(parse_line(r#"{"event":""}"#).is_none());
        assert!(parse_line(r#"{"event":"two words"}"#).is_none());
        assert!(parse_line(r#"{"event":"[\"urlAdded\"]"}"#).is_none());
    }

    #[tokio::test]
    async fn test_send_without_listener_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sock");
        let message = EventMessage::new(&CustomEvent::new("urlAdded"));
        assert!(!send(&path, &message).await.unwrap());
    }

    #[tokio::test]
    async fn test_send_reaches_listener() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.sock");
        let (tx, mut rx) = mpsc::channel(8);

        let listen_path = path.clone();
        let handle = tokio::spawn(async move { listen(tx, &listen_path).await });

        // Wait for the socket file to appear
        for _ in 0..100 {
            if path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let event = CustomEvent::new("urlAdded").with_detail(serde_json::json!({"short": "q1"}));
        assert!(send(&path, &EventMessage::new(&event)).await.unwrap());

        let received = timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match received {
            Event::Page(custom) => assert_eq!(custom, event),
            other => panic!("unexpected event: {other:?}"),
        }

        handle.abort();
    }
}
