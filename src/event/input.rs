use super::Event;
use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Poll interval for terminal input
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Forward key presses to the page loop until cancelled
pub async fn listen(tx: mpsc::Sender<Event>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("Input listener cancelled");
                break;
            }
            () = tokio::time::sleep(POLL_INTERVAL) => {
                // Non-blocking poll: the sleep above already paced us
                if !event::poll(Duration::ZERO).unwrap_or(false) {
                    continue;
                }
                match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx.send(Event::Key(key)).await.is_err() {
                            // Page loop is gone
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to read terminal input: {}", e),
                }
            }
        }
    }
}
