//! Quiet-period debounce over a channel.
//!
//! The calculators know nothing about timing; this wrapper sits between the
//! input source and the calculation so a burst of edits produces one
//! recalculation for the last value only.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::trace;

/// Default quiet period before a pending value is released.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(400);

/// Forwards the latest value from `input` once no newer value has arrived
/// for `quiet`.
///
/// A new value supersedes the pending one and restarts the quiet period.
/// When `input` closes, a pending value is released immediately and the
/// returned receiver closes after it.
pub fn debounce<T>(
    mut input: mpsc::Receiver<T>,
    quiet: Duration,
) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut pending: Option<T> = None;
        loop {
            if pending.is_none() {
                match input.recv().await {
                    Some(value) => pending = Some(value),
                    None => break,
                }
                continue;
            }

            tokio::select! {
                next = input.recv() => match next {
                    Some(value) => {
                        trace!("pending value superseded");
                        pending = Some(value);
                    }
                    None => {
                        if let Some(value) = pending.take() {
                            let _ = tx.send(value).await;
                        }
                        break;
                    }
                },
                _ = sleep(quiet) => {
                    if let Some(value) = pending.take() {
                        if tx.send(value).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    rx
}
