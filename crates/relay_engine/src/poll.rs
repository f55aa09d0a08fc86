//! Long-polling receive loop.

use std::time::Duration;

use relay_logging::{relay_debug, relay_info, relay_warn};
use tokio_util::sync::CancellationToken;

use crate::dispatch::Dispatcher;
use crate::telegram::BotApi;

/// Backoff between failed poll attempts.
const ERROR_BACKOFF: Duration = Duration::from_secs(3);
/// Consecutive failures logged before the loop goes quiet until recovery.
const LOGGED_ERRORS: u32 = 3;

/// Polls `getUpdates` until `shutdown` fires, handing each update to the
/// dispatcher. Returns once in-flight runs have drained.
pub async fn run_polling(
    bot: &BotApi,
    dispatcher: &Dispatcher,
    poll_timeout: Duration,
    shutdown: CancellationToken,
) {
    relay_info!("Receive loop started (long polling, timeout {:?})", poll_timeout);

    let mut offset: Option<i64> = None;
    let mut consecutive_errors: u32 = 0;

    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = bot.get_updates(offset, poll_timeout) => polled,
        };

        match polled {
            Ok(updates) => {
                if consecutive_errors > 0 {
                    relay_info!("Receive loop recovered after {} errors", consecutive_errors);
                    consecutive_errors = 0;
                }
                relay_debug!("Poll returned {} updates", updates.len());
                for update in updates {
                    offset = next_offset_after_update(offset, update.update_id);
                    dispatcher.dispatch(update);
                }
            }
            Err(err) => {
                consecutive_errors += 1;
                if consecutive_errors <= LOGGED_ERRORS {
                    relay_warn!("getUpdates failed: {}", err);
                } else if consecutive_errors == LOGGED_ERRORS + 1 {
                    relay_warn!("Receive errors continuing (suppressing further logs until recovery)");
                }
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(ERROR_BACKOFF) => {}
                }
            }
        }
    }

    relay_info!(
        "Receive loop shutting down; waiting for {} in-flight tasks",
        dispatcher.in_flight()
    );
    dispatcher.drain().await;
}

fn next_offset_after_update(current: Option<i64>, update_id: i64) -> Option<i64> {
    let next = update_id.saturating_add(1);
    Some(current.map_or(next, |current_value| current_value.max(next)))
}

#[cfg(test)]
mod tests {
    use super::next_offset_after_update;

    #[test]
    fn offset_only_moves_forward() {
        let mut offset = None;
        offset = next_offset_after_update(offset, 10);
        assert_eq!(offset, Some(11));
        offset = next_offset_after_update(offset, 9);
        assert_eq!(offset, Some(11));
        offset = next_offset_after_update(offset, 15);
        assert_eq!(offset, Some(16));
    }
}
