use std::time::Duration;
use tokio::task::JoinHandle;
pub use tokio_util::sync::CancellationToken;

use crate::ui::prelude::*;

/// Wait for `duration` unless `token` is cancelled first. Returns `true` when
/// the full duration elapsed without cancellation.
pub async fn sleep(token: &CancellationToken, duration: Duration) -> bool {
    if token.is_cancelled() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => !token.is_cancelled(),
        _ = token.cancelled() => false,
    }
}

/// Cancel `token` when the process receives Ctrl+C. Abort the returned handle
/// once the token is no longer needed.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => token.cancel(),
            Err(e) => emit(
                Level::Warn,
                "runner.signal_failed",
                &format!("Failed to install Ctrl+C handler: {}", e),
                None,
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleep_runs_to_completion_without_cancel() {
        let token = CancellationToken::new();
        assert!(sleep(&token, Duration::from_millis(5)).await);
    }

    #[tokio::test]
    async fn cancel_interrupts_a_long_sleep() {
        let token = CancellationToken::new();
        let remote = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.cancel();
        });

        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            sleep(&token, Duration::from_secs(3600)),
        )
        .await
        .expect("cancel should wake the sleeper");
        assert!(!finished);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_token_does_not_wait() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(!sleep(&token, Duration::from_secs(3600)).await);
    }
}
