use std::future::Future;

pub use tokio_util::sync::CancellationToken;

/// Drive `fut` until it completes or `cancel` fires.
///
/// Returns `None` on cancellation. The future is dropped at that point,
///  so nothing it had in flight gets to finish later.
pub(crate) async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let cancel = CancellationToken::new();
        assert_eq!(until_cancelled(&cancel, async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_already_cancelled_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(until_cancelled(&cancel, async { 7 }).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_pending_work() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let slow = tokio::time::sleep(Duration::from_secs(3600));
        assert_eq!(until_cancelled(&cancel, slow).await, None);
    }
}
