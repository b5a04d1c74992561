use crate::types::VibeSyncError;
use crate::Result;
use std::future::Future;
use tokio::sync::watch;

/// Shared stop flag for a playlist load.
///
/// Clones observe the same flag. An in-flight request is raced against it
/// with [`run_with_cancel`].
#[derive(Clone, Debug)]
pub struct CancellationState {
    flag: watch::Sender<bool>,
}

impl Default for CancellationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationState {
    pub fn new() -> Self {
        Self {
            flag: watch::channel(false).0,
        }
    }

    /// Raise the flag and wake every waiter.
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    /// Lower the flag so the state can guard another load.
    pub fn reset(&self) {
        self.flag.send_replace(false);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }
}

/// Drive `operation` to completion unless cancellation is requested first.
///
/// The operation is dropped, not awaited, once the flag goes up.
pub async fn run_with_cancel<T, F>(mut flag: watch::Receiver<bool>, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if *flag.borrow_and_update() {
        return Err(VibeSyncError::Cancelled);
    }

    tokio::pin!(operation);
    tokio::select! {
        result = &mut operation => result,
        raised = async { flag.wait_for(|cancelled| *cancelled).await.is_ok() } => {
            if raised {
                Err(VibeSyncError::Cancelled)
            } else {
                // Every CancellationState clone is gone; nothing can cancel any more.
                operation.await
            }
        }
    }
}

/// [`run_with_cancel`] when a cancellation state is given, plain `.await` otherwise.
pub async fn run_cancellable<T, F>(cancel: Option<&CancellationState>, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match cancel {
        Some(cancel) => run_with_cancel(cancel.subscribe(), operation).await,
        None => operation.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_operation_completes_without_cancel() {
        let state = CancellationState::new();
        let result = run_with_cancel(state.subscribe(), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_already_cancelled_short_circuits() {
        let state = CancellationState::new();
        state.cancel();
        assert!(state.is_cancelled());

        let result = run_with_cancel(state.subscribe(), async { Ok(()) }).await;
        assert!(matches!(result, Err(VibeSyncError::Cancelled)));

        state.reset();
        assert!(!state.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_operation() {
        let state = CancellationState::new();
        let canceller = state.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = run_with_cancel(state.subscribe(), async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(VibeSyncError::Cancelled)));
    }

    #[tokio::test]
    async fn test_dropped_state_lets_operation_finish() {
        let state = CancellationState::new();
        let flag = state.subscribe();
        drop(state);

        let result = run_with_cancel(flag, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok("done")
        })
        .await;

        assert_eq!(result.unwrap(), "done");
    }
}
