//! Timeout and cancellation for outbound calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::BackendError;

/// Default time budget for a single backend call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(20);

/// How long outbound calls may take before being reported as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
}

impl CallPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_TIMEOUT)
    }
}

/// Run `call` under `policy`, giving up early when `cancel` fires.
///
/// A call that outlives its budget yields [`BackendError::Timeout`]; a
/// cancelled one yields [`BackendError::Cancelled`]. In both cases the
/// call future is dropped.
pub async fn bounded<T, F>(
    policy: CallPolicy,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::select! {
        biased;

        () = cancel.cancelled() => {
            debug!("Call cancelled by owner");
            Err(BackendError::Cancelled)
        }

        result = tokio::time::timeout(policy.timeout, call) => {
            match result {
                Ok(inner) => inner,
                Err(_) => {
                    debug!("Call exceeded {:?}", policy.timeout);
                    Err(BackendError::Timeout(policy.timeout))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let token = CancellationToken::new();
        let result = bounded(CallPolicy::default(), &token, async { Ok::<_, BackendError>(7) }).await;
        assert_eq!(result, Ok(7));

        let result: Result<(), _> = bounded(CallPolicy::default(), &token, async {
            Err(BackendError::Transport("reset".into()))
        })
        .await;
        assert_eq!(result, Err(BackendError::Transport("reset".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out_hung_call() {
        let token = CancellationToken::new();
        let policy = CallPolicy::new(Duration::from_secs(5));
        let result: Result<(), _> = bounded(policy, &token, std::future::pending()).await;
        assert_eq!(result, Err(BackendError::Timeout(Duration::from_secs(5))));
    }

    #[tokio::test]
    async fn test_bounded_respects_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<(), _> =
            bounded(CallPolicy::default(), &token, std::future::pending()).await;
        assert_eq!(result, Err(BackendError::Cancelled));
    }
}
