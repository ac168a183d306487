//! Graceful shutdown for the portal server
//!
//! One `watch` flag fans a stop request out to the HTTP server and the
//! session sweeper. OS signals (SIGTERM, SIGINT, Ctrl+C) raise the same flag
//! as [`ShutdownCoordinator::trigger`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

/// Cloneable stop flag. Once raised it stays raised.
#[derive(Clone)]
pub struct ShutdownSignal {
    flag: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(watch::Sender::new(false)),
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Raise the flag. Only the first call logs.
    pub fn trigger(&self) {
        let raised = self.flag.send_if_modified(|stopped| {
            let was = *stopped;
            *stopped = true;
            !was
        });
        if raised {
            info!("Shutdown signal triggered");
        }
    }

    /// Resolves once the flag is raised, immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of the first OS signal received, or `None` when no listener could
/// be installed.
async fn next_os_signal() -> Option<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        if let (Ok(mut term), Ok(mut int)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            return tokio::select! {
                _ = term.recv() => Some("SIGTERM"),
                _ = int.recv() => Some("SIGINT"),
            };
        }
        warn!("Unix signal handlers unavailable, listening for Ctrl+C only");
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => Some("Ctrl+C"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            None
        }
    }
}

/// Owns the process stop flag and bounds cleanup by a timeout.
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    /// Spawn a task that raises the flag on SIGTERM/SIGINT.
    pub fn start_signal_listener(&self) {
        let signal = self.signal.clone();
        tokio::spawn(async move {
            if let Some(name) = next_os_signal().await {
                info!("Received {}", name);
                signal.trigger();
            }
        });
    }

    pub fn trigger(&self) {
        self.signal.trigger();
    }

    /// Run `cleanup`, giving up after the configured timeout.
    /// Returns `false` when the timeout won.
    pub async fn run_cleanup<F, Fut>(&self, cleanup: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        info!(timeout_secs = self.timeout.as_secs(), "Draining server tasks");
        let finished = tokio::time::timeout(self.timeout, cleanup()).await.is_ok();
        if !finished {
            warn!(
                "Server tasks still running after {}s, giving up",
                self.timeout.as_secs()
            );
        }
        finished
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_waiters_wake_on_trigger() {
        let signal = ShutdownSignal::new();
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let signal = signal.clone();
                tokio::spawn(async move { signal.wait().await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.trigger();
        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter should wake")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_trigger_is_sticky() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
        signal.trigger();
        signal.trigger();
        assert!(signal.is_triggered());
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("already triggered");
    }

    #[tokio::test]
    async fn test_cleanup_outcome() {
        let coordinator = ShutdownCoordinator::new(0);
        let finished = coordinator
            .run_cleanup(|| async { tokio::time::sleep(Duration::from_millis(50)).await })
            .await;
        assert!(!finished);

        let coordinator = ShutdownCoordinator::new(1);
        assert!(coordinator.run_cleanup(|| async {}).await);
    }
}
