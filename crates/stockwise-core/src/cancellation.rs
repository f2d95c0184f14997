//! Cooperative cancellation for outbound calls
//!
//! A [`CancellationSource`] owns the cancel switch; any number of
//! [`CancellationToken`]s observe it. Tokens are cheap to clone and are
//! carried inside [`Context`](crate::Context) so every guarded call can race
//! against cancellation.

use tokio::sync::watch;

/// Owner side of a cancellation switch
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    /// Create a new, not yet cancelled, source
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Hand out a token observing this source
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Cancel every token created from this source
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation switch
///
/// The default token is detached and never fires.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancellationToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        Self::default()
    }

    /// Whether the owning source has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once the owning source is cancelled
    ///
    /// Pends forever for detached tokens and for sources dropped without
    /// being cancelled.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        let outcome = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if outcome.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
