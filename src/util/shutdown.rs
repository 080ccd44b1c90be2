//! Shutdown signalling.

use std::future::Future;
use std::io;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Broadcasts a single shutdown notification to every subscriber.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Subscribe to shutdown notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Notify every subscriber.
    pub fn trigger(&self) {
        let _ = self.sender.send(());
    }

    /// Wait for Ctrl+C, then notify every subscriber.
    pub async fn trigger_on_ctrl_c(&self) {
        self.trigger_on(tokio::signal::ctrl_c()).await;
    }

    /// Wait for `signal`, then notify every subscriber.
    ///
    /// If the signal cannot be listened for, the error is logged and this
    /// never returns: the service keeps running rather than exiting at once.
    pub async fn trigger_on<F>(&self, signal: F)
    where
        F: Future<Output = io::Result<()>>,
    {
        match signal.await {
            Ok(()) => {
                info!("received shutdown signal");
                self.trigger();
            }
            Err(e) => {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
