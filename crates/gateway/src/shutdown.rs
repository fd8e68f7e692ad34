//! Shutdown coordination
//!
//! A `CancellationToken`-based controller shared by the server, the
//! dispatcher task, and the transport tasks. Cancelling the parent stops
//! every child.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller that cancels on Ctrl+C
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    token.cancel();
                }
                Err(e) => warn!(%e, "Failed to listen for Ctrl+C"),
            }
        });

        controller
    }

    /// Token cancelled together with this controller
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn children_follow_the_parent() {
        let controller = ShutdownController::new();
        let child = controller.child_token();

        assert!(!child.is_cancelled());
        controller.shutdown();
        assert!(controller.is_cancelled());
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn wait_returns_after_shutdown() {
        let controller = ShutdownController::new();
        controller.shutdown();
        controller.wait().await;
    }
}
