//! Signal handling for long-running commands
//!
//! The first SIGINT/SIGTERM asks the job to stop before its next batch. A
//! second one ends [`relay_shutdown`] so the caller can exit at once; the
//! checkpoint already holds every completed batch.

use std::future::Future;
use tokio::sync::watch;

/// Resolve on SIGINT, or SIGTERM on unix
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Raise the shutdown flag on the first signal, return on the second
pub async fn relay_shutdown<F, Fut>(mut next_signal: F, shutdown: watch::Sender<bool>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    next_signal().await;
    tracing::info!("Shutdown signal received, finishing current batch");
    println!("\n⚠️  Shutdown signal received, completing current batch...");
    println!("   Press Ctrl+C again to quit now; completed batches stay checkpointed.");
    let _ = shutdown.send(true);

    next_signal().await;
    tracing::warn!("Second shutdown signal received, exiting immediately");
}
