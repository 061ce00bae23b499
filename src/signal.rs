use {super::*, tokio::signal::ctrl_c};

/// Returns a token cancelled on SIGINT or SIGTERM. Drivers notice at their
/// next check and wind down on their own.
pub(crate) fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let signal = shutdown_signal().await;
            info!("Received {signal}, shutting down");
            cancel.cancel();
        }
    });

    cancel
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        },
        Err(err) => {
            warn!("Failed to install SIGTERM handler: {err}");
            ctrl_c().await.ok();
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await.ok();
    "Ctrl-C"
}
