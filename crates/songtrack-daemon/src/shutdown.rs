//! Stop triggers. Enter on an interactive console, Ctrl-C and SIGTERM all
//! end up cancelling the same token.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub fn spawn_triggers(stop: CancellationToken, interactive: bool) {
    let on_signal = stop.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = on_signal.cancelled() => {}
            signal = wait_for_signal() => {
                info!("Shutdown requested ({})", signal);
                on_signal.cancel();
            }
        }
    });

    if interactive {
        // A plain thread: a blocked stdin read must not keep the runtime alive
        std::thread::spawn(move || {
            if wait_for_enter() {
                info!("Stopped by you.");
                stop.cancel();
            }
        });
    }
}

/// Block until a line arrives on stdin. `false` on EOF or read error.
fn wait_for_enter() -> bool {
    let mut line = String::new();
    matches!(std::io::stdin().read_line(&mut line), Ok(n) if n > 0)
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            return ctrl_c().await;
        }
    };
    tokio::select! {
        name = ctrl_c() => name,
        _ = term.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    "Ctrl-C"
}
