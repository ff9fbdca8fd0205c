// src/shutdown.rs
//! Process stop signals: Ctrl-C everywhere, SIGTERM on unix.

use std::io;
#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Listens for the signals that should stop the server.
///
/// The SIGTERM handler is registered on `install`, so a signal that arrives
/// before the first `recv` is still delivered.
pub struct ShutdownSignals {
    #[cfg(unix)]
    terminate: Signal,
}

impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Waits for the first stop signal and returns its name.
    pub async fn recv(&mut self) -> &'static str {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("❌ Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = self.terminate.recv();
        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        tokio::select! {
            _ = ctrl_c => "Ctrl-C",
            _ = terminate => "SIGTERM",
        }
    }
}
