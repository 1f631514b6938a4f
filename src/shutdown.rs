//! Shutdown propagation from the terminal interrupt to every running session.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn in_progress(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn listen(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger on the first Ctrl-C.
    pub fn spawn_ctrl_c_handler(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    println!("\n[✋] Interrupted, stopping all streams...");
                    info!("Interrupt received");
                    shutdown.trigger();
                }
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            }
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    pub fn in_progress(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is triggered. Never resolves if the `Shutdown`
    /// side is gone without triggering.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
