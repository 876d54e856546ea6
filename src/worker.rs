use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use crate::installer::{InstallEvent, InstallSummary, Installer};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::{debug, error};

pub const WORKER_THREAD_NAME: &str = "install-worker";

/// Message from the install worker to the UI thread
#[derive(Debug)]
pub enum WorkerEvent {
    Install(InstallEvent),
    /// Sent exactly once, last
    Finished(Result<InstallSummary>),
}

/// Runs one install on a detached background thread.
///
/// The worker never touches the UI; everything it has to say arrives on the
/// returned channel.
pub fn spawn_install(
    config: Arc<InstallerConfig>,
    game_root: PathBuf,
) -> Result<Receiver<WorkerEvent>> {
    let (tx, rx) = mpsc::channel();

    let handle = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let installer = Installer::new(&config, game_root);
            let progress_tx = tx.clone();

            let result = installer.install(|event| {
                // The receiver may already be gone if the shell closed
                let _ = progress_tx.send(WorkerEvent::Install(event));
            });

            if let Err(e) = &result {
                error!(error = %e, "install failed");
            }
            if tx.send(WorkerEvent::Finished(result)).is_err() {
                debug!("install finished after the shell closed");
            }
        })
        .map_err(|e| InstallerError::Other(format!("failed to start install worker: {}", e)))?;

    // Detached
    drop(handle);

    Ok(rx)
}
