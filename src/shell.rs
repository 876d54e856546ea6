//! The installer's control loop.
//!
//! Everything here runs on the UI thread. The install itself happens on a
//! worker thread whose events are drained by [`Shell::poll_worker`] and
//! [`Shell::wait_for_worker`].

use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use crate::installer::{InstallEvent, InstallSummary};
use crate::playback::Playback;
use crate::probe::{absolute_game_root, locate_game_root};
use crate::shutdown;
use crate::ui::Ui;
use crate::worker::{WorkerEvent, spawn_install};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellAction {
    Install,
    Play,
    Pause,
    Volume,
    WaitForInstall,
    Finish,
    Exit,
}

impl ShellAction {
    pub fn label(&self) -> &'static str {
        match self {
            ShellAction::Install => "Install",
            ShellAction::Play => "Play music",
            ShellAction::Pause => "Pause music",
            ShellAction::Volume => "Set volume",
            ShellAction::WaitForInstall => "Wait for the installation",
            ShellAction::Finish => "Finish",
            ShellAction::Exit => "Exit",
        }
    }
}

#[derive(Clone, Debug)]
pub enum InstallState {
    Idle,
    Installing,
    Done(InstallSummary),
    /// Install can be retried from here
    Failed(String),
}

/// Actions offered for the current state
pub fn available_actions(state: &InstallState, music_paused: bool) -> Vec<ShellAction> {
    let mut actions = Vec::new();

    match state {
        InstallState::Idle | InstallState::Failed(_) => actions.push(ShellAction::Install),
        InstallState::Installing => actions.push(ShellAction::WaitForInstall),
        InstallState::Done(_) => {}
    }

    actions.push(if music_paused {
        ShellAction::Play
    } else {
        ShellAction::Pause
    });
    actions.push(ShellAction::Volume);

    if matches!(state, InstallState::Done(_)) {
        actions.push(ShellAction::Finish);
    } else {
        actions.push(ShellAction::Exit);
    }

    actions
}

pub struct Shell<'a> {
    config: Arc<InstallerConfig>,
    ui: &'a dyn Ui,
    playback: Box<dyn Playback>,
    state: InstallState,
    worker: Option<Receiver<WorkerEvent>>,
    progress: Option<usize>,
}

impl<'a> Shell<'a> {
    pub fn new(config: Arc<InstallerConfig>, ui: &'a dyn Ui, playback: Box<dyn Playback>) -> Self {
        Self {
            config,
            ui,
            playback,
            state: InstallState::Idle,
            worker: None,
            progress: None,
        }
    }

    pub fn state(&self) -> &InstallState {
        &self.state
    }

    pub fn playback(&self) -> &dyn Playback {
        self.playback.as_ref()
    }

    /// Menu loop; returns when the user picks Finish or Exit
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.poll_worker()?;

            self.ui.shell_display_status(&self.status_line())?;
            let actions = available_actions(&self.state, self.playback.is_paused());
            let action = self
                .ui
                .shell_select_action(&actions, self.playback.volume())?;
            debug!(?action, "shell action");

            match action {
                ShellAction::Install => {
                    if let Err(e) = self.on_install() {
                        self.ui.error(&e.to_string())?;
                    }
                }
                ShellAction::Play => self.playback.play(),
                ShellAction::Pause => self.playback.pause(),
                ShellAction::Volume => {
                    let volume = self.ui.shell_prompt_volume(self.playback.volume())?;
                    self.playback.set_volume(volume);
                }
                ShellAction::WaitForInstall => self.wait_for_worker()?,
                ShellAction::Finish | ShellAction::Exit => break,
            }

            self.ui.blank_line()?;
        }

        self.on_close();
        Ok(())
    }

    /// Installs without asking anything and waits for the result
    pub fn run_unattended(&mut self) -> Result<InstallSummary> {
        self.on_install()?;
        self.wait_for_worker()?;
        self.on_close();

        match &self.state {
            InstallState::Done(summary) => Ok(summary.clone()),
            InstallState::Failed(reason) => Err(InstallerError::Other(reason.clone())),
            InstallState::Idle | InstallState::Installing => Err(InstallerError::Other(
                "installation did not complete".to_string(),
            )),
        }
    }

    /// Starts the install worker unless one is running or finished
    pub fn on_install(&mut self) -> Result<()> {
        match self.state {
            InstallState::Installing => return Err(InstallerError::InstallInProgress),
            InstallState::Done(_) => {
                return Err(InstallerError::Other(
                    "the mod is already installed".to_string(),
                ));
            }
            InstallState::Idle | InstallState::Failed(_) => {}
        }

        let game_root = match self.resolve_target() {
            Ok(path) => path,
            Err(e) => {
                self.state = InstallState::Failed(e.to_string());
                return Err(e);
            }
        };

        info!(game_root = %game_root.display(), "starting install worker");
        let rx = spawn_install(Arc::clone(&self.config), game_root)?;
        self.worker = Some(rx);
        self.state = InstallState::Installing;

        Ok(())
    }

    /// Probes for the game, asking the user when probing finds nothing
    fn resolve_target(&self) -> Result<PathBuf> {
        match locate_game_root(&self.config) {
            Ok(path) => {
                self.ui.path_display_found(&path)?;
                Ok(path)
            }
            Err(InstallerError::GamePathNotFound(folder)) => {
                warn!(folder = %folder, "game not found in default locations");
                self.ui.warn(&format!(
                    "Game folder \"{}\" not found in default directories.",
                    folder
                ))?;
                match self.ui.path_prompt_game_dir()? {
                    Some(path) => absolute_game_root(&path),
                    None => Err(InstallerError::UserCancelled),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Drains pending worker events without blocking
    pub fn poll_worker(&mut self) -> Result<()> {
        let Some(rx) = self.worker.take() else {
            return Ok(());
        };

        loop {
            match rx.try_recv() {
                Ok(WorkerEvent::Install(event)) => self.on_event(event)?,
                Ok(WorkerEvent::Finished(result)) => return self.complete(result),
                Err(TryRecvError::Empty) => {
                    self.worker = Some(rx);
                    return Ok(());
                }
                Err(TryRecvError::Disconnected) => {
                    return self.complete(Err(InstallerError::Other(
                        "install worker stopped unexpectedly".to_string(),
                    )));
                }
            }
        }
    }

    /// Blocks until the running install reports completion
    pub fn wait_for_worker(&mut self) -> Result<()> {
        let Some(rx) = self.worker.take() else {
            return Ok(());
        };

        loop {
            match rx.recv() {
                Ok(WorkerEvent::Install(event)) => self.on_event(event)?,
                Ok(WorkerEvent::Finished(result)) => return self.complete(result),
                Err(_) => {
                    return self.complete(Err(InstallerError::Other(
                        "install worker stopped unexpectedly".to_string(),
                    )));
                }
            }
        }
    }

    fn on_event(&mut self, event: InstallEvent) -> Result<()> {
        match event {
            InstallEvent::Step { step, description } => {
                self.finish_progress()?;
                self.ui.install_display_step(step, &description)?;
            }
            InstallEvent::Progress { current, total } => {
                let id = match self.progress {
                    Some(id) => id,
                    None => {
                        let id = self.ui.progress_start("Working", total as u64)?;
                        self.progress = Some(id);
                        id
                    }
                };
                self.ui.progress_update(id, current as u64)?;
            }
        }
        Ok(())
    }

    fn finish_progress(&mut self) -> Result<()> {
        if let Some(id) = self.progress.take() {
            self.ui.progress_finish(id)?;
        }
        Ok(())
    }

    /// Handles the worker's final message; runs once per install
    fn complete(&mut self, result: Result<InstallSummary>) -> Result<()> {
        if !matches!(self.state, InstallState::Installing) {
            debug!("ignoring completion outside of an install");
            return Ok(());
        }

        self.finish_progress()?;

        match result {
            Ok(summary) => {
                self.ui.install_display_failures(&summary.failures)?;
                self.ui.install_finished(&summary)?;
                self.state = InstallState::Done(summary);
            }
            Err(e) => {
                self.ui.error(&format!("Installation failed: {}", e))?;
                self.state = InstallState::Failed(e.to_string());
            }
        }

        Ok(())
    }

    fn status_line(&self) -> String {
        let install = match &self.state {
            InstallState::Idle => "Ready to install".to_string(),
            InstallState::Installing => "Installing...".to_string(),
            InstallState::Done(summary) if summary.is_clean() => {
                format!("Installed into {}", summary.game_root.display())
            }
            InstallState::Done(summary) => format!(
                "Installed into {} with {} warning(s)",
                summary.game_root.display(),
                summary.failures.len()
            ),
            InstallState::Failed(reason) => format!("Install failed: {}", reason),
        };
        let music = if !self.playback.is_available() {
            "unavailable"
        } else if self.playback.is_paused() {
            "paused"
        } else {
            "playing"
        };

        format!("{} | Music: {}", install, music)
    }

    /// Stops the music; an unfinished install loses its staging area
    fn on_close(&mut self) {
        self.playback.stop();

        if matches!(self.state, InstallState::Installing) {
            warn!("closing while the install is still running");
            shutdown::run_shutdown();
        }
    }
}
