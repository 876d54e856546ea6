//! Background music for the installer shell.
//!
//! The shell only talks to [`Playback`]; the real audio backend is compiled
//! in with the `audio` feature.

use crate::error::{InstallerError, Result};

use std::path::Path;
use tracing::{debug, warn};

/// Looping audio stream controlled by the shell
pub trait Playback {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Volume is clamped into `0.0..=1.0`
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    /// Stops the stream for good; later calls are no-ops
    fn stop(&mut self);
    /// Whether anything can actually be heard
    fn is_available(&self) -> bool {
        true
    }
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Keeps playback state without producing sound
#[derive(Debug)]
pub struct SilentPlayback {
    volume: f32,
    paused: bool,
}

impl SilentPlayback {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: clamp_volume(volume),
            paused: false,
        }
    }
}

impl Playback for SilentPlayback {
    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn stop(&mut self) {
        self.paused = true;
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(feature = "audio")]
mod rodio_backend {
    use super::{Playback, clamp_volume};
    use crate::error::{InstallerError, Result};

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    fn audio_err(e: impl std::fmt::Display) -> InstallerError {
        InstallerError::AudioInit(e.to_string())
    }

    pub struct RodioPlayback {
        // The stream must outlive the sink
        _stream: OutputStream,
        _handle: OutputStreamHandle,
        sink: Sink,
        volume: f32,
        stopped: bool,
    }

    impl RodioPlayback {
        pub fn open(path: &Path, volume: f32) -> Result<Self> {
            let (stream, handle) = OutputStream::try_default().map_err(audio_err)?;
            let sink = Sink::try_new(&handle).map_err(audio_err)?;

            let file = File::open(path).map_err(audio_err)?;
            let source = Decoder::new(BufReader::new(file)).map_err(audio_err)?;

            let volume = clamp_volume(volume);
            sink.set_volume(volume);
            sink.append(source.repeat_infinite());
            sink.play();

            Ok(Self {
                _stream: stream,
                _handle: handle,
                sink,
                volume,
                stopped: false,
            })
        }
    }

    impl Playback for RodioPlayback {
        fn play(&mut self) {
            if !self.stopped {
                self.sink.play();
            }
        }

        fn pause(&mut self) {
            self.sink.pause();
        }

        fn is_paused(&self) -> bool {
            self.stopped || self.sink.is_paused()
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = clamp_volume(volume);
            self.sink.set_volume(self.volume);
        }

        fn volume(&self) -> f32 {
            self.volume
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.sink.stop();
                self.stopped = true;
            }
        }
    }
}

#[cfg(feature = "audio")]
pub use rodio_backend::RodioPlayback;

/// Opens the looping music stream at `path`
#[cfg(feature = "audio")]
pub fn start_playback(path: &Path, volume: f32) -> Result<Box<dyn Playback>> {
    if !path.is_file() {
        return Err(InstallerError::AudioInit(format!(
            "music file not found: {}",
            path.display()
        )));
    }

    debug!(path = %path.display(), volume, "starting music");
    Ok(Box::new(RodioPlayback::open(path, volume)?))
}

/// Opens the looping music stream at `path`
#[cfg(not(feature = "audio"))]
pub fn start_playback(path: &Path, volume: f32) -> Result<Box<dyn Playback>> {
    if !path.is_file() {
        return Err(InstallerError::AudioInit(format!(
            "music file not found: {}",
            path.display()
        )));
    }

    debug!(path = %path.display(), volume, "built without audio support, music is silent");
    Ok(Box::new(SilentPlayback::new(volume)))
}

/// Like [`start_playback`], but audio problems never stop the installer
pub fn start_playback_or_silent(path: &Path, volume: f32) -> Box<dyn Playback> {
    match start_playback(path, volume) {
        Ok(playback) => playback,
        Err(e) => {
            warn!(error = %e, "music disabled");
            Box::new(SilentPlayback::new(volume))
        }
    }
}
