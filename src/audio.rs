//! Audio playback: the completion chime and the looping soundscape channel.

use crate::models::Soundscape;
use crate::soundscape::AmbientOutput;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioPlayer {
    /// Opens the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Plays the completion chime. Failures are logged and ignored.
    pub fn play_chime(&self) {
        if let Err(e) = self.play_generated_tone() {
            warn!(error = %e, "failed to play chime");
        }
    }

    /// A soundscape channel sharing this player's output device.
    pub fn ambient_channel(&self, soundscape_dir: &Path) -> RodioAmbient {
        RodioAmbient::new(self.handle.clone(), soundscape_dir)
    }

    fn play_generated_tone(&self) -> Result<(), AudioError> {
        use rodio::source::{SineWave, Source};

        let sink = Sink::try_new(&self.handle)?;

        // A5 then C6, with a short gap.
        let tone1 = SineWave::new(880.0)
            .take_duration(std::time::Duration::from_millis(150))
            .amplify(0.3);

        let silence = rodio::source::Zero::<f32>::new(1, 44100)
            .take_duration(std::time::Duration::from_millis(50));

        let tone2 = SineWave::new(1046.5)
            .take_duration(std::time::Duration::from_millis(200))
            .amplify(0.3);

        sink.append(tone1);
        sink.append(silence);
        sink.append(tone2);
        sink.detach();

        Ok(())
    }
}

/// Looping playback of `<dir>/<soundscape id>.ogg` on its own sink.
pub struct RodioAmbient {
    handle: OutputStreamHandle,
    dir: PathBuf,
    sink: Option<Sink>,
    loaded: Option<Soundscape>,
}

impl RodioAmbient {
    pub fn new(handle: OutputStreamHandle, dir: &Path) -> Self {
        Self {
            handle,
            dir: dir.to_path_buf(),
            sink: None,
            loaded: None,
        }
    }

    fn source_path(&self, soundscape: Soundscape) -> PathBuf {
        self.dir.join(format!("{}.ogg", soundscape.id()))
    }
}

impl AmbientOutput for RodioAmbient {
    fn loaded(&self) -> Option<Soundscape> {
        self.loaded
    }

    fn load(&mut self, soundscape: Soundscape) -> Result<(), AudioError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.loaded = None;

        let path = self.source_path(soundscape);
        let file = File::open(&path).map_err(|source| AudioError::Open {
            path: path.clone(),
            source,
        })?;
        let source = Decoder::new_looped(BufReader::new(file))?;

        let sink = Sink::try_new(&self.handle)?;
        sink.pause();
        sink.set_volume(0.0);
        sink.append(source);

        debug!(soundscape = %soundscape, path = %path.display(), "loaded soundscape");
        self.sink = Some(sink);
        self.loaded = Some(soundscape);
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.is_paused())
    }

    fn volume(&self) -> f32 {
        self.sink.as_ref().map_or(0.0, Sink::volume)
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }
}
