//! Ambient soundscape playback that follows the timer's running state.
//!
//! Starting the timer fades the loop in to the configured volume; pausing
//! fades it out and then pauses playback. Both fades take one second in
//! twenty steps. Selecting the silent soundscape stops playback at once.

use crate::audio::AudioError;
use crate::models::Soundscape;
use crate::ticker::Ticker;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

pub const FADE_STEPS: u32 = 20;
pub const FADE_DURATION: Duration = Duration::from_millis(1000);

/// A playback channel the controller drives.
pub trait AmbientOutput: Send + 'static {
    /// The soundscape currently loaded, if any.
    fn loaded(&self) -> Option<Soundscape>;
    fn load(&mut self, soundscape: Soundscape) -> Result<(), AudioError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
}

/// Linear volume ramp from `start` to `target` over [`FADE_STEPS`] steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    start: f32,
    target: f32,
    step: u32,
}

impl Fade {
    pub fn new(start: f32, target: f32) -> Self {
        Self {
            start: start.clamp(0.0, 1.0),
            target: target.clamp(0.0, 1.0),
            step: 0,
        }
    }

    pub fn step_interval() -> Duration {
        FADE_DURATION / FADE_STEPS
    }

    /// Advances one step. Returns the new volume and whether the fade is over.
    ///
    /// The last step lands exactly on the target.
    pub fn advance(&mut self) -> (f32, bool) {
        self.step = (self.step + 1).min(FADE_STEPS);
        if self.step == FADE_STEPS {
            return (self.target, true);
        }

        let progress = self.step as f32 / FADE_STEPS as f32;
        let volume = (self.start + (self.target - self.start) * progress).clamp(0.0, 1.0);
        let silenced = self.target <= 0.0 && volume <= 0.0;
        (volume, silenced)
    }
}

struct Shared<O> {
    output: O,
    // Bumped on every sync; a fade only applies while its generation is current.
    generation: u64,
}

pub struct SoundscapeController<O: AmbientOutput> {
    shared: Arc<Mutex<Shared<O>>>,
    fade: Option<Ticker>,
    step_interval: Duration,
}

impl<O: AmbientOutput> SoundscapeController<O> {
    pub fn new(output: O) -> Self {
        Self::with_step_interval(output, Fade::step_interval())
    }

    pub fn with_step_interval(output: O, step_interval: Duration) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                output,
                generation: 0,
            })),
            fade: None,
            step_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared<O>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Brings playback in line with the timer and the selected soundscape.
    ///
    /// `volume` is the target level, 0.0 to 1.0.
    pub fn sync(&mut self, running: bool, soundscape: Soundscape, volume: f32) {
        if let Some(mut fade) = self.fade.take() {
            fade.cancel();
        }

        let mut shared = self.lock();
        shared.generation += 1;
        let generation = shared.generation;

        if soundscape.is_silent() {
            shared.output.pause();
            return;
        }

        if shared.output.loaded() != Some(soundscape) {
            if let Err(e) = shared.output.load(soundscape) {
                warn!(soundscape = %soundscape, error = %e, "soundscape unavailable");
                return;
            }
        }

        let fade = if running {
            shared.output.play();
            debug!(soundscape = %soundscape, volume, "fading soundscape in");
            Fade::new(shared.output.volume(), volume)
        } else if shared.output.is_playing() {
            debug!(soundscape = %soundscape, "fading soundscape out");
            Fade::new(shared.output.volume(), 0.0)
        } else {
            return;
        };
        drop(shared);

        self.fade = Some(self.start_fade(generation, fade, !running));
    }

    /// Stops playback without a fade.
    pub fn stop(&mut self) {
        if let Some(mut fade) = self.fade.take() {
            fade.cancel();
        }
        let mut shared = self.lock();
        shared.generation += 1;
        shared.output.pause();
    }

    fn start_fade(&self, generation: u64, mut fade: Fade, pause_at_end: bool) -> Ticker {
        let shared = Arc::clone(&self.shared);
        Ticker::start(self.step_interval, move || {
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if shared.generation != generation {
                return ControlFlow::Break(());
            }

            let (volume, done) = fade.advance();
            shared.output.set_volume(volume);
            if !done {
                return ControlFlow::Continue(());
            }
            if pause_at_end {
                shared.output.pause();
            }
            ControlFlow::Break(())
        })
    }

    #[cfg(test)]
    fn with_output<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        f(&self.lock().output)
    }
}
