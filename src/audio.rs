//! Audio triggering
//!
//! The simulation only emits `GameEvent::Sound` cues. The manager here maps
//! them to the clips the current level resolved and hands them to a backend;
//! nothing waits on playback.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ResourceLocator;
use crate::sim::{GameEvent, LevelLayout};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball hits a brick (walls included)
    BrickHit,
    /// Ball hits paddle
    PaddleHit,
    /// Ball left the play field
    BallLoss,
}

/// Clips resolved for one level; `None` plays nothing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundBank {
    pub music: Option<PathBuf>,
    pub brick_hit: Option<PathBuf>,
    pub paddle_hit: Option<PathBuf>,
    pub ball_loss: Option<PathBuf>,
}

impl SoundBank {
    pub fn resolve(layout: &LevelLayout, locator: &dyn ResourceLocator) -> Self {
        let find = |id: &Option<String>| id.as_deref().and_then(|id| locator.locate(id));
        Self {
            music: find(&layout.music),
            brick_hit: find(&layout.brick_hit_sound),
            paddle_hit: find(&layout.paddle_hit_sound),
            ball_loss: find(&layout.ball_loss_sound),
        }
    }

    pub fn clip(&self, effect: SoundEffect) -> Option<&Path> {
        match effect {
            SoundEffect::BrickHit => self.brick_hit.as_deref(),
            SoundEffect::PaddleHit => self.paddle_hit.as_deref(),
            SoundEffect::BallLoss => self.ball_loss.as_deref(),
        }
    }
}

/// Something that can actually make noise
pub trait AudioBackend {
    fn play_clip(&mut self, clip: &Path, volume: f32);
    fn play_music(&mut self, clip: &Path, volume: f32);
    fn stop_music(&mut self);
}

/// Backend for headless runs: every cue becomes a debug log line
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play_clip(&mut self, clip: &Path, volume: f32) {
        log::debug!("play {} at {:.2}", clip.display(), volume);
    }

    fn play_music(&mut self, clip: &Path, volume: f32) {
        log::info!("music {} at {:.2}", clip.display(), volume);
    }

    fn stop_music(&mut self) {
        log::info!("music stopped");
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, music_volume: f32, sfx_volume: f32) -> Self {
        Self {
            backend,
            music_volume: music_volume.clamp(0.0, 1.0),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.backend.stop_music();
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Play a sound effect from `bank`, if the level has one
    pub fn play(&mut self, effect: SoundEffect, bank: &SoundBank) {
        if self.muted || self.sfx_volume <= 0.0 {
            return;
        }
        if let Some(clip) = bank.clip(effect) {
            self.backend.play_clip(clip, self.sfx_volume);
        }
    }

    /// Play every sound cue in a drained event batch
    pub fn play_events(&mut self, events: &[GameEvent], bank: &SoundBank) {
        for event in events {
            if let GameEvent::Sound(effect) = event {
                self.play(*effect, bank);
            }
        }
    }

    /// Start the level's background music, or stop the previous one
    pub fn start_music(&mut self, bank: &SoundBank) {
        self.backend.stop_music();
        if self.muted {
            return;
        }
        if let Some(clip) = &bank.music {
            self.backend.play_music(clip, self.music_volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        clips: Vec<PathBuf>,
        clip_volumes: Vec<f32>,
        music: Option<PathBuf>,
        music_volume: Option<f32>,
    }

    impl AudioBackend for Recorder {
        fn play_clip(&mut self, clip: &Path, volume: f32) {
            self.clips.push(clip.to_path_buf());
            self.clip_volumes.push(volume);
        }

        fn play_music(&mut self, clip: &Path, volume: f32) {
            self.music = Some(clip.to_path_buf());
            self.music_volume = Some(volume);
        }

        fn stop_music(&mut self) {
            self.music = None;
        }
    }

    fn bank() -> SoundBank {
        SoundBank {
            music: Some("theme.ogg".into()),
            brick_hit: Some("hit.wav".into()),
            paddle_hit: None,
            ball_loss: Some("loss.wav".into()),
        }
    }

    #[test]
    fn test_events_play_resolved_clips_only() {
        let mut audio = AudioManager::new(Recorder::default(), 1.0, 1.0);
        let events = [
            GameEvent::Sound(SoundEffect::BrickHit),
            GameEvent::Sound(SoundEffect::PaddleHit),
            GameEvent::LevelCleared,
            GameEvent::Sound(SoundEffect::BallLoss),
        ];
        audio.play_events(&events, &bank());
        assert_eq!(
            audio.backend().clips,
            vec![PathBuf::from("hit.wav"), PathBuf::from("loss.wav")]
        );
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut audio = AudioManager::new(Recorder::default(), 1.0, 1.0);
        audio.start_music(&bank());
        assert_eq!(audio.backend().music, Some(PathBuf::from("theme.ogg")));
        audio.set_muted(true);
        assert_eq!(audio.backend().music, None);
        audio.play(SoundEffect::BrickHit, &bank());
        assert!(audio.backend().clips.is_empty());
    }

    #[test]
    fn test_volumes_are_clamped_and_applied() {
        let mut audio = AudioManager::new(Recorder::default(), 0.7, 1.0);
        audio.set_music_volume(1.5);
        audio.set_sfx_volume(0.25);
        audio.start_music(&bank());
        audio.play(SoundEffect::BrickHit, &bank());
        assert_eq!(audio.backend().music_volume, Some(1.0));
        assert_eq!(audio.backend().clip_volumes, vec![0.25]);

        // Silent effects are skipped entirely
        audio.set_sfx_volume(-1.0);
        audio.play(SoundEffect::BallLoss, &bank());
        assert_eq!(audio.backend().clips.len(), 1);
    }
}
