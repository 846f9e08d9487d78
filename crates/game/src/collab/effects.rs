use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec3;

/// Audio and particle playback. Fire-and-forget.
pub trait EffectsPlayer: Send {
    fn play_sfx(&mut self, id: u16, volume: f32, position: Option<Vec3>);

    fn play_vfx(&mut self, id: u16, position: Vec3, scale: f32);
}

/// Writes effects to the debug log instead of playing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEffects;

impl EffectsPlayer for LogEffects {
    fn play_sfx(&mut self, id: u16, volume: f32, position: Option<Vec3>) {
        log::debug!("sfx {} volume {:.2} at {:?}", id, volume, position);
    }

    fn play_vfx(&mut self, id: u16, position: Vec3, scale: f32) {
        log::debug!("vfx {} scale {:.2} at {}", id, scale, position);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayedEffect {
    Sfx {
        id: u16,
        volume: f32,
        position: Option<Vec3>,
    },
    Vfx {
        id: u16,
        position: Vec3,
        scale: f32,
    },
}

/// Records played effects into a shared list; clones share the list.
#[derive(Debug, Default, Clone)]
pub struct EffectLog {
    played: Arc<Mutex<Vec<PlayedEffect>>>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<PlayedEffect> {
        std::mem::take(&mut *self.played.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, effect: PlayedEffect) {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(effect);
    }
}

impl EffectsPlayer for EffectLog {
    fn play_sfx(&mut self, id: u16, volume: f32, position: Option<Vec3>) {
        self.push(PlayedEffect::Sfx {
            id,
            volume,
            position,
        });
    }

    fn play_vfx(&mut self, id: u16, position: Vec3, scale: f32) {
        self.push(PlayedEffect::Vfx {
            id,
            position,
            scale,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_log() {
        let log = EffectLog::new();
        let mut player = log.clone();

        player.play_sfx(2, 0.5, None);
        player.play_vfx(3, Vec3::ONE, 2.0);

        let played = log.take();
        assert_eq!(played.len(), 2);
        assert!(matches!(played[0], PlayedEffect::Sfx { id: 2, position: None, .. }));
        assert!(log.take().is_empty());
    }
}
