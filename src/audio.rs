//! Procedural sound effects
//!
//! Every sound is one or more oscillator voices with an exponential decay
//! envelope; no sample files. The voice table is plain data so it can be
//! inspected natively, while playback goes through the Web Audio API on wasm.

use crate::sim::Sound;

/// Envelope start level at full volume
pub const PEAK_GAIN: f32 = 0.1;
/// Exponential ramps cannot reach zero; decay stops here
pub const FLOOR_GAIN: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator in a sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub freq: f32,
    /// Pitch reached by the end of the envelope, if it slides
    pub sweep_to: Option<f32>,
    /// Seconds
    pub duration: f32,
    /// Relative loudness within the sound
    pub gain: f32,
}

const fn voice(waveform: Waveform, freq: f32, duration: f32) -> Voice {
    Voice {
        waveform,
        freq,
        sweep_to: None,
        duration,
        gain: 1.0,
    }
}

const SHOOT: [Voice; 1] = [voice(Waveform::Square, 800.0, 0.1)];
const ENEMY_HIT: [Voice; 1] = [voice(Waveform::Sawtooth, 300.0, 0.2)];
const EXPLOSION: [Voice; 2] = [
    voice(Waveform::Square, 150.0, 0.5),
    Voice {
        waveform: Waveform::Sine,
        freq: 60.0,
        sweep_to: Some(30.0),
        duration: 0.3,
        gain: 0.8,
    },
];
const POWER_UP: [Voice; 1] = [Voice {
    waveform: Waveform::Sine,
    freq: 1000.0,
    sweep_to: Some(1500.0),
    duration: 0.3,
    gain: 1.0,
}];
const PLAYER_HIT: [Voice; 1] = [voice(Waveform::Triangle, 200.0, 0.8)];
const BOMB: [Voice; 2] = [
    Voice {
        waveform: Waveform::Sawtooth,
        freq: 120.0,
        sweep_to: Some(30.0),
        duration: 0.7,
        gain: 1.0,
    },
    voice(Waveform::Sine, 45.0, 0.9),
];

/// Voices making up a sound effect
pub fn voices(sound: Sound) -> &'static [Voice] {
    match sound {
        Sound::Shoot => &SHOOT,
        Sound::EnemyHit => &ENEMY_HIT,
        Sound::Explosion => &EXPLOSION,
        Sound::PowerUp => &POWER_UP,
        Sound::PlayerHit => &PLAYER_HIT,
        Sound::Bomb => &BOMB,
    }
}

/// Longest voice in a sound (seconds)
pub fn duration(sound: Sound) -> f32 {
    voices(sound)
        .iter()
        .map(|v| v.duration)
        .fold(0.0, f32::max)
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{FLOOR_GAIN, PEAK_GAIN, Voice, Waveform, voices};
    use crate::platform::AudioSink;
    use crate::sim::Sound;

    fn oscillator_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }

    /// Web Audio backend
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 1.0 }
        }

        /// Create an oscillator wired through its own gain node
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_voice(ctx: &AudioContext, voice: &Voice, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, voice.freq, oscillator_type(voice.waveform))
            else {
                return;
            };
            let t = ctx.current_time();
            let end = t + voice.duration as f64;

            gain.gain()
                .set_value_at_time(PEAK_GAIN * voice.gain * vol, t)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(FLOOR_GAIN, end)
                .ok();
            if let Some(to) = voice.sweep_to {
                osc.frequency().set_value_at_time(voice.freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to, end)
                    .ok();
            }

            osc.start().ok();
            osc.stop_with_when(end).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, sound: Sound) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for voice in voices(sound) {
                Self::play_voice(ctx, voice, self.volume);
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        fn resume(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Sound; 6] = [
        Sound::Shoot,
        Sound::EnemyHit,
        Sound::Explosion,
        Sound::PowerUp,
        Sound::PlayerHit,
        Sound::Bomb,
    ];

    #[test]
    fn test_every_sound_has_audible_voices() {
        for sound in ALL {
            let vs = voices(sound);
            assert!(!vs.is_empty(), "{} has no voices", sound.name());
            for v in vs {
                assert!(v.freq > 0.0);
                assert!(v.duration > 0.0);
                assert!(v.sweep_to.is_none_or(|f| f > 0.0));
                assert!(PEAK_GAIN * v.gain > FLOOR_GAIN);
            }
        }
    }

    #[test]
    fn test_shoot_is_short_square_blip() {
        assert_eq!(voices(Sound::Shoot)[0].waveform, Waveform::Square);
        assert_eq!(voices(Sound::Shoot)[0].freq, 800.0);
        assert!(duration(Sound::Shoot) < duration(Sound::PlayerHit));
        assert_eq!(duration(Sound::Explosion), 0.5);
    }
}
