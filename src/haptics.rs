//! Rumble patterns and the pulse scheduler
//!
//! Most patterns are a single pulse. Level-up plays a staggered sequence; its
//! later pulses are held with a due time and released by `poll` against the
//! host clock.

use crate::platform::Pulse;
use crate::sim::Haptic;

/// Pause between pulses of a sequence
pub const SEQUENCE_GAP_MS: f64 = 50.0;

const fn pulse(duration_ms: u32, weak: f32, strong: f32) -> Pulse {
    Pulse {
        duration_ms,
        weak,
        strong,
    }
}

const SHOOT: [Pulse; 1] = [pulse(50, 0.1, 0.2)];
const HIT: [Pulse; 1] = [pulse(200, 0.3, 0.5)];
const EXPLOSION: [Pulse; 1] = [pulse(400, 0.6, 0.8)];
const DAMAGE: [Pulse; 1] = [pulse(300, 0.4, 0.7)];
const POWER_UP: [Pulse; 1] = [pulse(150, 0.2, 0.3)];
const LEVEL_UP: [Pulse; 3] = [
    pulse(100, 0.3, 0.5),
    pulse(100, 0.4, 0.6),
    pulse(200, 0.5, 0.8),
];
const BOMB: [Pulse; 1] = [pulse(500, 0.7, 1.0)];

/// Pulses making up a pattern, played back to back with `SEQUENCE_GAP_MS`
pub fn pattern(haptic: Haptic) -> &'static [Pulse] {
    match haptic {
        Haptic::Shoot => &SHOOT,
        Haptic::Hit => &HIT,
        Haptic::Explosion => &EXPLOSION,
        Haptic::Damage => &DAMAGE,
        Haptic::PowerUp => &POWER_UP,
        Haptic::LevelUp => &LEVEL_UP,
        Haptic::Bomb => &BOMB,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingPulse {
    due_ms: f64,
    pulse: Pulse,
}

/// Releases pattern pulses when they fall due
#[derive(Debug, Default)]
pub struct HapticScheduler {
    pending: Vec<PendingPulse>,
}

impl HapticScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a pattern starting at `now_ms`
    pub fn trigger(&mut self, haptic: Haptic, now_ms: f64) {
        let mut due_ms = now_ms;
        for &pulse in pattern(haptic) {
            self.pending.push(PendingPulse { due_ms, pulse });
            due_ms += pulse.duration_ms as f64 + SEQUENCE_GAP_MS;
        }
    }

    /// Pulses due at `now_ms`, in the order they were scheduled
    pub fn poll(&mut self, now_ms: f64) -> Vec<Pulse> {
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now_ms {
                due.push(p.pulse);
                false
            } else {
                true
            }
        });
        due
    }

    /// Drop anything still waiting (vibration turned off, session ended)
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Device vibration through `navigator.vibrate`
#[cfg(target_arch = "wasm32")]
pub struct NavigatorVibration {
    navigator: Option<web_sys::Navigator>,
}

#[cfg(target_arch = "wasm32")]
impl NavigatorVibration {
    pub fn new() -> Self {
        Self {
            navigator: web_sys::window().map(|w| w.navigator()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for NavigatorVibration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl crate::platform::HapticSink for NavigatorVibration {
    fn rumble(&mut self, pulse: Pulse) {
        if let Some(nav) = &self.navigator {
            // false just means the device can't vibrate
            let _ = nav.vibrate_with_duration(pulse.duration_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pulse_fires_immediately() {
        let mut scheduler = HapticScheduler::new();
        scheduler.trigger(Haptic::Damage, 1000.0);
        let pulses = scheduler.poll(1000.0);
        assert_eq!(pulses, vec![pulse(300, 0.4, 0.7)]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_level_up_is_staggered() {
        let mut scheduler = HapticScheduler::new();
        scheduler.trigger(Haptic::LevelUp, 0.0);

        assert_eq!(scheduler.poll(0.0).len(), 1);
        assert!(scheduler.poll(149.0).is_empty());
        assert_eq!(scheduler.poll(150.0), vec![pulse(100, 0.4, 0.6)]);
        assert!(scheduler.poll(299.0).is_empty());
        assert_eq!(scheduler.poll(300.0), vec![pulse(200, 0.5, 0.8)]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_late_poll_releases_everything_in_order() {
        let mut scheduler = HapticScheduler::new();
        scheduler.trigger(Haptic::LevelUp, 0.0);
        let pulses = scheduler.poll(10_000.0);
        let durations: Vec<u32> = pulses.iter().map(|p| p.duration_ms).collect();
        assert_eq!(durations, vec![100, 100, 200]);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut scheduler = HapticScheduler::new();
        scheduler.trigger(Haptic::LevelUp, 0.0);
        scheduler.poll(0.0);
        scheduler.clear();
        assert!(scheduler.poll(1000.0).is_empty());
    }
}
