//! One-shot scrobble threshold tracking

use super::Listen;
use aurora_core::{PlaybackStatus, StateUpdate};
use chrono::{DateTime, Utc};

/// Upper bound of the scrobble threshold, in seconds
pub const MAX_SCROBBLE_THRESHOLD: f64 = 240.0;
/// Position jumps larger than this are seeks, not playback
pub const MAX_TICK: f64 = 5.0;

/// `min(duration / 2, 240 s)`; `None` until a positive duration is known
pub fn scrobble_threshold(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then(|| (duration * 0.5).min(MAX_SCROBBLE_THRESHOLD))
}

/// What a scrobble service should be told
#[derive(Debug, Clone, PartialEq)]
pub enum ScrobbleSignal {
    NowPlaying(Listen),
    Scrobble(Listen),
}

/// Accumulates real playback time for the loaded track
///
/// Only forward position steps of at most [`MAX_TICK`] while playing count,
/// so seeking never earns a scrobble. The scrobble flag is reset on every
/// track change and nothing else. A track loaded without a duration takes
/// its threshold from the first position update that reports one.
#[derive(Debug, Default)]
pub struct ScrobbleTracker {
    listen: Option<Listen>,
    threshold: Option<f64>,
    played: f64,
    last_position: Option<f64>,
    playing: bool,
    scrobbled: bool,
}

impl ScrobbleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, update: &StateUpdate, now: DateTime<Utc>) -> Option<ScrobbleSignal> {
        match update {
            StateUpdate::TrackChanged { track, .. } => {
                let listen = Listen::from_track(track, now);
                self.threshold = scrobble_threshold(listen.duration);
                self.listen = Some(listen.clone());
                self.played = 0.0;
                self.last_position = None;
                self.scrobbled = false;
                return Some(ScrobbleSignal::NowPlaying(listen));
            }
            StateUpdate::TrackCleared => {
                *self = Self {
                    playing: self.playing,
                    ..Self::default()
                };
            }
            StateUpdate::StatusChanged { status } => {
                self.playing = *status == PlaybackStatus::Playing;
            }
            StateUpdate::Seeked { position } => self.last_position = Some(*position),
            StateUpdate::Position {
                current_time,
                duration,
            } => {
                if self.threshold.is_none() {
                    self.adopt_duration(*duration);
                }
                if self.playing {
                    if let Some(last) = self.last_position {
                        let step = current_time - last;
                        if step > 0.0 && step <= MAX_TICK {
                            self.played += step;
                        }
                    }
                }
                self.last_position = Some(*current_time);
            }
            _ => {}
        }

        if self.scrobbled || !self.threshold.is_some_and(|t| self.played >= t) {
            return None;
        }
        self.scrobbled = true;
        self.listen.clone().map(ScrobbleSignal::Scrobble)
    }

    fn adopt_duration(&mut self, duration: f64) {
        let Some(listen) = self.listen.as_mut() else {
            return;
        };
        if let Some(threshold) = scrobble_threshold(duration) {
            listen.duration = duration;
            self.threshold = Some(threshold);
        }
    }

    /// Seconds of real playback accumulated for the current track
    pub fn played(&self) -> f64 {
        self.played
    }

    pub fn is_scrobbled(&self) -> bool {
        self.scrobbled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_core::{RawTrack, Track, TrackSource};

    fn track(duration: f64) -> Track {
        RawTrack {
            title: Some("Song".into()),
            duration: Some(duration),
            ..Default::default()
        }
        .normalize("/music/song.mp3", "song", TrackSource::Local)
    }

    fn load(tracker: &mut ScrobbleTracker, duration: f64) {
        let signal = tracker.observe(
            &StateUpdate::TrackChanged {
                track: track(duration),
                index: 0,
            },
            Utc::now(),
        );
        assert!(matches!(signal, Some(ScrobbleSignal::NowPlaying(_))));
        tracker.observe(
            &StateUpdate::StatusChanged {
                status: PlaybackStatus::Playing,
            },
            Utc::now(),
        );
    }

    fn tick(tracker: &mut ScrobbleTracker, current_time: f64) -> Option<ScrobbleSignal> {
        tracker.observe(
            &StateUpdate::Position {
                current_time,
                duration: 0.0,
            },
            Utc::now(),
        )
    }

    #[test]
    fn threshold_is_half_capped_at_four_minutes() {
        assert_eq!(scrobble_threshold(200.0), Some(100.0));
        assert_eq!(scrobble_threshold(1200.0), Some(240.0));
        assert_eq!(scrobble_threshold(0.0), None);
        assert_eq!(scrobble_threshold(f64::NAN), None);
    }

    #[test]
    fn scrobbles_exactly_once_past_threshold() {
        let mut tracker = ScrobbleTracker::new();
        load(&mut tracker, 200.0);

        let mut scrobbles = 0;
        for second in 0..=180 {
            if let Some(ScrobbleSignal::Scrobble(_)) = tick(&mut tracker, f64::from(second)) {
                scrobbles += 1;
                assert_eq!(second, 100);
            }
        }
        assert_eq!(scrobbles, 1);
    }

    #[test]
    fn seeking_past_threshold_does_not_scrobble() {
        let mut tracker = ScrobbleTracker::new();
        load(&mut tracker, 200.0);
        tick(&mut tracker, 0.0);
        tracker.observe(&StateUpdate::Seeked { position: 150.0 }, Utc::now());

        for t in [150.0, 151.0, 152.0, 190.0] {
            assert_eq!(tick(&mut tracker, t), None);
        }
        assert_eq!(tracker.played(), 2.0);
    }

    #[test]
    fn paused_time_does_not_count() {
        let mut tracker = ScrobbleTracker::new();
        load(&mut tracker, 100.0);
        tick(&mut tracker, 0.0);
        tick(&mut tracker, 1.0);
        tracker.observe(
            &StateUpdate::StatusChanged {
                status: PlaybackStatus::Paused,
            },
            Utc::now(),
        );
        tick(&mut tracker, 2.0);
        assert_eq!(tracker.played(), 1.0);
    }

    #[test]
    fn zero_duration_never_scrobbles() {
        let mut tracker = ScrobbleTracker::new();
        load(&mut tracker, 0.0);
        for second in 0..600 {
            assert_eq!(tick(&mut tracker, f64::from(second)), None);
        }
    }

    #[test]
    fn pipeline_duration_sets_missing_threshold() {
        let mut tracker = ScrobbleTracker::new();
        load(&mut tracker, 0.0);

        let mut scrobbled = Vec::new();
        for second in 0..=150 {
            let signal = tracker.observe(
                &StateUpdate::Position {
                    current_time: f64::from(second),
                    duration: 200.0,
                },
                Utc::now(),
            );
            if let Some(ScrobbleSignal::Scrobble(listen)) = signal {
                scrobbled.push((second, listen.duration));
            }
        }
        assert_eq!(scrobbled, vec![(100, 200.0)]);
    }

    #[test]
    fn pipeline_duration_does_not_override_track_duration() {
        let mut tracker = ScrobbleTracker::new();
        load(&mut tracker, 20.0);
        let mut first = None;
        for second in 0..=30 {
            let signal = tracker.observe(
                &StateUpdate::Position {
                    current_time: f64::from(second),
                    duration: 200.0,
                },
                Utc::now(),
            );
            if first.is_none() && signal.is_some() {
                first = Some(second);
            }
        }
        assert_eq!(first, Some(10));
    }

    #[test]
    fn new_track_resets_flag() {
        let mut tracker = ScrobbleTracker::new();
        load(&mut tracker, 10.0);
        for second in 0..=6 {
            tick(&mut tracker, f64::from(second));
        }
        assert!(tracker.is_scrobbled());

        load(&mut tracker, 10.0);
        assert!(!tracker.is_scrobbled());
        assert_eq!(tracker.played(), 0.0);
    }
}
