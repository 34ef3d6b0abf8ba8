//! Playback core - queue, transport and pipeline state machine
//!
//! The core owns the single logical player. Commands mutate the queue and
//! send [`PipelineCommand`]s; pipeline events drive the status machine:
//!
//! ```text
//!            load                 playing
//! Stopped ─────────▶ Loading ─────────────▶ Playing
//!    ▲                 │  ▲                  │   ▲
//!    │ error / end     │  │ waiting    pause │   │ playing
//!    │                 ▼  │                  ▼   │
//!    └──────────────── Paused ◀──────────────────┘
//!                    (canplay without a play request)
//! ```
//!
//! Every transition is recorded as a [`StateUpdate`]; the owner drains them
//! with [`PlaybackCore::drain_updates`] and fans them out.

use crate::error::{PlaybackError, Result};
use crate::pipeline::{AudioPipeline, SourceResolver};
use crate::queue::{PlayQueue, QueueEntry};
use crate::types::{PlaybackConfig, PlaybackFault, PlaybackSnapshot};
use aurora_core::types::normalize_duration;
use aurora_core::{
    PipelineCommand, PipelineEvent, PlaybackCommand, PlaybackErrorKind, PlaybackStatus,
    RepeatMode, StateUpdate, Track,
};
use std::time::Instant;
use tracing::{debug, warn};

struct ActiveFault {
    fault: PlaybackFault,
    raised_at: Instant,
}

/// Single-owner playback state machine
pub struct PlaybackCore<P: AudioPipeline> {
    queue: PlayQueue,
    status: PlaybackStatus,
    /// Whether the pipeline should be playing once it can
    play_requested: bool,
    /// Whether the pipeline holds the current track
    loaded: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    shuffle: bool,
    repeat: RepeatMode,
    fault: Option<ActiveFault>,
    config: PlaybackConfig,
    pipeline: P,
    resolver: Box<dyn SourceResolver>,
    pending_updates: Vec<StateUpdate>,
}

impl<P: AudioPipeline> PlaybackCore<P> {
    pub fn new(config: PlaybackConfig, mut pipeline: P, resolver: Box<dyn SourceResolver>) -> Self {
        pipeline.send(PipelineCommand::SetVolume {
            volume: config.volume,
        });
        pipeline.send(PipelineCommand::SetMuted {
            muted: config.muted,
        });

        Self {
            queue: PlayQueue::new(),
            status: PlaybackStatus::Stopped,
            play_requested: false,
            loaded: false,
            current_time: 0.0,
            duration: 0.0,
            volume: config.volume,
            muted: config.muted,
            shuffle: config.shuffle,
            repeat: config.repeat,
            fault: None,
            config,
            pipeline,
            resolver,
            pending_updates: Vec::new(),
        }
    }

    // ===== Commands =====

    /// Dispatch a boundary command
    pub fn apply(&mut self, command: PlaybackCommand) -> Result<()> {
        debug!(?command, "Playback command");
        match command {
            PlaybackCommand::PlayAll {
                tracks,
                start_index,
            } => self.play_all(tracks, start_index)?,
            PlaybackCommand::AddToQueue { tracks } => self.add_to_queue(tracks),
            PlaybackCommand::PlayNext { track } => self.play_next(track),
            PlaybackCommand::PlayLater { track } => self.play_later(track),
            PlaybackCommand::RemoveFromQueue { index } => self.remove_from_queue(index)?,
            PlaybackCommand::MoveInQueue { from, to } => self.move_in_queue(from, to)?,
            PlaybackCommand::PlayFromQueue { index } => self.play_from_queue(index)?,
            PlaybackCommand::ClearQueue => self.clear_queue(),
            PlaybackCommand::Play => self.play(),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::TogglePlay => self.toggle_play(),
            PlaybackCommand::Stop => self.stop(),
            PlaybackCommand::Next => {
                self.next();
            }
            PlaybackCommand::Previous => self.previous(),
            PlaybackCommand::Seek { position } => self.seek(position),
            PlaybackCommand::SeekBy { offset } => self.seek(self.current_time + offset),
            PlaybackCommand::SeekPercent { percent } => self.seek_percent(percent),
            PlaybackCommand::SetVolume { volume } => self.set_volume(volume),
            PlaybackCommand::ToggleMute => self.toggle_mute(),
            PlaybackCommand::ToggleShuffle => self.toggle_shuffle(),
            PlaybackCommand::SetShuffle { enabled } => self.set_shuffle(enabled),
            PlaybackCommand::CycleRepeat => self.cycle_repeat(),
            PlaybackCommand::SetRepeat { mode } => self.set_repeat(mode),
        }
        Ok(())
    }

    // ===== Queue =====

    /// Replace the queue and start playing at `start_index`
    ///
    /// With shuffle on, the new queue is shuffled around the start track.
    pub fn play_all(&mut self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        if tracks.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        self.start_queue(tracks, start_index);
        Ok(())
    }

    /// Every path that builds a fresh queue goes through here
    fn start_queue(&mut self, tracks: Vec<Track>, start_index: usize) {
        self.queue.replace(tracks, start_index);
        if self.shuffle {
            self.queue.shuffle(&mut rand::thread_rng());
        }
        self.emit_queue_changed();
        self.load_current(true);
    }

    /// Append tracks; starts playback if nothing was queued
    pub fn add_to_queue(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        if self.queue.is_empty() {
            self.start_queue(tracks, 0);
            return;
        }
        self.queue.append(tracks);
        self.emit_queue_changed();
    }

    /// Insert right after the current track
    pub fn play_next(&mut self, track: Track) {
        if self.queue.is_empty() {
            self.start_single(track);
            return;
        }
        self.queue.insert_after_current(track);
        self.emit_queue_changed();
    }

    /// Append to the end of the queue
    pub fn play_later(&mut self, track: Track) {
        if self.queue.is_empty() {
            self.start_single(track);
            return;
        }
        self.queue.append(vec![track]);
        self.emit_queue_changed();
    }

    fn start_single(&mut self, track: Track) {
        self.start_queue(vec![track], 0);
    }

    /// Remove an entry; removing the current one plays its successor
    pub fn remove_from_queue(&mut self, index: usize) -> Result<()> {
        let removed = self.queue.remove(index)?;
        self.emit_queue_changed();

        if removed.was_current {
            if self.queue.is_empty() {
                self.unload();
            } else {
                self.load_current(true);
            }
        }
        Ok(())
    }

    /// Reorder; the current track keeps playing
    pub fn move_in_queue(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.move_entry(from, to)?;
        self.emit_queue_changed();
        Ok(())
    }

    /// Jump to a queue entry and play it
    pub fn play_from_queue(&mut self, index: usize) -> Result<()> {
        self.queue.select(index)?;
        self.load_current(true);
        Ok(())
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit_queue_changed();
        self.unload();
    }

    // ===== Transport =====

    pub fn play(&mut self) {
        if self.queue.current().is_none() {
            return;
        }
        if !self.loaded {
            self.load_current(true);
            return;
        }
        self.play_requested = true;
        self.pipeline.send(PipelineCommand::Play);
    }

    pub fn pause(&mut self) {
        if !self.loaded {
            return;
        }
        self.play_requested = false;
        self.pipeline.send(PipelineCommand::Pause);
    }

    pub fn toggle_play(&mut self) {
        let busy = self.status == PlaybackStatus::Playing
            || (self.status == PlaybackStatus::Loading && self.play_requested);
        if busy {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Pause and rewind, keeping the queue
    pub fn stop(&mut self) {
        if !self.loaded {
            return;
        }
        self.play_requested = false;
        self.pipeline.send(PipelineCommand::Pause);
        self.pipeline.send(PipelineCommand::Seek { position: 0.0 });
        self.current_time = 0.0;
        self.set_status(PlaybackStatus::Stopped);
        self.emit_position();
    }

    /// Advance to the next entry; returns whether the cursor moved
    ///
    /// Wraps on repeat-all, otherwise does nothing at the end of the queue.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        match self.queue.advance(self.repeat == RepeatMode::All) {
            Some(_) => {
                self.load_current(true);
                true
            }
            None => false,
        }
    }

    /// Restart the track, or go back one entry when near its start
    ///
    /// More than the restart threshold into the track, this seeks to 0.
    /// Otherwise it moves the cursor back, wrapping on repeat-all, and
    /// restarts the track when already at the first entry.
    pub fn previous(&mut self) {
        if self.current_time > self.config.restart_threshold.as_secs_f64() {
            self.seek(0.0);
            return;
        }
        if self.queue.is_empty() {
            return;
        }
        match self.queue.retreat(self.repeat == RepeatMode::All) {
            Some(_) => self.load_current(true),
            None => self.seek(0.0),
        }
    }

    /// Jump to `position` seconds, clamped to the track
    pub fn seek(&mut self, position: f64) {
        if !self.loaded || !position.is_finite() {
            return;
        }
        let mut position = position.max(0.0);
        if self.duration > 0.0 {
            position = position.min(self.duration);
        }
        self.current_time = position;
        self.pipeline.send(PipelineCommand::Seek { position });
        self.pending_updates.push(StateUpdate::Seeked { position });
    }

    pub fn seek_percent(&mut self, percent: f64) {
        self.seek(percent / 100.0 * self.duration);
    }

    // ===== Volume, shuffle, repeat =====

    /// Set volume (clamped to 0.0 - 1.0); raising it above 0 unmutes
    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.pipeline.send(PipelineCommand::SetVolume {
            volume: self.volume,
        });
        if self.volume > 0.0 && self.muted {
            self.muted = false;
            self.pipeline.send(PipelineCommand::SetMuted { muted: false });
        }
        self.emit_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.pipeline.send(PipelineCommand::SetMuted { muted: self.muted });
        self.emit_volume();
    }

    pub fn toggle_shuffle(&mut self) {
        self.set_shuffle(!self.shuffle);
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.shuffle == enabled {
            return;
        }
        self.shuffle = enabled;
        if enabled {
            self.queue.shuffle(&mut rand::thread_rng());
        } else {
            self.queue.unshuffle();
        }
        self.pending_updates.push(StateUpdate::Shuffle { enabled });
        self.emit_queue_changed();
    }

    pub fn cycle_repeat(&mut self) {
        self.set_repeat(self.repeat.cycle());
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat == mode {
            return;
        }
        self.repeat = mode;
        self.pending_updates.push(StateUpdate::Repeat { mode });
    }

    // ===== Pipeline events =====

    pub fn handle_event(&mut self, event: PipelineEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// Apply a pipeline event observed at `now`
    pub fn handle_event_at(&mut self, event: PipelineEvent, now: Instant) {
        match event {
            PipelineEvent::Playing => {
                self.play_requested = true;
                self.set_status(PlaybackStatus::Playing);
            }
            PipelineEvent::Pause => {
                if self.status != PlaybackStatus::Stopped {
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            PipelineEvent::Waiting => {
                if self.loaded {
                    self.set_status(PlaybackStatus::Loading);
                }
            }
            PipelineEvent::CanPlay => {
                if self.status == PlaybackStatus::Loading && !self.play_requested {
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            PipelineEvent::Ended => self.handle_track_end(),
            PipelineEvent::Error { code, message } => {
                let kind = PlaybackErrorKind::from(code);
                let message = message.unwrap_or_else(|| kind.message().to_string());
                self.raise_fault(kind, message, now);
            }
            PipelineEvent::TimeUpdate { current_time } => {
                if current_time.is_finite() {
                    self.current_time = current_time.max(0.0);
                    self.emit_position();
                }
            }
            PipelineEvent::DurationChange { duration } => {
                self.duration = normalize_duration(Some(duration));
                self.emit_position();
            }
        }
    }

    fn handle_track_end(&mut self) {
        if self.repeat == RepeatMode::One {
            self.current_time = 0.0;
            self.play_requested = true;
            self.pipeline.send(PipelineCommand::Seek { position: 0.0 });
            self.pipeline.send(PipelineCommand::Play);
            self.pending_updates.push(StateUpdate::Seeked { position: 0.0 });
            return;
        }
        if !self.next() {
            self.play_requested = false;
            self.set_status(PlaybackStatus::Stopped);
        }
    }

    /// Drive time-based behavior; call periodically
    ///
    /// Once an error has been visible for the grace window it is cleared and,
    /// if the queue has more than one entry, playback advances.
    pub fn tick(&mut self, now: Instant) {
        let due = self.fault.as_ref().is_some_and(|f| {
            now.saturating_duration_since(f.raised_at) >= self.config.error_grace
        });
        if !due {
            return;
        }
        self.clear_fault();
        if self.queue.len() > 1 {
            debug!("Auto-skipping past failed track");
            self.next();
        }
    }

    // ===== Internals =====

    /// Load the entry under the cursor into the pipeline
    fn load_current(&mut self, autoplay: bool) {
        let Some(QueueEntry { track, .. }) = self.queue.current().cloned() else {
            return;
        };
        let index = self.queue.current_index().unwrap_or_default();

        self.clear_fault();
        self.current_time = 0.0;
        self.duration = track.duration;
        self.pending_updates.push(StateUpdate::TrackChanged {
            track: track.clone(),
            index,
        });

        match self.resolver.resolve(&track) {
            Ok(url) => {
                self.loaded = true;
                self.play_requested = autoplay;
                self.pipeline.send(PipelineCommand::Load { url });
                if autoplay {
                    self.pipeline.send(PipelineCommand::Play);
                }
                self.set_status(PlaybackStatus::Loading);
                self.emit_position();
            }
            Err(e) => {
                warn!(path = %track.path, error = %e, "Cannot load track");
                self.raise_fault(PlaybackErrorKind::Unsupported, e.to_string(), Instant::now());
            }
        }
    }

    fn unload(&mut self) {
        self.clear_fault();
        self.loaded = false;
        self.play_requested = false;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.pipeline.send(PipelineCommand::Unload);
        self.pending_updates.push(StateUpdate::TrackCleared);
        self.set_status(PlaybackStatus::Stopped);
    }

    fn raise_fault(&mut self, kind: PlaybackErrorKind, message: String, now: Instant) {
        warn!(?kind, %message, "Playback error");
        self.loaded = false;
        self.play_requested = false;
        self.set_status(PlaybackStatus::Stopped);
        self.pending_updates.push(StateUpdate::Error {
            kind,
            message: message.clone(),
        });
        self.fault = Some(ActiveFault {
            fault: PlaybackFault { kind, message },
            raised_at: now,
        });
    }

    fn clear_fault(&mut self) {
        if self.fault.take().is_some() {
            self.pending_updates.push(StateUpdate::ErrorCleared);
        }
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            self.status = status;
            self.pending_updates.push(StateUpdate::StatusChanged { status });
        }
    }

    fn emit_position(&mut self) {
        self.pending_updates.push(StateUpdate::Position {
            current_time: self.current_time,
            duration: self.duration,
        });
    }

    fn emit_volume(&mut self) {
        self.pending_updates.push(StateUpdate::Volume {
            volume: self.volume,
            muted: self.muted,
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_updates.push(StateUpdate::QueueChanged {
            length: self.queue.len(),
            current_index: self.queue.current_index(),
        });
    }

    // ===== Updates =====

    /// Take every update recorded since the last drain
    pub fn drain_updates(&mut self) -> Vec<StateUpdate> {
        std::mem::take(&mut self.pending_updates)
    }

    pub fn has_pending_updates(&self) -> bool {
        !self.pending_updates.is_empty()
    }

    // ===== Queries =====

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current_track()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Percentage of the track played (0 when the duration is unknown)
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration * 100.0
        } else {
            0.0
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn fault(&self) -> Option<&PlaybackFault> {
        self.fault.as_ref().map(|f| &f.fault)
    }

    /// Always true while any repeat mode is active
    pub fn has_next(&self) -> bool {
        self.repeat.is_active() || self.queue.has_next()
    }

    /// Always true while any repeat mode is active
    pub fn has_previous(&self) -> bool {
        self.repeat.is_active() || self.queue.has_previous()
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.current_track().cloned(),
            current_index: self.current_index(),
            queue: self.queue.tracks().cloned().collect(),
            status: self.status,
            current_time: self.current_time,
            duration: self.duration,
            progress: self.progress(),
            volume: self.volume,
            muted: self.muted,
            shuffle: self.shuffle,
            repeat: self.repeat,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
            error: self.fault().cloned(),
        }
    }
}
