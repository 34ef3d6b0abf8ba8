//! Playback core integration tests
//!
//! Drives the core the way a host does: commands in, pipeline events in,
//! pipeline commands and state updates out.

use aurora_core::{
    MediaErrorCode, PipelineCommand, PipelineEvent, PlaybackErrorKind, PlaybackStatus, RawTrack,
    RepeatMode, StateUpdate, Track, TrackSource,
};
use aurora_playback::{
    CommandBuffer, PlaybackConfig, PlaybackCore, PlaybackError, SourceResolver,
};
use std::time::{Duration, Instant};

// ===== Test Helpers =====

struct TestResolver;

impl SourceResolver for TestResolver {
    fn resolve(&self, track: &Track) -> aurora_playback::Result<String> {
        if track.path.ends_with(".bad") {
            return Err(PlaybackError::Unresolvable {
                path: track.path.clone(),
                reason: "no handler".into(),
            });
        }
        Ok(format!("test://{}", track.path))
    }
}

fn create_track(id: &str, duration: f64) -> Track {
    RawTrack {
        title: Some(format!("Track {id}")),
        artist: Some("Artist".into()),
        duration: Some(duration),
        ..Default::default()
    }
    .normalize(&format!("/music/{id}.mp3"), id, TrackSource::Local)
}

fn tracks(n: usize) -> Vec<Track> {
    (1..=n).map(|i| create_track(&i.to_string(), 200.0)).collect()
}

fn core() -> PlaybackCore<CommandBuffer> {
    let mut core = PlaybackCore::new(
        PlaybackConfig::default(),
        CommandBuffer::new(),
        Box::new(TestResolver),
    );
    core.pipeline_mut().drain();
    core
}

fn current_title(core: &PlaybackCore<CommandBuffer>) -> String {
    core.current_track().map(|t| t.title.clone()).unwrap_or_default()
}

fn queue_titles(core: &PlaybackCore<CommandBuffer>) -> Vec<String> {
    core.queue().tracks().map(|t| t.title.clone()).collect()
}

// ===== Loading and status =====

#[test]
fn play_all_loads_and_requests_play() {
    let mut core = core();
    core.play_all(tracks(3), 1).unwrap();

    assert_eq!(current_title(&core), "Track 2");
    assert_eq!(core.status(), PlaybackStatus::Loading);
    assert_eq!(
        core.pipeline_mut().drain(),
        vec![
            PipelineCommand::Load {
                url: "test:///music/2.mp3".into()
            },
            PipelineCommand::Play,
        ]
    );

    let updates = core.drain_updates();
    assert!(updates.contains(&StateUpdate::TrackChanged {
        track: create_track("2", 200.0),
        index: 1
    }));
    assert!(updates.contains(&StateUpdate::StatusChanged {
        status: PlaybackStatus::Loading
    }));
}

#[test]
fn play_all_with_no_tracks_is_rejected() {
    let mut core = core();
    assert!(matches!(core.play_all(Vec::new(), 0), Err(PlaybackError::QueueEmpty)));
    assert_eq!(core.status(), PlaybackStatus::Stopped);
}

#[test]
fn pipeline_events_drive_status() {
    let mut core = core();
    core.play_all(tracks(2), 0).unwrap();

    core.handle_event(PipelineEvent::Playing);
    assert_eq!(core.status(), PlaybackStatus::Playing);

    core.handle_event(PipelineEvent::Waiting);
    assert_eq!(core.status(), PlaybackStatus::Loading);

    core.handle_event(PipelineEvent::Playing);
    core.handle_event(PipelineEvent::Pause);
    assert_eq!(core.status(), PlaybackStatus::Paused);
}

#[test]
fn canplay_without_play_request_settles_paused() {
    let mut core = core();
    core.play_all(tracks(2), 0).unwrap();
    core.pause();
    core.handle_event(PipelineEvent::CanPlay);
    assert_eq!(core.status(), PlaybackStatus::Paused);
}

#[test]
fn canplay_with_play_request_keeps_loading() {
    let mut core = core();
    core.play_all(tracks(2), 0).unwrap();
    core.handle_event(PipelineEvent::CanPlay);
    assert_eq!(core.status(), PlaybackStatus::Loading);
}

#[test]
fn toggle_play_pauses_and_resumes() {
    let mut core = core();
    core.play_all(tracks(1), 0).unwrap();
    core.handle_event(PipelineEvent::Playing);
    core.pipeline_mut().drain();

    core.toggle_play();
    assert_eq!(core.pipeline_mut().drain(), vec![PipelineCommand::Pause]);
    core.handle_event(PipelineEvent::Pause);

    core.toggle_play();
    assert_eq!(core.pipeline_mut().drain(), vec![PipelineCommand::Play]);
}

#[test]
fn duration_change_normalizes_nan() {
    let mut core = core();
    core.play_all(tracks(1), 0).unwrap();
    core.handle_event(PipelineEvent::DurationChange { duration: f64::NAN });
    assert_eq!(core.duration(), 0.0);
    assert_eq!(core.progress(), 0.0);
}

// ===== Navigation =====

#[test]
fn next_stops_at_end_without_repeat() {
    let mut core = core();
    core.play_all(tracks(2), 1).unwrap();
    assert!(!core.next());
    assert_eq!(current_title(&core), "Track 2");
}

#[test]
fn next_wraps_with_repeat_all() {
    let mut core = core();
    core.play_all(tracks(2), 1).unwrap();
    core.set_repeat(RepeatMode::All);
    assert!(core.next());
    assert_eq!(core.current_index(), Some(0));
}

#[test]
fn previous_after_threshold_restarts_track() {
    let mut core = core();
    core.play_all(tracks(3), 1).unwrap();
    core.handle_event(PipelineEvent::TimeUpdate { current_time: 5.0 });
    core.pipeline_mut().drain();

    core.previous();

    assert_eq!(core.current_index(), Some(1));
    assert_eq!(core.current_time(), 0.0);
    assert_eq!(
        core.pipeline_mut().drain(),
        vec![PipelineCommand::Seek { position: 0.0 }]
    );
}

#[test]
fn previous_near_start_moves_back() {
    let mut core = core();
    core.play_all(tracks(3), 1).unwrap();
    core.handle_event(PipelineEvent::TimeUpdate { current_time: 1.0 });

    core.previous();

    assert_eq!(core.current_index(), Some(0));
    assert_eq!(current_title(&core), "Track 1");
}

#[test]
fn previous_at_first_entry_restarts_or_wraps() {
    let mut core = core();
    core.play_all(tracks(3), 0).unwrap();
    core.previous();
    assert_eq!(core.current_index(), Some(0));

    core.set_repeat(RepeatMode::All);
    core.previous();
    assert_eq!(core.current_index(), Some(2));
}

#[test]
fn has_next_and_previous_are_true_under_repeat() {
    let mut core = core();
    core.play_all(tracks(1), 0).unwrap();
    assert!(!core.has_next());
    assert!(!core.has_previous());

    core.set_repeat(RepeatMode::One);
    assert!(core.has_next());
    assert!(core.has_previous());
}

// ===== Track end =====

#[test]
fn natural_end_advances() {
    let mut core = core();
    core.play_all(tracks(2), 0).unwrap();
    core.handle_event(PipelineEvent::Ended);
    assert_eq!(current_title(&core), "Track 2");
    assert_eq!(core.status(), PlaybackStatus::Loading);
}

#[test]
fn natural_end_of_queue_stops() {
    let mut core = core();
    core.play_all(tracks(2), 1).unwrap();
    core.handle_event(PipelineEvent::Playing);
    core.handle_event(PipelineEvent::Ended);
    assert_eq!(core.status(), PlaybackStatus::Stopped);
    assert_eq!(core.current_index(), Some(1));
}

#[test]
fn repeat_one_replays_current_track() {
    let mut core = core();
    core.play_all(tracks(2), 0).unwrap();
    core.set_repeat(RepeatMode::One);
    core.handle_event(PipelineEvent::TimeUpdate { current_time: 199.0 });
    core.pipeline_mut().drain();

    core.handle_event(PipelineEvent::Ended);

    assert_eq!(core.current_index(), Some(0));
    assert_eq!(core.current_time(), 0.0);
    assert_eq!(
        core.pipeline_mut().drain(),
        vec![PipelineCommand::Seek { position: 0.0 }, PipelineCommand::Play]
    );
}

// ===== Errors =====

#[test]
fn error_is_categorized_and_auto_skipped_after_grace() {
    let mut core = core();
    core.play_all(tracks(3), 0).unwrap();
    let raised = Instant::now();

    core.handle_event_at(
        PipelineEvent::Error {
            code: MediaErrorCode::Decode,
            message: None,
        },
        raised,
    );
    assert_eq!(core.status(), PlaybackStatus::Stopped);
    let fault = core.fault().unwrap();
    assert_eq!(fault.kind, PlaybackErrorKind::Decode);
    assert_eq!(fault.message, PlaybackErrorKind::Decode.message());

    core.tick(raised + Duration::from_secs(1));
    assert_eq!(core.current_index(), Some(0), "still inside the grace window");

    core.tick(raised + Duration::from_secs(3));
    assert!(core.fault().is_none());
    assert_eq!(core.current_index(), Some(1));
    assert!(core.drain_updates().contains(&StateUpdate::ErrorCleared));
}

#[test]
fn single_entry_queue_does_not_auto_skip() {
    let mut core = core();
    core.play_all(tracks(1), 0).unwrap();
    let raised = Instant::now();
    core.handle_event_at(
        PipelineEvent::Error {
            code: MediaErrorCode::Network,
            message: Some("connection reset".into()),
        },
        raised,
    );

    core.tick(raised + Duration::from_secs(10));

    assert!(core.fault().is_none());
    assert_eq!(core.current_index(), Some(0));
    assert_eq!(core.status(), PlaybackStatus::Stopped);
}

#[test]
fn unresolvable_track_surfaces_unsupported_error() {
    let mut core = core();
    let mut bad = create_track("x", 10.0);
    bad.path = "/music/x.bad".into();

    core.play_all(vec![bad, create_track("y", 10.0)], 0).unwrap();

    assert_eq!(core.fault().unwrap().kind, PlaybackErrorKind::Unsupported);
    assert!(core.pipeline_mut().drain().is_empty());
}

#[test]
fn play_after_error_reloads_track() {
    let mut core = core();
    core.play_all(tracks(1), 0).unwrap();
    core.handle_event(PipelineEvent::Error {
        code: MediaErrorCode::Network,
        message: None,
    });
    core.pipeline_mut().drain();

    core.play();

    let commands = core.pipeline_mut().drain();
    assert!(matches!(commands[0], PipelineCommand::Load { .. }));
    assert!(core.fault().is_none());
}

// ===== Queue operations =====

#[test]
fn add_to_empty_queue_starts_playback() {
    let mut core = core();
    core.add_to_queue(tracks(2));
    assert_eq!(core.current_index(), Some(0));
    assert_eq!(core.status(), PlaybackStatus::Loading);

    core.pipeline_mut().drain();
    core.add_to_queue(vec![create_track("9", 10.0)]);
    assert_eq!(core.current_index(), Some(0));
    assert!(core.pipeline_mut().drain().is_empty());
}

#[test]
fn play_next_inserts_after_current() {
    let mut core = core();
    core.play_all(tracks(3), 0).unwrap();
    core.play_next(create_track("x", 10.0));
    assert_eq!(
        queue_titles(&core),
        vec!["Track 1", "Track x", "Track 2", "Track 3"]
    );
    core.play_later(create_track("y", 10.0));
    assert_eq!(queue_titles(&core).last().unwrap(), "Track y");
}

#[test]
fn play_next_on_empty_queue_plays_immediately() {
    let mut core = core();
    core.play_next(create_track("x", 10.0));
    assert_eq!(current_title(&core), "Track x");
    assert_eq!(core.status(), PlaybackStatus::Loading);
}

#[test]
fn removing_current_plays_successor() {
    let mut core = core();
    core.play_all(tracks(3), 1).unwrap();
    core.remove_from_queue(1).unwrap();
    assert_eq!(current_title(&core), "Track 3");

    core.remove_from_queue(0).unwrap();
    assert_eq!(core.current_index(), Some(0));
    assert_eq!(current_title(&core), "Track 3");
}

#[test]
fn removing_last_entry_clears_player() {
    let mut core = core();
    core.play_all(tracks(1), 0).unwrap();
    core.pipeline_mut().drain();
    core.drain_updates();

    core.remove_from_queue(0).unwrap();

    assert_eq!(core.current_index(), None);
    assert_eq!(core.status(), PlaybackStatus::Stopped);
    assert_eq!(core.pipeline_mut().drain(), vec![PipelineCommand::Unload]);
    assert!(core.drain_updates().contains(&StateUpdate::TrackCleared));
}

#[test]
fn out_of_bounds_queue_operations_fail_without_side_effects() {
    let mut core = core();
    core.play_all(tracks(2), 0).unwrap();
    assert!(core.remove_from_queue(5).is_err());
    assert!(core.move_in_queue(0, 5).is_err());
    assert!(core.play_from_queue(2).is_err());
    assert_eq!(core.queue().len(), 2);
    assert_eq!(core.current_index(), Some(0));
}

#[test]
fn move_round_trip_keeps_current_track() {
    let mut core = core();
    core.play_all(tracks(5), 2).unwrap();
    let before = queue_titles(&core);

    core.move_in_queue(0, 4).unwrap();
    assert_eq!(current_title(&core), "Track 3");
    core.move_in_queue(4, 0).unwrap();

    assert_eq!(queue_titles(&core), before);
    assert_eq!(core.current_index(), Some(2));
}

#[test]
fn clear_queue_unloads() {
    let mut core = core();
    core.play_all(tracks(3), 0).unwrap();
    core.clear_queue();
    assert!(core.queue().is_empty());
    assert_eq!(core.current_track(), None);
    core.play();
    assert_eq!(core.status(), PlaybackStatus::Stopped);
}

// ===== Shuffle, volume =====

#[test]
fn shuffle_round_trip_preserves_order_and_current() {
    let mut core = core();
    core.play_all(tracks(10), 4).unwrap();
    let before = queue_titles(&core);

    core.toggle_shuffle();
    assert_eq!(core.current_index(), Some(0));
    assert_eq!(current_title(&core), "Track 5");

    core.toggle_shuffle();
    assert_eq!(queue_titles(&core), before);
    assert_eq!(core.current_index(), Some(4));
}

#[test]
fn play_all_with_shuffle_on_starts_with_chosen_track() {
    let config = PlaybackConfig {
        shuffle: true,
        ..Default::default()
    };
    let mut core = PlaybackCore::new(config, CommandBuffer::new(), Box::new(TestResolver));
    core.play_all(tracks(8), 5).unwrap();

    assert_eq!(core.current_index(), Some(0));
    assert_eq!(current_title(&core), "Track 6");
    assert!(core.queue().is_shuffled());
}

fn shuffled_core() -> PlaybackCore<CommandBuffer> {
    let config = PlaybackConfig {
        shuffle: true,
        ..Default::default()
    };
    PlaybackCore::new(config, CommandBuffer::new(), Box::new(TestResolver))
}

#[test]
fn add_to_empty_queue_with_shuffle_on_shuffles() {
    let mut core = shuffled_core();
    let input = tracks(20);
    let titles: Vec<String> = input.iter().map(|t| t.title.clone()).collect();
    core.add_to_queue(input);

    assert!(core.queue().is_shuffled());
    assert_eq!(current_title(&core), "Track 1");
    assert_eq!(core.status(), PlaybackStatus::Loading);
    assert_ne!(queue_titles(&core), titles);

    core.set_shuffle(false);
    assert_eq!(queue_titles(&core), titles);
    assert_eq!(core.current_index(), Some(0));
}

#[test]
fn single_track_start_with_shuffle_on_keeps_insertion_order() {
    let mut core = shuffled_core();
    core.play_next(create_track("x", 10.0));
    assert!(core.queue().is_shuffled());
    assert_eq!(current_title(&core), "Track x");

    core.play_later(create_track("y", 10.0));
    core.play_later(create_track("z", 10.0));
    core.set_shuffle(false);
    assert_eq!(queue_titles(&core), vec!["Track x", "Track y", "Track z"]);
    assert_eq!(current_title(&core), "Track x");
}

#[test]
fn raising_volume_unmutes() {
    let mut core = core();
    core.toggle_mute();
    assert!(core.is_muted());

    core.set_volume(1.7);
    assert_eq!(core.volume(), 1.0);
    assert!(!core.is_muted());
    assert_eq!(
        core.pipeline_mut().drain(),
        vec![
            PipelineCommand::SetMuted { muted: true },
            PipelineCommand::SetVolume { volume: 1.0 },
            PipelineCommand::SetMuted { muted: false },
        ]
    );
}

#[test]
fn seek_is_clamped_to_track() {
    let mut core = core();
    core.play_all(tracks(1), 0).unwrap();
    core.seek(500.0);
    assert_eq!(core.current_time(), 200.0);
    core.seek(-3.0);
    assert_eq!(core.current_time(), 0.0);
    core.seek_percent(50.0);
    assert_eq!(core.current_time(), 100.0);
}

#[test]
fn commands_dispatch_through_apply() {
    use aurora_core::PlaybackCommand;

    let mut core = core();
    core.apply(PlaybackCommand::PlayAll {
        tracks: tracks(3),
        start_index: 0,
    })
    .unwrap();
    core.apply(PlaybackCommand::Next).unwrap();
    core.apply(PlaybackCommand::CycleRepeat).unwrap();
    core.apply(PlaybackCommand::SeekBy { offset: 12.0 }).unwrap();

    assert_eq!(core.current_index(), Some(1));
    assert_eq!(core.repeat(), RepeatMode::All);
    assert_eq!(core.current_time(), 12.0);

    let snapshot = core.snapshot();
    assert_eq!(snapshot.queue.len(), 3);
    assert!((snapshot.progress - 6.0).abs() < 1e-9);
    assert!(core
        .apply(PlaybackCommand::RemoveFromQueue { index: 9 })
        .is_err());
}
