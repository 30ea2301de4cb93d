//! Config files, replay sessions and recorder exports on disk


use gesture_control::config::{Config, EXAMPLE_CONFIG};
use gesture_control::data::SessionRecorder;
use gesture_control::fingers::ThumbRule;
use gesture_control::orchestrator::NullSink;
use gesture_control::tracking::{FrameFeed, LandmarkSource, ReplayTracker, SimStep, SimulatedTracker};
use gesture_control::{Error, FrameOrchestrator, Gesture, TrackingFrame};
use std::io::Cursor;
use test_helpers::{frame_for, scratch_dir, truncated_hand};

#[test]
fn test_config_file_round_trip() {
    let dir = scratch_dir("config");
    let path = dir.join("config.json");

    let mut config = Config::default();
    config.classifier.thumb_rule = ThumbRule::Handedness;
    config.smoothing.enabled = true;
    config.session.output_directory = dir.join("sessions");
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_invalid_config_file_rejected() {
    let dir = scratch_dir("bad_config");

    let malformed = dir.join("malformed.json");
    std::fs::write(&malformed, "{ not json").unwrap();
    assert!(matches!(Config::from_file(&malformed), Err(Error::Config(_))));

    let out_of_range = dir.join("range.json");
    std::fs::write(&out_of_range, r#"{ "tracking": { "target_fps": 0 } }"#).unwrap();
    assert!(matches!(Config::from_file(&out_of_range), Err(Error::Config(_))));

    assert!(matches!(Config::from_file(dir.join("missing.json")), Err(Error::Io(_))));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_example_config_loads_from_disk() {
    let dir = scratch_dir("example");
    let path = dir.join("gesture_control.json");
    std::fs::write(&path, EXAMPLE_CONFIG).unwrap();
    assert!(Config::from_file(&path).is_ok());
    std::fs::remove_dir_all(&dir).ok();
}

fn replay_lines(frames: &[TrackingFrame]) -> String {
    frames
        .iter()
        .map(|f| serde_json::to_string(f).unwrap())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[test]
fn test_replay_reads_recorded_frames() {
    let frames = vec![
        frame_for(Gesture::OpenPalm),
        TrackingFrame::empty(0.5),
        frame_for(Gesture::Fist),
    ];
    let mut replay = ReplayTracker::from_reader(Cursor::new(replay_lines(&frames)));

    let mut orchestrator = FrameOrchestrator::default();
    let mut read = Vec::new();
    while let Some(frame) = replay.next_frame().unwrap() {
        let report = orchestrator.process_frame(&frame).unwrap();
        read.push((frame.timestamp, frame.hands.len(), report.gesture()));
    }
    assert_eq!(
        read,
        vec![(0.0, 1, Gesture::OpenPalm), (0.5, 0, Gesture::None), (0.0, 1, Gesture::Fist)]
    );
}

#[test]
fn test_replay_reports_bad_line() {
    let text = format!("{}\nnot a frame\n", serde_json::to_string(&frame_for(Gesture::Fist)).unwrap());
    let mut replay = ReplayTracker::from_reader(Cursor::new(text));

    assert!(replay.next_frame().unwrap().is_some());
    match replay.next_frame() {
        Err(Error::Tracker(message)) => assert!(message.contains("line 2")),
        other => panic!("expected tracker error, got {:?}", other),
    }
}

#[test]
fn test_replay_from_file_through_feed() {
    let dir = scratch_dir("replay");
    let path = dir.join("session.jsonl");
    let frames: Vec<TrackingFrame> = [Gesture::Fist, Gesture::Pinch, Gesture::PeaceSign]
        .into_iter()
        .map(frame_for)
        .collect();
    std::fs::write(&path, replay_lines(&frames)).unwrap();

    let source = ReplayTracker::from_path(&path).unwrap();
    let feed = FrameFeed::spawn(Box::new(source), 0);
    let mut orchestrator = FrameOrchestrator::default();
    let mut gestures = Vec::new();
    while let Some(frame) = feed.recv() {
        gestures.push(orchestrator.process_and_dispatch(&frame, &mut NullSink).unwrap().gesture());
    }

    assert_eq!(gestures, vec![Gesture::Fist, Gesture::Pinch, Gesture::PeaceSign]);
    assert!(!orchestrator.state().audio_playing);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_missing_replay_file() {
    assert!(matches!(
        ReplayTracker::from_path("/nonexistent/session.jsonl"),
        Err(Error::Tracker(_))
    ));
}

#[test]
fn test_simulated_session_is_bounded_once() {
    let script = vec![
        SimStep { gesture: Some(Gesture::Fist), frames: 3 },
        SimStep { gesture: None, frames: 2 },
    ];
    let mut tracker = SimulatedTracker::new(script, 30).once();

    let mut hands = Vec::new();
    while let Some(frame) = tracker.next_frame().unwrap() {
        hands.push(frame.hands.len());
    }
    assert_eq!(hands, vec![1, 1, 1, 0, 0]);
}

#[test]
fn test_recorder_exports_csv_and_report() {
    let dir = scratch_dir("recorder");
    let mut recorder = SessionRecorder::new(&dir, Some("test_session".to_string()));
    let mut orchestrator = FrameOrchestrator::default();

    for gesture in [Gesture::OpenPalm, Gesture::Fist, Gesture::Fist, Gesture::None] {
        let report = orchestrator.process_frame(&frame_for(gesture)).unwrap();
        recorder.record(&report, orchestrator.state());
    }
    let bad = TrackingFrame::with_hand(2.0, truncated_hand(19));
    assert!(orchestrator.process_frame(&bad).is_err());
    recorder.record_dropped(bad.timestamp, bad.hands.len(), orchestrator.state());

    let csv_path = recorder.export_csv().unwrap();
    assert_eq!(csv_path, dir.join("test_session").join("gestures.csv"));

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "frame");
    let gesture_col = headers.iter().position(|h| h == "gesture").unwrap();
    let dropped_col = headers.iter().position(|h| h == "dropped").unwrap();

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(&rows[0][gesture_col], "OpenPalm");
    assert_eq!(&rows[2][gesture_col], "Fist");
    assert_eq!(&rows[4][dropped_col], "true");
    assert_eq!(&rows[4][gesture_col], "");

    let report_path = recorder.generate_report().unwrap();
    let html = std::fs::read_to_string(report_path).unwrap();
    assert!(html.contains("Total frames: 5"));
    assert!(html.contains("<td>Fist</td><td>2</td>"));

    std::fs::remove_dir_all(&dir).ok();
}
