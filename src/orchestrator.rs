// src/orchestrator.rs - Per-frame glue between tracker, classifier and outputs
use std::sync::{Arc, Mutex};

use crate::classifier::{Classification, Gesture, GestureClassifier};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::landmarks::TrackingFrame;
use crate::output::{
    AudioCommand, FrameCommands, GestureOutputMachine, Overlay, OutputState, OverlayCommand,
    RenderCommand,
};
use crate::smoothing::GestureDebouncer;

/// The collaborators that turn commands into pixels and sound.
pub trait FrameSink {
    fn show_status(&mut self, text: &str);

    /// Malformed frames are reported here, never through the status text.
    fn show_warning(&mut self, _warning: &str) {}

    fn composite_overlay(&mut self, overlay: &OverlayCommand) -> Result<()>;

    fn control_audio(&mut self, command: AudioCommand) -> Result<()>;

    fn render_object(&mut self, render: &RenderCommand) -> Result<()>;
}

/// Discards every command.
pub struct NullSink;

impl FrameSink for NullSink {
    fn show_status(&mut self, _text: &str) {}

    fn composite_overlay(&mut self, _overlay: &OverlayCommand) -> Result<()> {
        Ok(())
    }

    fn control_audio(&mut self, _command: AudioCommand) -> Result<()> {
        Ok(())
    }

    fn render_object(&mut self, _render: &RenderCommand) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub timestamp: f64,
    pub hands_detected: usize,
    /// One entry per classified hand; the first drove the outputs
    pub classifications: Vec<Classification>,
    pub commands: FrameCommands,
}

impl FrameReport {
    pub fn gesture(&self) -> Gesture {
        self.commands.gesture
    }
}

pub struct FrameOrchestrator {
    classifier: GestureClassifier,
    machine: GestureOutputMachine,
    max_hands: usize,
    frames_processed: u64,
    frames_dropped: u64,
    last_warning: Option<String>,
    // Hand count of the current run of over-limit frames
    overflow_hands: Option<usize>,
}

impl FrameOrchestrator {
    pub fn new(config: &Config) -> Self {
        let mut classifier = GestureClassifier::new(config.classifier);
        if config.smoothing.enabled {
            classifier =
                classifier.with_debouncer(GestureDebouncer::new(config.smoothing.min_stable_frames));
        }

        Self {
            classifier,
            machine: GestureOutputMachine::new(config.output.clone()),
            max_hands: config.tracking.max_hands.max(1),
            frames_processed: 0,
            frames_dropped: 0,
            last_warning: None,
            overflow_hands: None,
        }
    }

    pub fn state(&self) -> &OutputState {
        self.machine.state()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.last_warning.as_deref()
    }

    /// Classifies the frame and advances the output state.
    ///
    /// A malformed hand rejects the whole frame before anything is mutated.
    pub fn process_frame(&mut self, frame: &TrackingFrame) -> Result<FrameReport> {
        if self.note_hand_count(frame.hands.len()) {
            tracing::warn!(
                "{} hands in frame, only the first {} are classified",
                frame.hands.len(),
                self.max_hands
            );
        }
        let hands = &frame.hands[..frame.hands.len().min(self.max_hands)];

        if let Err(e) = hands.iter().try_for_each(|hand| hand.validate()) {
            self.frames_dropped += 1;
            let warning = format!("Frame dropped: {}", e);
            tracing::warn!("{}", warning);
            self.last_warning = Some(warning);
            return Err(e);
        }

        let mut classifications = Vec::with_capacity(hands.len());
        let gesture = match hands.split_first() {
            Some((primary, others)) => {
                let primary = self.classifier.classify_hand(primary)?;
                let gesture = primary.gesture;
                classifications.push(primary);
                for hand in others {
                    classifications.push(self.classifier.evaluate(hand)?);
                }
                gesture
            }
            None => self.classifier.no_hand(),
        };

        let commands = self.machine.step(gesture);
        self.frames_processed += 1;
        self.last_warning = None;

        Ok(FrameReport {
            timestamp: frame.timestamp,
            hands_detected: frame.hands.len(),
            classifications,
            commands,
        })
    }

    /// Processes the frame and forwards its commands to `sink`.
    ///
    /// Sink failures are logged and swallowed. A refused audio command puts the
    /// playback flag back so the gesture is retried on a later frame.
    pub fn process_and_dispatch(
        &mut self,
        frame: &TrackingFrame,
        sink: &mut dyn FrameSink,
    ) -> Result<FrameReport> {
        let audio_before = self.machine.state().audio_playing;

        let report = match self.process_frame(frame) {
            Ok(report) => report,
            Err(e) => {
                if let Some(warning) = self.last_warning.as_deref() {
                    sink.show_warning(warning);
                }
                return Err(e);
            }
        };
        let commands = &report.commands;

        sink.show_status(&commands.status_text);

        if commands.overlay.kind != Overlay::None {
            if let Err(e) = sink.composite_overlay(&commands.overlay) {
                tracing::error!("Overlay {:?} failed: {}", commands.overlay.kind, e);
            }
        }

        if commands.audio != AudioCommand::None {
            if let Err(e) = sink.control_audio(commands.audio) {
                tracing::error!("Audio {:?} failed: {}", commands.audio, e);
                self.machine.restore_audio_playing(audio_before);
            }
        }

        if let Err(e) = sink.render_object(&commands.render) {
            tracing::error!("3D render failed: {}", e);
        }

        Ok(report)
    }

    /// Camera stopped: back to the initial state.
    pub fn end_session(&mut self) {
        tracing::info!(
            "Session ended after {} frames ({} dropped)",
            self.frames_processed,
            self.frames_dropped
        );
        self.machine.reset();
        self.classifier.reset();
        self.frames_processed = 0;
        self.frames_dropped = 0;
        self.last_warning = None;
        self.overflow_hands = None;
    }

    /// True when a frame starts (or changes) a run of frames over `max_hands`.
    fn note_hand_count(&mut self, count: usize) -> bool {
        let overflow = (count > self.max_hands).then_some(count);
        let changed = overflow.is_some() && overflow != self.overflow_hands;
        if overflow.is_some() && !changed {
            tracing::debug!("{} hands in frame, extras ignored", count);
        }
        self.overflow_hands = overflow;
        changed
    }

    pub fn into_shared(self) -> SharedOrchestrator {
        Arc::new(Mutex::new(self))
    }
}

impl Default for FrameOrchestrator {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// For hosts that deliver frames from several threads; the lock keeps one
/// frame's processing from overlapping the next.
pub type SharedOrchestrator = Arc<Mutex<FrameOrchestrator>>;

pub fn process_shared(
    orchestrator: &SharedOrchestrator,
    frame: &TrackingFrame,
    sink: &mut dyn FrameSink,
) -> Result<FrameReport> {
    let mut guard = orchestrator
        .lock()
        .map_err(|_| Error::Collaborator("orchestrator lock poisoned".to_string()))?;
    guard.process_and_dispatch(frame, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{HandObservation, Landmark};
    use crate::tracking::HandBuilder;

    fn frame_for(gesture: Gesture) -> TrackingFrame {
        TrackingFrame::with_hand(0.0, HandBuilder::for_gesture(gesture).build())
    }

    #[test]
    fn test_empty_frame_is_none() {
        let mut orchestrator = FrameOrchestrator::default();
        let report = orchestrator.process_frame(&TrackingFrame::empty(0.0)).unwrap();
        assert_eq!(report.gesture(), Gesture::None);
        assert_eq!(report.hands_detected, 0);
        assert!(report.classifications.is_empty());
    }

    #[test]
    fn test_only_first_hand_drives_output() {
        let mut orchestrator = FrameOrchestrator::default();
        let frame = TrackingFrame {
            timestamp: 0.0,
            hands: vec![
                HandBuilder::for_gesture(Gesture::Fist).build(),
                HandBuilder::for_gesture(Gesture::OpenPalm).build(),
            ],
        };
        let report = orchestrator.process_frame(&frame).unwrap();
        assert_eq!(report.gesture(), Gesture::Fist);
        assert_eq!(report.hands_detected, 2);
        assert_eq!(report.classifications.len(), 1);
    }

    #[test]
    fn test_extra_hands_warn_once_per_run() {
        let mut orchestrator = FrameOrchestrator::default();
        assert!(!orchestrator.note_hand_count(1));
        assert!(orchestrator.note_hand_count(3));
        assert!(!orchestrator.note_hand_count(3));
        assert!(!orchestrator.note_hand_count(3));
        assert!(orchestrator.note_hand_count(2));
        assert!(!orchestrator.note_hand_count(1));
        assert!(orchestrator.note_hand_count(2));

        orchestrator.end_session();
        assert!(orchestrator.note_hand_count(2));
    }

    #[test]
    fn test_invalid_frame_counts_and_warns() {
        let mut orchestrator = FrameOrchestrator::default();
        let bad = TrackingFrame::with_hand(0.0, HandObservation::new(vec![Landmark::default(); 5]));
        assert!(orchestrator.process_frame(&bad).is_err());
        assert_eq!(orchestrator.frames_dropped(), 1);
        assert!(orchestrator.last_warning().is_some());

        orchestrator.process_frame(&frame_for(Gesture::Fist)).unwrap();
        assert!(orchestrator.last_warning().is_none());
        assert_eq!(orchestrator.frames_processed(), 1);
    }

    #[test]
    fn test_smoothing_from_config() {
        let mut config = Config::default();
        config.smoothing.enabled = true;
        config.smoothing.min_stable_frames = 2;
        let mut orchestrator = FrameOrchestrator::new(&config);

        let first = orchestrator.process_frame(&frame_for(Gesture::Fist)).unwrap();
        assert_eq!(first.gesture(), Gesture::None);
        assert_eq!(first.classifications[0].raw, Gesture::Fist);
        let second = orchestrator.process_frame(&frame_for(Gesture::Fist)).unwrap();
        assert_eq!(second.gesture(), Gesture::Fist);
    }

    #[test]
    fn test_end_session_resets_state() {
        let mut orchestrator = FrameOrchestrator::default();
        orchestrator.process_frame(&frame_for(Gesture::Fist)).unwrap();
        orchestrator.process_frame(&frame_for(Gesture::Pinch)).unwrap();
        orchestrator.end_session();
        assert_eq!(orchestrator.state(), &OutputState::default());
        assert_eq!(orchestrator.frames_processed(), 0);
    }
}
