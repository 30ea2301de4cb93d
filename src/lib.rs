//! Hand gesture control core.
//!
//! Turns per-frame hand landmarks (21 normalized points per hand, as produced by
//! a MediaPipe-style hand tracker) into one of a small set of gestures, and
//! gestures into idempotent commands for an overlay compositor, a music player
//! and a 3D renderer.
//!
//! Each frame flows through:
//! 1. [`fingers`]: which digits are extended
//! 2. [`classifier`]: one [`Gesture`] by fixed precedence
//! 3. [`output`]: the state machine that owns [`OutputState`] and emits commands
//! 4. [`orchestrator`]: runs the three steps and forwards commands to a [`FrameSink`]
//!
//! ```
//! use gesture_control::{Config, FrameOrchestrator, Gesture, TrackingFrame};
//! use gesture_control::output::Command;
//! use gesture_control::tracking::HandBuilder;
//!
//! let mut orchestrator = FrameOrchestrator::new(&Config::default());
//! let hand = HandBuilder::for_gesture(Gesture::Fist).build();
//! let report = orchestrator.process_frame(&TrackingFrame::with_hand(0.0, hand)).unwrap();
//!
//! assert_eq!(report.gesture(), Gesture::Fist);
//! assert_eq!(report.commands.commands(), vec![Command::StartAudio]);
//! assert!(orchestrator.state().audio_playing);
//! ```

/// Error types and result handling
pub mod error;

/// Configuration management
pub mod config;

/// Landmark and observation types
pub mod landmarks;

/// Planar geometry helpers
pub mod geometry;

/// Finger-extension detection
pub mod fingers;

/// Gesture classification by precedence
pub mod classifier;

/// Optional debouncing of gesture labels
pub mod smoothing;

/// Gesture-output state machine
pub mod output;

/// Frame orchestration and collaborator interface
pub mod orchestrator;

/// Landmark sources and the frame feed
pub mod tracking;

/// Session recording and export
pub mod data;

/// Background music playback
pub mod audio;

pub use classifier::{classify, Gesture, GestureClassifier};
pub use config::Config;
pub use error::{Error, Result};
pub use fingers::{detect_extension, ExtensionVector};
pub use geometry::distance;
pub use landmarks::{HandObservation, Landmark, TrackingFrame};
pub use orchestrator::{FrameOrchestrator, FrameReport, FrameSink};
pub use output::{FrameCommands, GestureOutputMachine, OutputState};
