// src/tracking.rs - Landmark sources feeding the gesture pipeline
//!
//! The real hand tracker lives outside this crate. What it delivers per camera
//! frame is a [`TrackingFrame`]; anything that can produce those implements
//! [`LandmarkSource`]. Two sources ship here: a scripted simulation (used when
//! no tracker is attached) and a replay of recorded JSON-lines sessions.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::classifier::Gesture;
use crate::error::{Error, Result};
use crate::landmarks::{
    Handedness, HandObservation, Landmark, TrackingFrame, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP,
};

pub trait LandmarkSource: Send {
    /// Next frame from the tracker, `None` once the feed is exhausted.
    fn next_frame(&mut self) -> Result<Option<TrackingFrame>>;

    fn name(&self) -> &str;
}

// Palm-toward-camera reference hand, right hand in a mirrored view.
const WRIST_POS: (f64, f64) = (0.50, 0.90);
const THUMB_BASE: [(f64, f64); 3] = [(0.42, 0.84), (0.38, 0.78), (0.35, 0.72)];
const THUMB_TIP_EXTENDED: (f64, f64) = (0.30, 0.68);
const THUMB_TIP_FOLDED: (f64, f64) = (0.42, 0.72);
const FINGER_X: [f64; 4] = [0.44, 0.50, 0.56, 0.62];
const MCP_Y: f64 = 0.60;
const PIP_Y: f64 = 0.50;
const EXTENDED_DIP_TIP_Y: (f64, f64) = (0.40, 0.30);
const FOLDED_DIP_TIP_Y: (f64, f64) = (0.56, 0.60);

/// Builds anatomically ordered 21-point hands with chosen digits extended.
///
/// ```
/// use gesture_control::tracking::HandBuilder;
/// use gesture_control::fingers::detect_extension;
///
/// let hand = HandBuilder::new().extended([false, true, true, false, false]).build();
/// let ext = detect_extension(&hand).unwrap();
/// assert_eq!(ext.count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandBuilder {
    extended: [bool; 5],
    pinch_gap: Option<f64>,
    offset: (f64, f64),
    handedness: Option<Handedness>,
}

impl HandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pose the classifier maps to `gesture`. `Gesture::None` gives an
    /// index-only pose that matches no rule.
    pub fn for_gesture(gesture: Gesture) -> Self {
        let builder = Self::new();
        match gesture {
            Gesture::OpenPalm => builder.extended([true; 5]),
            Gesture::Pinch => builder
                .extended([false, true, false, false, false])
                .pinch_gap(0.02),
            Gesture::Fist => builder.extended([false; 5]),
            Gesture::ThumbsUp => builder.extended([true, false, false, false, false]),
            Gesture::PeaceSign => builder.extended([false, true, true, false, false]),
            Gesture::None => builder.extended([false, true, false, false, false]),
        }
    }

    pub fn extended(mut self, flags: [bool; 5]) -> Self {
        self.extended = flags;
        self
    }

    /// Places the thumb tip this far to the right of the index tip. The thumb
    /// then reads as folded.
    pub fn pinch_gap(mut self, gap: f64) -> Self {
        self.pinch_gap = Some(gap);
        self
    }

    /// Translates the whole hand; relative geometry is unchanged.
    pub fn offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = (dx, dy);
        self
    }

    pub fn handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    pub fn build(&self) -> HandObservation {
        let mut points = Vec::with_capacity(LANDMARK_COUNT);
        points.push(WRIST_POS);
        points.extend_from_slice(&THUMB_BASE);
        points.push(if self.extended[0] {
            THUMB_TIP_EXTENDED
        } else {
            THUMB_TIP_FOLDED
        });

        for (finger, &x) in FINGER_X.iter().enumerate() {
            let (dip_y, tip_y) = if self.extended[finger + 1] {
                EXTENDED_DIP_TIP_Y
            } else {
                FOLDED_DIP_TIP_Y
            };
            points.extend_from_slice(&[(x, MCP_Y), (x, PIP_Y), (x, dip_y), (x, tip_y)]);
        }

        if let Some(gap) = self.pinch_gap {
            let (index_x, index_y) = points[INDEX_TIP];
            points[THUMB_TIP] = (index_x + gap, index_y);
        }

        let (dx, dy) = self.offset;
        let landmarks = points
            .into_iter()
            .map(|(x, y)| Landmark::planar(x + dx, y + dy))
            .collect();

        HandObservation {
            landmarks,
            handedness: self.handedness,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimStep {
    /// `None` means no hand in view
    pub gesture: Option<Gesture>,
    pub frames: u32,
}

/// Scripted stand-in for the hand tracker. Cycles through a list of poses,
/// holding each for a number of frames, with a slow drift of the whole hand.
pub struct SimulatedTracker {
    script: Vec<SimStep>,
    frame_index: u64,
    frame_interval: f64,
    looping: bool,
}

impl SimulatedTracker {
    pub fn new(script: Vec<SimStep>, fps: u32) -> Self {
        Self {
            script,
            frame_index: 0,
            frame_interval: 1.0 / f64::from(fps.max(1)),
            looping: true,
        }
    }

    /// Walks every gesture once, with empty frames in between.
    pub fn demo(fps: u32) -> Self {
        let hold = fps.max(1) * 2;
        let gap = fps.max(1) / 2;
        let mut script = Vec::new();
        for gesture in [
            Gesture::OpenPalm,
            Gesture::Pinch,
            Gesture::Fist,
            Gesture::ThumbsUp,
            Gesture::PeaceSign,
        ] {
            script.push(SimStep { gesture: Some(gesture), frames: hold });
            script.push(SimStep { gesture: None, frames: gap });
        }
        Self::new(script, fps)
    }

    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    fn total_frames(&self) -> u64 {
        self.script.iter().map(|step| u64::from(step.frames)).sum()
    }

    fn step_at(&self, frame: u64) -> Option<&SimStep> {
        let mut remaining = frame;
        for step in &self.script {
            if remaining < u64::from(step.frames) {
                return Some(step);
            }
            remaining -= u64::from(step.frames);
        }
        None
    }
}

impl LandmarkSource for SimulatedTracker {
    fn next_frame(&mut self) -> Result<Option<TrackingFrame>> {
        let total = self.total_frames();
        if total == 0 || (!self.looping && self.frame_index >= total) {
            return Ok(None);
        }

        let t = self.frame_index as f64 * self.frame_interval;
        let step = self.step_at(self.frame_index % total).copied();
        self.frame_index += 1;

        let frame = match step.and_then(|s| s.gesture) {
            Some(gesture) => {
                let hand = HandBuilder::for_gesture(gesture)
                    .offset(0.02 * (t * 0.7).sin(), 0.015 * (t * 0.9).cos())
                    .handedness(Handedness::Right)
                    .build();
                TrackingFrame::with_hand(t, hand)
            }
            None => TrackingFrame::empty(t),
        };

        Ok(Some(frame))
    }

    fn name(&self) -> &str {
        "simulation"
    }
}

/// Plays back a recorded session: one JSON `TrackingFrame` per line.
pub struct ReplayTracker {
    reader: Box<dyn BufRead + Send>,
    line_number: usize,
    name: String,
}

impl ReplayTracker {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::Tracker(format!("Cannot open replay {}: {}", path.display(), e)))?;
        Ok(Self {
            reader: Box::new(BufReader::new(file)),
            line_number: 0,
            name: path.display().to_string(),
        })
    }

    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            line_number: 0,
            name: "replay".to_string(),
        }
    }
}

impl LandmarkSource for ReplayTracker {
    fn next_frame(&mut self) -> Result<Option<TrackingFrame>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        serde_json::from_str(line.trim())
            .map(Some)
            .map_err(|e| Error::Tracker(format!("{} line {}: {}", self.name, self.line_number, e)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Single-consumer queue between a tracker thread and the frame loop.
///
/// The producer never blocks. Once `FEED_CAPACITY` frames are waiting, each
/// new tracker frame is discarded and the queued ones are kept, so a loop that
/// falls behind resumes from the oldest unread frame. Frames reach the
/// pipeline one at a time and in capture order.
pub struct FrameFeed {
    receiver: Receiver<TrackingFrame>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

const FEED_CAPACITY: usize = 8;

impl FrameFeed {
    /// Starts pulling from `source` on its own thread. `fps == 0` disables pacing.
    pub fn spawn(mut source: Box<dyn LandmarkSource>, fps: u32) -> Self {
        let (sender, receiver) = mpsc::sync_channel(FEED_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(fps)));

        let handle = std::thread::spawn(move || {
            tracing::info!("Frame feed started from {}", source.name());
            while !stop_flag.load(Ordering::Relaxed) {
                match source.next_frame() {
                    Ok(Some(frame)) => match sender.try_send(frame) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::debug!("Frame loop behind, dropping tracker frame");
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    },
                    Ok(None) => {
                        tracing::info!("{} exhausted", source.name());
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Tracker error, stopping feed: {}", e);
                        break;
                    }
                }
                if let Some(interval) = interval {
                    std::thread::sleep(interval);
                }
            }
        });

        Self {
            receiver,
            stop,
            handle: Some(handle),
        }
    }

    /// Everything queued right now, oldest first.
    pub fn drain(&self) -> Vec<TrackingFrame> {
        let mut frames = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(frame) => frames.push(frame),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        frames
    }

    /// Blocks until the next frame; `None` after the producer finished.
    pub fn recv(&self) -> Option<TrackingFrame> {
        self.receiver.recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Frame feed thread panicked");
            }
        }
    }
}

impl Drop for FrameFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
