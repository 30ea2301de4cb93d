// src/landmarks.rs - Hand landmark data model (MediaPipe 21-point numbering)
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Hand skeleton connections for drawing
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

/// One normalized hand point. x/y are in [0,1] image space (y grows downward),
/// z is relative depth and may be omitted by the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Handedness label as reported by the tracker (camera perspective).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// The landmark set of one tracked hand in one frame.
///
/// The tracker hands these over as-is, so the shape is checked where the
/// landmarks are consumed (see [`HandObservation::validate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub handedness: Option<Handedness>,
}

impl HandObservation {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks, handedness: None }
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    /// Checks the 21-point shape and that every x/y is finite.
    pub fn validate(&self) -> Result<()> {
        if self.landmarks.len() != LANDMARK_COUNT {
            return Err(Error::InvalidObservation {
                expected: LANDMARK_COUNT,
                found: self.landmarks.len(),
            });
        }
        if let Some(index) = self
            .landmarks
            .iter()
            .position(|lm| !lm.x.is_finite() || !lm.y.is_finite())
        {
            return Err(Error::InvalidLandmark { index });
        }
        Ok(())
    }

    /// Landmark at `index`, `None` past the end of a malformed observation.
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.landmarks.get(index).copied()
    }

    /// Unchecked lookup for callers that already ran `validate`.
    pub(crate) fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

/// Everything the hand tracker delivered for one camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    /// Seconds since the feed started
    pub timestamp: f64,
    #[serde(default)]
    pub hands: Vec<HandObservation>,
}

impl TrackingFrame {
    pub fn empty(timestamp: f64) -> Self {
        Self { timestamp, hands: Vec::new() }
    }

    pub fn with_hand(timestamp: f64, hand: HandObservation) -> Self {
        Self { timestamp, hands: vec![hand] }
    }
}
