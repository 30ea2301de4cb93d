// src/smoothing.rs - Optional gesture debouncing
//!
//! Classification is per-frame, so a pose sitting on a threshold (pinch distance
//! mostly) can flip labels every frame. The debouncer only lets a new label
//! through after it has been seen on enough consecutive frames.

use crate::classifier::Gesture;

#[derive(Debug, Clone)]
pub struct GestureDebouncer {
    min_stable_frames: usize,
    current: Gesture,
    candidate: Gesture,
    candidate_frames: usize,
}

impl GestureDebouncer {
    /// `min_stable_frames` of 1 (or 0) reports every label immediately.
    pub fn new(min_stable_frames: usize) -> Self {
        Self {
            min_stable_frames: min_stable_frames.max(1),
            current: Gesture::None,
            candidate: Gesture::None,
            candidate_frames: 0,
        }
    }

    pub fn update(&mut self, raw: Gesture) -> Gesture {
        if raw == self.current {
            self.candidate = raw;
            self.candidate_frames = 0;
            return self.current;
        }

        if raw == self.candidate {
            self.candidate_frames += 1;
        } else {
            self.candidate = raw;
            self.candidate_frames = 1;
        }

        if self.candidate_frames >= self.min_stable_frames {
            tracing::debug!(
                "Debounced gesture {} -> {} after {} frames",
                self.current,
                raw,
                self.candidate_frames
            );
            self.current = raw;
            self.candidate_frames = 0;
        }

        self.current
    }

    pub fn current(&self) -> Gesture {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = Gesture::None;
        self.candidate = Gesture::None;
        self.candidate_frames = 0;
    }
}
