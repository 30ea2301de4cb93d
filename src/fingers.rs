// src/fingers.rs - Per-digit extension heuristics
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::landmarks::{
    Handedness, HandObservation, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP,
    PINKY_TIP, RING_PIP, RING_TIP, THUMB_IP, THUMB_TIP,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digit {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

/// (tip, pip) pairs for the four long fingers, in digit order.
const FINGER_JOINTS: [(Digit, usize, usize); 4] = [
    (Digit::Index, INDEX_TIP, INDEX_PIP),
    (Digit::Middle, MIDDLE_TIP, MIDDLE_PIP),
    (Digit::Ring, RING_TIP, RING_PIP),
    (Digit::Pinky, PINKY_TIP, PINKY_PIP),
];

/// How the thumb is judged. The x-axis comparison only holds for one hand
/// orientation, so `Fixed` is wrong for the mirrored hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbRule {
    /// Extended iff tip.x < ip.x, whatever hand it is
    #[default]
    Fixed,
    /// Flip the comparison for hands the tracker labels `Left`
    Handedness,
}

/// Extension flags in fixed order [thumb, index, middle, ring, pinky].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionVector(pub [bool; 5]);

impl ExtensionVector {
    pub fn new(flags: [bool; 5]) -> Self {
        Self(flags)
    }

    pub fn is_extended(&self, digit: Digit) -> bool {
        self.0[digit as usize]
    }

    pub fn thumb(&self) -> bool {
        self.is_extended(Digit::Thumb)
    }

    pub fn index(&self) -> bool {
        self.is_extended(Digit::Index)
    }

    pub fn middle(&self) -> bool {
        self.is_extended(Digit::Middle)
    }

    pub fn ring(&self) -> bool {
        self.is_extended(Digit::Ring)
    }

    pub fn pinky(&self) -> bool {
        self.is_extended(Digit::Pinky)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&extended| extended).count()
    }

    pub fn as_array(&self) -> [bool; 5] {
        self.0
    }
}

impl fmt::Display for ExtensionVector {
    /// Renders as "10010"-style bits, thumb first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for extended in self.0 {
            write!(f, "{}", if extended { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Detects extended digits with the default fixed-orientation thumb rule.
pub fn detect_extension(hand: &HandObservation) -> Result<ExtensionVector> {
    detect_extension_with(hand, ThumbRule::Fixed)
}

pub fn detect_extension_with(hand: &HandObservation, rule: ThumbRule) -> Result<ExtensionVector> {
    hand.validate()?;

    let mut flags = [false; 5];
    flags[Digit::Thumb as usize] = thumb_extended(hand, rule);

    // Smaller y is higher on screen
    for (digit, tip, pip) in FINGER_JOINTS {
        flags[digit as usize] = hand.point(tip).y < hand.point(pip).y;
    }

    Ok(ExtensionVector(flags))
}

fn thumb_extended(hand: &HandObservation, rule: ThumbRule) -> bool {
    let tip = hand.point(THUMB_TIP);
    let ip = hand.point(THUMB_IP);

    match (rule, hand.handedness) {
        (ThumbRule::Handedness, Some(Handedness::Left)) => tip.x > ip.x,
        _ => tip.x < ip.x,
    }
}
