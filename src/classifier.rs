// src/classifier.rs - Single-frame gesture classification
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::fingers::{detect_extension_with, ExtensionVector};
use crate::geometry::distance;
use crate::landmarks::{HandObservation, INDEX_TIP, THUMB_TIP};
use crate::smoothing::GestureDebouncer;

pub const DEFAULT_PINCH_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    OpenPalm,
    Pinch,
    Fist,
    ThumbsUp,
    PeaceSign,
    #[default]
    None,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::OpenPalm,
        Gesture::Pinch,
        Gesture::Fist,
        Gesture::ThumbsUp,
        Gesture::PeaceSign,
        Gesture::None,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::OpenPalm => "OpenPalm",
            Gesture::Pinch => "Pinch",
            Gesture::Fist => "Fist",
            Gesture::ThumbsUp => "ThumbsUp",
            Gesture::PeaceSign => "PeaceSign",
            Gesture::None => "None",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-frame quantities the precedence rules look at.
struct PoseFeatures {
    ext: ExtensionVector,
    extended: usize,
    pinch_distance: f64,
}

type Rule = fn(&PoseFeatures, f64) -> bool;

/// Evaluated top to bottom, first match wins. `Gesture::None` is the fallback.
const PRECEDENCE: [(Gesture, Rule); 5] = [
    (Gesture::OpenPalm, open_palm),
    (Gesture::Pinch, pinch),
    (Gesture::Fist, fist),
    (Gesture::ThumbsUp, thumbs_up),
    (Gesture::PeaceSign, peace_sign),
];

fn open_palm(p: &PoseFeatures, _: f64) -> bool {
    p.extended == 5
}

fn pinch(p: &PoseFeatures, threshold: f64) -> bool {
    p.pinch_distance < threshold
}

fn fist(p: &PoseFeatures, _: f64) -> bool {
    p.extended == 0
}

fn thumbs_up(p: &PoseFeatures, _: f64) -> bool {
    p.extended == 1 && p.ext.thumb()
}

fn peace_sign(p: &PoseFeatures, _: f64) -> bool {
    p.extended == 2 && p.ext.index() && p.ext.middle()
}

/// Classifies one hand with the default pinch threshold.
pub fn classify(hand: &HandObservation, ext: &ExtensionVector) -> Result<Gesture> {
    classify_with_threshold(hand, ext, DEFAULT_PINCH_THRESHOLD)
}

pub fn classify_with_threshold(
    hand: &HandObservation,
    ext: &ExtensionVector,
    pinch_threshold: f64,
) -> Result<Gesture> {
    hand.validate()?;

    let features = PoseFeatures {
        ext: *ext,
        extended: ext.count(),
        pinch_distance: distance(&hand.point(THUMB_TIP), &hand.point(INDEX_TIP)),
    };

    let gesture = PRECEDENCE
        .iter()
        .find(|(_, rule)| rule(&features, pinch_threshold))
        .map(|(gesture, _)| *gesture)
        .unwrap_or(Gesture::None);

    Ok(gesture)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub extension: ExtensionVector,
    /// Label from this frame alone
    pub raw: Gesture,
    /// Label after optional debouncing; equals `raw` when smoothing is off
    pub gesture: Gesture,
}

/// Extension detection plus precedence classification, with the optional
/// debounce layer in front of the output.
pub struct GestureClassifier {
    config: ClassifierConfig,
    debouncer: Option<GestureDebouncer>,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config, debouncer: None }
    }

    pub fn with_debouncer(mut self, debouncer: GestureDebouncer) -> Self {
        self.debouncer = Some(debouncer);
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Single-frame label, bypassing the debouncer.
    pub fn evaluate(&self, hand: &HandObservation) -> Result<Classification> {
        let extension = detect_extension_with(hand, self.config.thumb_rule)?;
        let raw = classify_with_threshold(hand, &extension, self.config.pinch_threshold)?;
        Ok(Classification { extension, raw, gesture: raw })
    }

    pub fn classify_hand(&mut self, hand: &HandObservation) -> Result<Classification> {
        let Classification { extension, raw, .. } = self.evaluate(hand)?;
        let gesture = self.smooth(raw);

        tracing::debug!(
            "Extension {} ({} extended) -> {} (reported {})",
            extension,
            extension.count(),
            raw,
            gesture
        );

        Ok(Classification { extension, raw, gesture })
    }

    /// A frame without a hand still advances the debouncer.
    pub fn no_hand(&mut self) -> Gesture {
        self.smooth(Gesture::None)
    }

    pub fn reset(&mut self) {
        if let Some(debouncer) = self.debouncer.as_mut() {
            debouncer.reset();
        }
    }

    fn smooth(&mut self, raw: Gesture) -> Gesture {
        match self.debouncer.as_mut() {
            Some(debouncer) => debouncer.update(raw),
            None => raw,
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingers::detect_extension;
    use crate::tracking::HandBuilder;

    fn classify_pose(flags: [bool; 5]) -> Gesture {
        let hand = HandBuilder::new().extended(flags).build();
        let ext = detect_extension(&hand).unwrap();
        classify(&hand, &ext).unwrap()
    }

    #[test]
    fn test_basic_poses() {
        assert_eq!(classify_pose([true; 5]), Gesture::OpenPalm);
        assert_eq!(classify_pose([false; 5]), Gesture::Fist);
        assert_eq!(classify_pose([true, false, false, false, false]), Gesture::ThumbsUp);
        assert_eq!(classify_pose([false, true, true, false, false]), Gesture::PeaceSign);
    }

    #[test]
    fn test_unrecognized_poses_are_none() {
        assert_eq!(classify_pose([false, true, false, false, false]), Gesture::None);
        assert_eq!(classify_pose([true, true, true, false, false]), Gesture::None);
        assert_eq!(classify_pose([false, true, false, false, true]), Gesture::None);
        assert_eq!(classify_pose([true, true, false, false, false]), Gesture::None);
    }

    #[test]
    fn test_open_palm_beats_pinch() {
        // Tips close together, but the vector says every digit is up
        let hand = HandBuilder::new().extended([false; 5]).pinch_gap(0.01).build();
        let ext = ExtensionVector::new([true; 5]);
        assert_eq!(classify(&hand, &ext).unwrap(), Gesture::OpenPalm);
    }

    #[test]
    fn test_pinch_beats_fist() {
        let hand = HandBuilder::new().extended([false; 5]).pinch_gap(0.02).build();
        let ext = detect_extension(&hand).unwrap();
        assert_eq!(ext.count(), 0);
        assert_eq!(classify(&hand, &ext).unwrap(), Gesture::Pinch);
    }

    #[test]
    fn test_custom_threshold() {
        let hand = HandBuilder::new().extended([false; 5]).pinch_gap(0.07).build();
        let ext = detect_extension(&hand).unwrap();
        assert_eq!(classify_with_threshold(&hand, &ext, 0.05).unwrap(), Gesture::Fist);
        assert_eq!(classify_with_threshold(&hand, &ext, 0.08).unwrap(), Gesture::Pinch);
    }

    #[test]
    fn test_classifier_passes_through_without_debouncer() {
        let mut classifier = GestureClassifier::default();
        let hand = HandBuilder::new().extended([true; 5]).build();
        let result = classifier.classify_hand(&hand).unwrap();
        assert_eq!(result.raw, Gesture::OpenPalm);
        assert_eq!(result.gesture, Gesture::OpenPalm);
        assert_eq!(classifier.no_hand(), Gesture::None);
    }
}
