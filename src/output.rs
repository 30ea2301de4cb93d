// src/output.rs - Gesture -> side-effect state machine
//!
//! The machine owns the only cross-frame state of the pipeline. Each `step`
//! applies one gesture and hands back the commands for that frame as plain
//! data; nothing here touches a screen or a speaker.

use serde::{Deserialize, Serialize};

use crate::classifier::Gesture;
use crate::config::{BoundingBox, OutputConfig};

pub const STATUS_WAITING: &str = "Esperando mano...";
pub const STATUS_OPEN_PALM: &str = "Mano Abierta (Jordano)";
pub const STATUS_PINCH: &str = "Pinza (Objeto 3D)";
pub const STATUS_FIST: &str = "Puño (Play Música)";
pub const STATUS_THUMBS_UP: &str = "Pulgar Arriba (Piolín)";
pub const STATUS_PEACE: &str = "Paz (Stop Música)";

pub fn status_for(gesture: Gesture) -> &'static str {
    match gesture {
        Gesture::OpenPalm => STATUS_OPEN_PALM,
        Gesture::Pinch => STATUS_PINCH,
        Gesture::Fist => STATUS_FIST,
        Gesture::ThumbsUp => STATUS_THUMBS_UP,
        Gesture::PeaceSign => STATUS_PEACE,
        Gesture::None => STATUS_WAITING,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Overlay {
    #[default]
    None,
    Jordano,
    Piolin,
}

/// Accumulated 3D object rotation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputState {
    pub audio_playing: bool,
    pub three_d_visible: bool,
    pub rotation: Rotation,
    pub active_overlay: Overlay,
    pub status_text: String,
}

impl Default for OutputState {
    fn default() -> Self {
        Self {
            audio_playing: false,
            three_d_visible: false,
            rotation: Rotation::default(),
            active_overlay: Overlay::None,
            status_text: STATUS_WAITING.to_string(),
        }
    }
}

/// 2D image compositing request. `kind == None` means nothing to draw this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayCommand {
    pub kind: Overlay,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioCommand {
    #[default]
    None,
    Start,
    /// Stop playback and rewind to the beginning
    Stop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderCommand {
    pub visible: bool,
    pub rotation: Rotation,
}

/// One side effect that actually has to happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ShowOverlay(Overlay),
    Render3D(Rotation),
    StartAudio,
    StopAudio,
}

/// Everything the collaborators need for one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCommands {
    pub gesture: Gesture,
    pub status_text: String,
    pub overlay: OverlayCommand,
    pub audio: AudioCommand,
    pub render: RenderCommand,
}

impl FrameCommands {
    /// Flattens the frame into the side effects it emits, overlay first.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(3);
        if self.overlay.kind != Overlay::None {
            commands.push(Command::ShowOverlay(self.overlay.kind));
        }
        if self.render.visible {
            commands.push(Command::Render3D(self.render.rotation));
        }
        match self.audio {
            AudioCommand::Start => commands.push(Command::StartAudio),
            AudioCommand::Stop => commands.push(Command::StopAudio),
            AudioCommand::None => {}
        }
        commands
    }
}

pub struct GestureOutputMachine {
    state: OutputState,
    config: OutputConfig,
}

impl GestureOutputMachine {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            state: OutputState::default(),
            config,
        }
    }

    pub fn state(&self) -> &OutputState {
        &self.state
    }

    /// Applies one frame's gesture.
    pub fn step(&mut self, gesture: Gesture) -> FrameCommands {
        let mut overlay = OverlayCommand::default();
        let mut audio = AudioCommand::None;

        // Visibility is never sticky; only the rotation value carries over
        let was_visible = self.state.three_d_visible;
        self.state.three_d_visible = gesture == Gesture::Pinch;

        match gesture {
            Gesture::OpenPalm => {
                overlay = self.show_overlay(Overlay::Jordano);
            }
            Gesture::Pinch => {
                self.state.rotation.x += self.config.rotation_increment;
                self.state.rotation.y += self.config.rotation_increment;
            }
            Gesture::Fist => {
                if !self.state.audio_playing {
                    self.state.audio_playing = true;
                    audio = AudioCommand::Start;
                    tracing::info!("Fist: starting music");
                }
            }
            Gesture::ThumbsUp => {
                overlay = self.show_overlay(Overlay::Piolin);
            }
            Gesture::PeaceSign => {
                if self.state.audio_playing {
                    self.state.audio_playing = false;
                    audio = AudioCommand::Stop;
                    tracing::info!("Peace sign: stopping music");
                }
            }
            Gesture::None => {}
        }

        if was_visible != self.state.three_d_visible {
            tracing::info!(
                "3D object {}",
                if self.state.three_d_visible { "shown" } else { "hidden" }
            );
        }

        let status = status_for(gesture);
        if self.state.status_text != status {
            self.state.status_text = status.to_string();
        }

        FrameCommands {
            gesture,
            status_text: self.state.status_text.clone(),
            overlay,
            audio,
            render: RenderCommand {
                visible: self.state.three_d_visible,
                rotation: self.state.rotation,
            },
        }
    }

    /// Puts the playback flag back after the audio collaborator refused a
    /// start/stop, so the next matching gesture retries.
    pub fn restore_audio_playing(&mut self, playing: bool) {
        self.state.audio_playing = playing;
    }

    /// Session teardown.
    pub fn reset(&mut self) {
        self.state = OutputState::default();
    }

    fn show_overlay(&mut self, kind: Overlay) -> OverlayCommand {
        if self.state.active_overlay != kind {
            tracing::info!("Overlay {:?} -> {:?}", self.state.active_overlay, kind);
            self.state.active_overlay = kind;
        }
        let bounding_box = match kind {
            Overlay::Jordano => Some(self.config.jordano_box),
            Overlay::Piolin => Some(self.config.piolin_box),
            Overlay::None => None,
        };
        OverlayCommand { kind, bounding_box }
    }
}

impl Default for GestureOutputMachine {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let machine = GestureOutputMachine::default();
        let state = machine.state();
        assert!(!state.audio_playing);
        assert!(!state.three_d_visible);
        assert_eq!(state.rotation, Rotation::default());
        assert_eq!(state.active_overlay, Overlay::None);
        assert_eq!(state.status_text, STATUS_WAITING);
    }

    #[test]
    fn test_open_palm_shows_jordano() {
        let mut machine = GestureOutputMachine::default();
        let frame = machine.step(Gesture::OpenPalm);
        assert_eq!(frame.overlay.kind, Overlay::Jordano);
        assert_eq!(frame.overlay.bounding_box, Some(BoundingBox::new(10, 10, 300, 300)));
        assert_eq!(frame.status_text, STATUS_OPEN_PALM);
        assert_eq!(machine.state().active_overlay, Overlay::Jordano);
    }

    #[test]
    fn test_thumbs_up_shows_piolin() {
        let mut machine = GestureOutputMachine::default();
        let frame = machine.step(Gesture::ThumbsUp);
        assert_eq!(frame.commands(), vec![Command::ShowOverlay(Overlay::Piolin)]);
        assert_eq!(frame.overlay.bounding_box, Some(BoundingBox::new(10, 10, 200, 200)));
        assert_eq!(machine.state().status_text, STATUS_THUMBS_UP);
    }

    #[test]
    fn test_none_keeps_overlay() {
        let mut machine = GestureOutputMachine::default();
        machine.step(Gesture::ThumbsUp);
        let frame = machine.step(Gesture::None);
        assert_eq!(frame.overlay.kind, Overlay::None);
        assert!(frame.commands().is_empty());
        assert_eq!(machine.state().active_overlay, Overlay::Piolin);
        assert_eq!(machine.state().status_text, STATUS_WAITING);
    }

    #[test]
    fn test_pinch_accumulates_rotation_only_while_pinching() {
        let mut machine = GestureOutputMachine::default();
        machine.step(Gesture::Pinch);
        let frame = machine.step(Gesture::Pinch);
        assert!(frame.render.visible);
        assert!((frame.render.rotation.x - 0.02).abs() < 1e-12);
        assert!((frame.render.rotation.y - 0.02).abs() < 1e-12);

        let frame = machine.step(Gesture::Fist);
        assert!(!frame.render.visible);
        assert!(!machine.state().three_d_visible);
        assert!((machine.state().rotation.x - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_fist_is_idempotent() {
        let mut machine = GestureOutputMachine::default();
        assert_eq!(machine.step(Gesture::Fist).audio, AudioCommand::Start);
        assert_eq!(machine.step(Gesture::Fist).audio, AudioCommand::None);
        assert_eq!(machine.step(Gesture::Fist).audio, AudioCommand::None);
        assert!(machine.state().audio_playing);
    }

    #[test]
    fn test_peace_sign_without_music_is_noop() {
        let mut machine = GestureOutputMachine::default();
        let frame = machine.step(Gesture::PeaceSign);
        assert_eq!(frame.audio, AudioCommand::None);
        assert!(!machine.state().audio_playing);
        assert_eq!(frame.status_text, STATUS_PEACE);
    }

    #[test]
    fn test_custom_rotation_increment() {
        let config = OutputConfig {
            rotation_increment: 0.5,
            ..OutputConfig::default()
        };
        let mut machine = GestureOutputMachine::new(config);
        let frame = machine.step(Gesture::Pinch);
        assert_eq!(frame.render.rotation, Rotation { x: 0.5, y: 0.5 });
    }

    #[test]
    fn test_restore_audio_and_reset() {
        let mut machine = GestureOutputMachine::default();
        machine.step(Gesture::Fist);
        machine.restore_audio_playing(false);
        assert_eq!(machine.step(Gesture::Fist).audio, AudioCommand::Start);

        machine.step(Gesture::Pinch);
        machine.reset();
        assert_eq!(machine.state(), &OutputState::default());
    }
}
