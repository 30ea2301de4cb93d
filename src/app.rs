// src/app.rs
use crate::ui::{CanvasScene, UIComponents};

use eframe::egui;
use gesture_control::audio::MusicPlayer;
use gesture_control::config::{BoundingBox, Config};
use gesture_control::data::SessionRecorder;
use gesture_control::error::Result;
use gesture_control::landmarks::HandObservation;
use gesture_control::orchestrator::{FrameOrchestrator, FrameReport, FrameSink};
use gesture_control::output::{AudioCommand, Overlay, OverlayCommand, RenderCommand, Rotation};
use gesture_control::tracking::{FrameFeed, LandmarkSource, ReplayTracker, SimulatedTracker};
use gesture_control::Gesture;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceMode {
    Simulation,
    Replay,
}

/// Screen-side collaborator: keeps what the latest frame asked to show.
#[derive(Debug, Default)]
pub struct ScreenSink {
    status: String,
    warning: Option<String>,
    overlay: Option<(Overlay, BoundingBox)>,
    render: RenderCommand,
    player: MusicPlayer,
}

impl ScreenSink {
    fn new(track: PathBuf) -> Self {
        Self {
            player: MusicPlayer::new(track),
            ..Self::default()
        }
    }

    /// The canvas is redrawn from scratch every frame.
    fn begin_frame(&mut self) {
        self.overlay = None;
    }

    /// Clears the canvas and silences the track; the audio device stays open.
    fn reset(&mut self) {
        self.player.stop();
        self.status.clear();
        self.warning = None;
        self.overlay = None;
        self.render = RenderCommand::default();
    }
}

impl FrameSink for ScreenSink {
    fn show_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.warning = None;
    }

    fn show_warning(&mut self, warning: &str) {
        self.warning = Some(warning.to_string());
    }

    fn composite_overlay(&mut self, overlay: &OverlayCommand) -> Result<()> {
        if let Some(bbox) = overlay.bounding_box {
            self.overlay = Some((overlay.kind, bbox));
        }
        Ok(())
    }

    fn control_audio(&mut self, command: AudioCommand) -> Result<()> {
        match command {
            AudioCommand::Start => {
                if let Err(e) = self.player.start() {
                    self.warning = Some(e.to_string());
                    return Err(e);
                }
            }
            AudioCommand::Stop => self.player.stop(),
            AudioCommand::None => {}
        }
        Ok(())
    }

    fn render_object(&mut self, render: &RenderCommand) -> Result<()> {
        self.render = *render;
        Ok(())
    }
}

pub struct GestureControlApp {
    // Core components
    config: Config,
    orchestrator: FrameOrchestrator,
    feed: Option<FrameFeed>,
    recorder: Option<SessionRecorder>,
    sink: ScreenSink,

    // UI State
    source_mode: SourceMode,
    replay_path: Option<PathBuf>,
    show_settings: bool,
    show_about: bool,
    notice: Option<String>,

    // Latest frame
    last_report: Option<FrameReport>,
    last_hand: Option<HandObservation>,
    session_start: Option<Instant>,

    // UI Components
    ui_components: UIComponents,
}

impl GestureControlApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, replay_path: Option<PathBuf>) -> Self {
        let source_mode = if replay_path.is_some() {
            SourceMode::Replay
        } else {
            SourceMode::Simulation
        };

        let sink = ScreenSink::new(config.audio.track_path.clone());

        Self {
            orchestrator: FrameOrchestrator::new(&config),
            config,
            feed: None,
            recorder: None,
            sink,
            source_mode,
            replay_path,
            show_settings: false,
            show_about: false,
            notice: None,
            last_report: None,
            last_hand: None,
            session_start: None,
            ui_components: UIComponents::new(&cc.egui_ctx),
        }
    }

    fn is_running(&self) -> bool {
        self.feed.is_some()
    }

    fn open_source(&self) -> Result<Box<dyn LandmarkSource>> {
        let fps = self.config.tracking.target_fps;
        match (self.source_mode, self.replay_path.as_ref()) {
            (SourceMode::Replay, Some(path)) => Ok(Box::new(ReplayTracker::from_path(path)?)),
            (SourceMode::Replay, None) => Err(gesture_control::Error::Tracker(
                "no replay file given on the command line".to_string(),
            )),
            (SourceMode::Simulation, _) => Ok(Box::new(SimulatedTracker::demo(fps))),
        }
    }

    fn start_feed(&mut self) {
        if let Err(e) = self.config.validate() {
            self.notice = Some(format!("Invalid settings: {}", e));
            return;
        }

        let source = match self.open_source() {
            Ok(source) => source,
            Err(e) => {
                tracing::error!("Failed to open landmark source: {}", e);
                self.notice = Some(e.to_string());
                return;
            }
        };

        tracing::info!("Starting feed from {}", source.name());

        // Settings may have changed since the last session
        self.orchestrator = FrameOrchestrator::new(&self.config);
        self.sink.reset();
        self.last_report = None;
        self.last_hand = None;
        self.notice = None;

        self.recorder = self
            .config
            .session
            .record
            .then(|| SessionRecorder::new(&self.config.session.output_directory, None));
        self.feed = Some(FrameFeed::spawn(source, self.config.tracking.target_fps));
        self.session_start = Some(Instant::now());
    }

    fn stop_feed(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
        }
        self.orchestrator.end_session();
        self.sink.reset();
        self.last_hand = None;
        self.session_start = None;
    }

    fn pump_frames(&mut self) {
        let (frames, finished) = match self.feed.as_ref() {
            Some(feed) => {
                // Checked before draining so no trailing frame is lost
                let finished = feed.is_finished();
                let frames = feed.drain();
                (frames, finished)
            }
            None => return,
        };

        for frame in frames {
            self.sink.begin_frame();
            match self.orchestrator.process_and_dispatch(&frame, &mut self.sink) {
                Ok(report) => {
                    if let Some(recorder) = self.recorder.as_mut() {
                        recorder.record(&report, self.orchestrator.state());
                    }
                    self.last_hand = frame.hands.into_iter().next();
                    self.last_report = Some(report);
                }
                Err(_) => {
                    // Already surfaced through the sink warning
                    if let Some(recorder) = self.recorder.as_mut() {
                        recorder.record_dropped(frame.timestamp, frame.hands.len(), self.orchestrator.state());
                    }
                }
            }
        }

        if finished {
            tracing::info!("Landmark source exhausted");
            self.notice = Some("Source finished".to_string());
            self.stop_feed();
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(10.0);
            egui::menu::bar(ui, |ui| {
                ui.heading("Gesture Control");

                ui.separator();

                // Source selection is locked while a session runs
                ui.add_enabled_ui(!self.is_running(), |ui| {
                    ui.selectable_value(&mut self.source_mode, SourceMode::Simulation, "🖐 Simulated Hand");
                    ui.selectable_value(&mut self.source_mode, SourceMode::Replay, "📁 Replay File");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }

                    if ui.button("ℹ About").clicked() {
                        self.show_about = !self.show_about;
                    }
                });
            });
            ui.add_space(10.0);
        });
    }

    fn render_main_content(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                columns[0].group(|ui| {
                    ui.heading("Camera");
                    self.render_canvas(ui);
                });

                columns[1].vertical(|ui| {
                    ui.group(|ui| {
                        ui.heading("Gesture Detection");
                        self.render_gesture_panel(ui);
                    });

                    ui.add_space(20.0);

                    ui.group(|ui| {
                        ui.heading("Outputs");
                        self.render_output_panel(ui);
                    });
                });
            });
        });
    }

    fn render_canvas(&self, ui: &mut egui::Ui) {
        let status = if self.sink.status.is_empty() {
            self.orchestrator.state().status_text.as_str()
        } else {
            self.sink.status.as_str()
        };

        let scene = CanvasScene {
            hand: self.last_hand.as_ref(),
            overlay: self.sink.overlay,
            object_rotation: self.sink.render.visible.then_some(self.sink.render.rotation),
            status,
        };
        self.ui_components.draw_canvas(ui, &scene);

        if let Some(warning) = self.sink.warning.as_ref() {
            ui.colored_label(self.ui_components.theme.warning, format!("⚠ {}", warning));
        }
    }

    fn render_gesture_panel(&self, ui: &mut egui::Ui) {
        let theme = &self.ui_components.theme;

        let Some(report) = self.last_report.as_ref() else {
            ui.colored_label(egui::Color32::GRAY, "No frames yet");
            return;
        };

        let gesture = report.gesture();
        ui.label(
            egui::RichText::new(gesture.to_string())
                .size(28.0)
                .color(theme.gesture_color(gesture)),
        );
        ui.label(format!("Hands detected: {}", report.hands_detected));

        for (i, classification) in report.classifications.iter().enumerate() {
            ui.add_space(6.0);
            ui.label(format!("Hand {}: {}", i + 1, classification.raw));
            self.ui_components.draw_extension_bar(ui, classification.extension.as_array());
            if classification.raw != classification.gesture {
                ui.colored_label(theme.text_secondary, format!("Holding {} until stable", classification.gesture));
            }
        }
    }

    fn render_output_panel(&self, ui: &mut egui::Ui) {
        let state = self.orchestrator.state();
        let theme = &self.ui_components.theme;

        ui.label(format!("Active overlay: {:?}", state.active_overlay));
        ui.label(format!(
            "3D object: {}",
            if state.three_d_visible { "visible" } else { "hidden" }
        ));
        let Rotation { x, y } = state.rotation;
        ui.label(format!("Rotation: x {:.2} rad, y {:.2} rad", x, y));

        ui.add_space(6.0);
        self.ui_components.draw_audio_indicator(
            ui,
            self.sink.player.is_playing(),
            self.sink.player.position().as_secs_f32(),
        );

        ui.separator();
        ui.label(format!("Frames processed: {}", self.orchestrator.frames_processed()));
        let dropped = self.orchestrator.frames_dropped();
        if dropped > 0 {
            ui.colored_label(theme.warning, format!("Frames dropped: {}", dropped));
        }

        if let Some(recorder) = self.recorder.as_ref() {
            ui.separator();
            ui.label(format!("Recorded frames: {}", recorder.frame_count()));
            ui.label(recorder.session_dir().display().to_string());
            let counts: Vec<String> = recorder
                .gesture_counts()
                .into_iter()
                .filter(|(gesture, count)| *count > 0 && *gesture != Gesture::None)
                .map(|(gesture, count)| format!("{} {}", gesture, count))
                .collect();
            if !counts.is_empty() {
                ui.label(counts.join(" · "));
            }
        }
    }

    fn render_control_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                let start_btn = if self.is_running() {
                    ui.add_sized(
                        [140.0, 40.0],
                        egui::Button::new("⏹ Stop Camera").fill(self.ui_components.theme.error),
                    )
                } else {
                    ui.add_sized(
                        [140.0, 40.0],
                        egui::Button::new("▶ Start Camera").fill(self.ui_components.theme.success),
                    )
                };

                if start_btn.clicked() {
                    if self.is_running() {
                        self.stop_feed();
                    } else {
                        self.start_feed();
                    }
                }

                ui.separator();

                let can_export = self.recorder.as_ref().map_or(false, |r| r.frame_count() > 0);
                if ui.add_enabled(can_export, egui::Button::new("Export to CSV")).clicked() {
                    self.export_data_to_csv();
                }
                if ui.add_enabled(can_export, egui::Button::new("Generate Report")).clicked() {
                    self.generate_report();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(start) = self.session_start {
                        let secs = start.elapsed().as_secs();
                        ui.label(
                            egui::RichText::new(format!("Session: {:02}:{:02}", secs / 60, secs % 60))
                                .color(self.ui_components.theme.success),
                        );
                    }
                    if let Some(notice) = self.notice.as_ref() {
                        ui.label(notice);
                    }
                });
            });
            ui.add_space(10.0);
        });
    }

    fn export_data_to_csv(&mut self) {
        let Some(recorder) = self.recorder.as_ref() else { return };
        self.notice = Some(match recorder.export_csv() {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                tracing::error!("CSV export failed: {}", e);
                format!("Export failed: {}", e)
            }
        });
    }

    fn generate_report(&mut self) {
        let Some(recorder) = self.recorder.as_ref() else { return };
        self.notice = Some(match recorder.generate_report() {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                tracing::error!("Report generation failed: {}", e);
                format!("Report failed: {}", e)
            }
        });
    }
}

impl eframe::App for GestureControlApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_frames();

        // Render UI components
        self.render_header(ctx);
        self.render_control_panel(ctx);

        if self.show_settings {
            self.render_settings_window(ctx);
        }

        if self.show_about {
            self.render_about_window(ctx);
        }

        self.render_main_content(ctx);

        if self.is_running() {
            ctx.request_repaint();
        }
    }
}

impl GestureControlApp {
    fn render_settings_window(&mut self, ctx: &egui::Context) {
        let locked = self.feed.is_some();
        egui::Window::new("Settings")
            .open(&mut self.show_settings)
            .resizable(true)
            .default_size([400.0, 500.0])
            .show(ctx, |ui| {
                if locked {
                    ui.colored_label(egui::Color32::GRAY, "Changes apply on the next start");
                }

                ui.heading("Tracking");
                ui.add(egui::Slider::new(&mut self.config.tracking.max_hands, 1..=4).text("Max hands"));
                ui.add(egui::Slider::new(&mut self.config.tracking.target_fps, 1..=60).text("Target FPS"));

                ui.separator();

                ui.heading("Classifier");
                ui.add(
                    egui::Slider::new(&mut self.config.classifier.pinch_threshold, 0.01..=0.15)
                        .step_by(0.005)
                        .text("Pinch threshold"),
                );
                egui::ComboBox::from_label("Thumb rule")
                    .selected_text(format!("{:?}", self.config.classifier.thumb_rule))
                    .show_ui(ui, |ui| {
                        use gesture_control::fingers::ThumbRule;
                        ui.selectable_value(&mut self.config.classifier.thumb_rule, ThumbRule::Fixed, "Fixed");
                        ui.selectable_value(&mut self.config.classifier.thumb_rule, ThumbRule::Handedness, "Handedness");
                    });

                ui.checkbox(&mut self.config.smoothing.enabled, "Smooth gestures");
                ui.add_enabled(
                    self.config.smoothing.enabled,
                    egui::Slider::new(&mut self.config.smoothing.min_stable_frames, 1..=15).text("Stable frames"),
                );

                ui.separator();

                ui.heading("Outputs");
                ui.add(
                    egui::Slider::new(&mut self.config.output.rotation_increment, 0.001..=0.1)
                        .logarithmic(true)
                        .text("Rotation step (rad)"),
                );

                ui.separator();

                ui.heading("Session");
                ui.checkbox(&mut self.config.session.record, "Record sessions");
                ui.label("Output Directory:");
                ui.label(self.config.session.output_directory.display().to_string());

                ui.separator();

                ui.heading("Audio");
                ui.label("Track:");
                ui.label(self.sink.player.track().display().to_string());
            });
    }

    fn render_about_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("About")
            .open(&mut self.show_about)
            .resizable(false)
            .default_size([400.0, 300.0])
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Gesture Control");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(20.0);
                    ui.label("✋ open palm: Jordano overlay");
                    ui.label("🤏 pinch: rotate the 3D object");
                    ui.label("✊ fist: play music");
                    ui.label("👍 thumbs up: Piolín overlay");
                    ui.label("✌ peace sign: stop music");
                });
            });
    }
}
