// src/data.rs - Per-frame session recording and export
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::classifier::Gesture;
use crate::error::Result;
use crate::orchestrator::FrameReport;
use crate::output::{AudioCommand, Overlay, OutputState};

#[derive(Debug, Serialize)]
struct GestureRecord {
    frame: u64,
    timestamp: f64,
    hand_detected: bool,
    dropped: bool,
    raw_gesture: Option<String>,
    gesture: Option<String>,
    // Thumb-first bit string, e.g. "01100"
    extension: Option<String>,
    status: String,
    overlay: Option<String>,
    audio: Option<String>,
    render_visible: bool,
    rotation_x: f64,
    rotation_y: f64,
    audio_playing: bool,
    active_overlay: String,
}

pub struct SessionRecorder {
    output_dir: PathBuf,
    session_name: String,
    session_id: Uuid,
    records: Vec<GestureRecord>,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            session_id: Uuid::new_v4(),
            records: Vec::new(),
        }
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn frame_count(&self) -> usize {
        self.records.len()
    }

    /// Records a processed frame together with the state it left behind.
    pub fn record(&mut self, report: &FrameReport, state: &OutputState) {
        let primary = report.classifications.first();
        let commands = &report.commands;

        self.records.push(GestureRecord {
            frame: self.records.len() as u64,
            timestamp: report.timestamp,
            hand_detected: report.hands_detected > 0,
            dropped: false,
            raw_gesture: primary.map(|c| c.raw.to_string()),
            gesture: Some(commands.gesture.to_string()),
            extension: primary.map(|c| c.extension.to_string()),
            status: commands.status_text.clone(),
            overlay: match commands.overlay.kind {
                Overlay::None => None,
                kind => Some(format!("{:?}", kind)),
            },
            audio: match commands.audio {
                AudioCommand::None => None,
                command => Some(format!("{:?}", command)),
            },
            render_visible: commands.render.visible,
            rotation_x: state.rotation.x,
            rotation_y: state.rotation.y,
            audio_playing: state.audio_playing,
            active_overlay: format!("{:?}", state.active_overlay),
        });
    }

    /// Records a frame that was rejected; the state columns show what was kept.
    pub fn record_dropped(&mut self, timestamp: f64, hands_detected: usize, state: &OutputState) {
        self.records.push(GestureRecord {
            frame: self.records.len() as u64,
            timestamp,
            hand_detected: hands_detected > 0,
            dropped: true,
            raw_gesture: None,
            gesture: None,
            extension: None,
            status: state.status_text.clone(),
            overlay: None,
            audio: None,
            render_visible: state.three_d_visible,
            rotation_x: state.rotation.x,
            rotation_y: state.rotation.y,
            audio_playing: state.audio_playing,
            active_overlay: format!("{:?}", state.active_overlay),
        });
    }

    /// Frames per reported gesture, in `Gesture::ALL` order.
    pub fn gesture_counts(&self) -> Vec<(Gesture, usize)> {
        Gesture::ALL
            .iter()
            .map(|gesture| {
                let count = self
                    .records
                    .iter()
                    .filter(|r| r.gesture.as_deref() == Some(gesture.name()))
                    .count();
                (*gesture, count)
            })
            .collect()
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("gestures.csv");

        // Create directory if it doesn't exist
        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&csv_path)?;
        let mut writer = Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!("Exported {} frames to {}", self.records.len(), csv_path.display());
        Ok(csv_path)
    }

    pub fn generate_report(&self) -> Result<PathBuf> {
        let report_path = self.session_dir().join("report.html");

        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&report_path, self.create_html_report())?;
        Ok(report_path)
    }

    fn create_html_report(&self) -> String {
        let total_frames = self.records.len();
        let dropped = self.records.iter().filter(|r| r.dropped).count();
        let with_hand = self.records.iter().filter(|r| r.hand_detected).count();
        let percent = |n: usize| {
            if total_frames == 0 {
                0.0
            } else {
                n as f64 / total_frames as f64 * 100.0
            }
        };

        let rows: String = self
            .gesture_counts()
            .iter()
            .map(|(gesture, count)| {
                format!(
                    "        <tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                    gesture,
                    count,
                    percent(*count)
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Gesture Session Report - {name}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        td, th {{ padding: 4px 16px; text-align: left; }}
    </style>
</head>
<body>
    <h1>Gesture Session Report</h1>
    <div class="stats">
        <h2>Session: {name}</h2>
        <p>Session id: {id}</p>
        <p>Total frames: {total}</p>
        <p>Frames with a hand: {with_hand} ({hand_pct:.1}%)</p>
        <p>Dropped frames: {dropped}</p>
        <table>
        <tr><th>Gesture</th><th>Frames</th><th>Share</th></tr>
{rows}        </table>
    </div>
</body>
</html>
"#,
            name = self.session_name,
            id = self.session_id,
            total = total_frames,
            with_hand = with_hand,
            hand_pct = percent(with_hand),
            dropped = dropped,
            rows = rows,
        )
    }
}
