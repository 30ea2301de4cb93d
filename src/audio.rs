// src/audio.rs - Background music playback
use crate::{Error, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub type TrackDecoder = Decoder<BufReader<File>>;

/// Default track, relative to the working directory.
pub const DEFAULT_TRACK: &str = "assets/musica.mp3";

/// Plays one track from its beginning. `start` while already playing is a
/// no-op; `stop` halts and rewinds, so the next `start` plays from the top.
///
/// The output device is opened on the first `start` whose track decodes, and
/// kept until the player is dropped.
pub struct MusicPlayer {
    track: PathBuf,
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    started: Option<Instant>,
}

impl MusicPlayer {
    pub fn new(track: impl Into<PathBuf>) -> Self {
        Self {
            track: track.into(),
            output: None,
            sink: None,
            started: None,
        }
    }

    pub fn track(&self) -> &Path {
        &self.track
    }

    /// False once stopped or once the track has played to its end.
    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().map_or(false, |sink| !sink.empty())
    }

    pub fn position(&self) -> Duration {
        match self.started {
            Some(started) if self.is_playing() => started.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }

        let source = open_track(&self.track)?;
        let sink = Sink::try_new(self.output_handle()?)
            .map_err(|e| Error::Collaborator(format!("Cannot open audio sink: {}", e)))?;
        sink.append(source);
        sink.play();

        self.sink = Some(sink);
        self.started = Some(Instant::now());
        tracing::info!("Playing {}", self.track.display());
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            tracing::info!("Music stopped");
        }
        self.started = None;
    }

    fn output_handle(&mut self) -> Result<&OutputStreamHandle> {
        let output = match self.output.take() {
            Some(output) => output,
            None => OutputStream::try_default()
                .map_err(|e| Error::Collaborator(format!("No audio output device: {}", e)))?,
        };
        Ok(&self.output.insert(output).1)
    }
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_TRACK)
    }
}

impl fmt::Debug for MusicPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MusicPlayer")
            .field("track", &self.track)
            .field("playing", &self.is_playing())
            .field("device_open", &self.output.is_some())
            .finish()
    }
}

/// Opens and decodes `path` without touching the audio device.
pub fn open_track(path: &Path) -> Result<TrackDecoder> {
    let file = File::open(path).map_err(|e| {
        Error::Collaborator(format!("Music file not found: {} ({})", path.display(), e))
    })?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| Error::Collaborator(format!("Cannot decode {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gesture_control_audio_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_track_is_collaborator_error() {
        let mut player = MusicPlayer::new("/nonexistent/gesture_control/musica.mp3");
        let err = player.start().unwrap_err();
        assert!(matches!(err, Error::Collaborator(_)), "got {:?}", err);
        assert!(err.to_string().contains("not found"));
        assert!(!player.is_playing());
        assert_eq!(player.position(), Duration::ZERO);
        // Device untouched
        assert!(player.output.is_none());
    }

    #[test]
    fn test_undecodable_track_is_collaborator_error() {
        let path = scratch_file("musica.mp3", b"plain text, not an audio stream");
        let mut player = MusicPlayer::new(&path);
        let err = player.start().unwrap_err();
        assert!(matches!(err, Error::Collaborator(_)), "got {:?}", err);
        assert!(err.to_string().contains("Cannot decode"));
        assert!(!player.is_playing());
        assert!(player.output.is_none());
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut player = MusicPlayer::default();
        player.stop();
        assert!(!player.is_playing());
        assert_eq!(player.track(), Path::new(DEFAULT_TRACK));
    }
}
