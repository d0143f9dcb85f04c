//! GStreamer-backed media engine.

use std::time::Duration;

use gstreamer::glib;
use iced_video_player::Video;

use crate::controller::{InstanceKey, MediaEngine, MediaEvent, MediaFlags, Signal};
use crate::error::PlaybackError;
use crate::gst_logger;

/// The video currently owned by the panel.
pub struct MountedClip {
    pub key: InstanceKey,
    pub video: Video,
    first_frame_seen: bool,
}

#[derive(Debug, Clone)]
struct PendingMount {
    key: InstanceKey,
    source: String,
    flags: MediaFlags,
}

/// Drives one `iced_video_player::Video` at a time.
///
/// GStreamer is initialised off the UI thread; until [`GstEngine::acquire`]
/// runs, mount requests are parked and the panel keeps its loading view.
#[derive(Default)]
pub struct GstEngine {
    acquired: bool,
    current: Option<MountedClip>,
    pending: Option<PendingMount>,
}

impl std::fmt::Debug for GstEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GstEngine")
            .field("acquired", &self.acquired)
            .field("current", &self.current.as_ref().map(|c| c.key))
            .field("pending", &self.pending.as_ref().map(|p| p.key))
            .finish()
    }
}

impl GstEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    pub fn current(&self) -> Option<&MountedClip> {
        self.current.as_ref()
    }

    /// Pipeline of the mounted instance, for bus monitoring.
    pub fn pipeline(&self) -> Option<(InstanceKey, gstreamer::Pipeline)> {
        self.current
            .as_ref()
            .map(|clip| (clip.key, clip.video.pipeline()))
    }

    /// Mark GStreamer as ready and mount whatever was requested meanwhile.
    ///
    /// Returns an error signal for the parked instance if mounting it fails.
    pub fn acquire(&mut self) -> Option<Signal> {
        self.acquired = true;
        log::info!("Media engine acquired");

        let pending = self.pending.take()?;
        self.open(pending.key, &pending.source, pending.flags)
            .err()
            .map(|err| Signal::new(pending.key, MediaEvent::Error(err)))
    }

    /// True exactly once per instance, on its first decoded frame.
    pub fn note_frame(&mut self, key: InstanceKey) -> bool {
        match self.current.as_mut() {
            Some(clip) if clip.key == key && !clip.first_frame_seen => {
                clip.first_frame_seen = true;
                true
            }
            _ => false,
        }
    }

    fn open(
        &mut self,
        key: InstanceKey,
        source: &str,
        flags: MediaFlags,
    ) -> Result<(), PlaybackError> {
        let url = url::Url::parse(source)
            .map_err(|e| PlaybackError::Mount(format!("{}: {}", source, e)))?;

        let start = gst_logger::log_mount_start(key, source);
        let mut video = Video::new(&url).map_err(|e| {
            gst_logger::log_mount_error(key, &e.to_string(), start);
            PlaybackError::Mount(e.to_string())
        })?;

        video.set_looping(flags.looped);
        if flags.muted {
            video.set_volume(0.0);
            video.set_muted(true);
        }
        video.set_paused(!flags.autoplay);
        // The panel always renders in place; there is no fullscreen handoff.
        debug_assert!(flags.inline);
        gst_logger::log_mount_complete(key, start);

        self.current = Some(MountedClip {
            key,
            video,
            first_frame_seen: false,
        });
        Ok(())
    }
}

impl MediaEngine for GstEngine {
    fn mount(
        &mut self,
        key: InstanceKey,
        source: &str,
        flags: MediaFlags,
    ) -> Result<(), PlaybackError> {
        // Fresh instance per key: the old pipeline goes away first.
        if let Some(old) = self.current.take() {
            gst_logger::log_instance_dropped(old.key);
        }

        if !self.acquired {
            log::debug!("Engine not acquired yet, parking mount for key {}", key);
            self.pending = Some(PendingMount {
                key,
                source: source.to_string(),
                flags,
            });
            return Ok(());
        }

        self.open(key, source, flags)
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let Some(clip) = self.current.as_mut() else {
            return Ok(());
        };

        let start = gst_logger::log_seek_start(clip.key, position);
        match clip.video.seek(position, true) {
            Ok(()) => {
                gst_logger::log_seek_complete(clip.key, start);
                Ok(())
            }
            Err(e) => {
                gst_logger::log_seek_error(clip.key, &e.to_string(), start);
                Err(PlaybackError::Engine(e.to_string()))
            }
        }
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let Some(clip) = self.current.as_mut() else {
            return Err(PlaybackError::Interrupted);
        };
        clip.video.set_paused(false);
        gst_logger::log_pause_toggle(clip.key, false);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(clip) = self.current.as_mut() {
            clip.video.set_paused(true);
            gst_logger::log_pause_toggle(clip.key, true);
        }
    }
}

/// Initialise GStreamer on a blocking worker.
pub async fn acquire_gstreamer() -> Result<(), String> {
    tokio::task::spawn_blocking(gstreamer::init)
        .await
        .map_err(|e| format!("media engine worker failed: {}", e))?
        .map_err(|e| format!("failed to initialise GStreamer: {}", e))
}

/// Map a pipeline error onto the playback error taxonomy.
pub fn classify(err: &glib::Error) -> PlaybackError {
    let message = err.message().to_string();
    if err.kind::<gstreamer::ResourceError>().is_some() {
        PlaybackError::Network(message)
    } else if err.kind::<gstreamer::StreamError>().is_some() {
        PlaybackError::Decode(message)
    } else {
        PlaybackError::Engine(message)
    }
}
