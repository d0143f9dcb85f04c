//! Timing instrumentation for media engine operations.
//!
//! Pipeline construction and seeks can stall the UI thread, so each call is
//! timed and slow ones are reported at a higher level.

use std::time::{Duration, Instant};

/// Log categories for filtering
enum LogCategory {
    Mount,
    Seek,
    Pause,
}

impl LogCategory {
    fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Mount => "MOUNT",
            LogCategory::Seek => "SEEK",
            LogCategory::Pause => "PAUSE",
        }
    }
}

pub fn log_mount_start(key: u64, source: &str) -> Instant {
    log::info!(
        "[{}] Instance {} mount START: {}",
        LogCategory::Mount.as_str(),
        key,
        source
    );
    Instant::now()
}

pub fn log_mount_complete(key: u64, start: Instant) {
    let elapsed_ms = start.elapsed().as_millis();

    if elapsed_ms > 1000 {
        log::warn!(
            "[{}] Instance {} mount SLOW: {}ms",
            LogCategory::Mount.as_str(),
            key,
            elapsed_ms
        );
    } else {
        log::info!(
            "[{}] Instance {} mount COMPLETE: {}ms",
            LogCategory::Mount.as_str(),
            key,
            elapsed_ms
        );
    }
}

pub fn log_mount_error(key: u64, error: &str, start: Instant) {
    log::error!(
        "[{}] Instance {} mount ERROR after {}ms: {}",
        LogCategory::Mount.as_str(),
        key,
        start.elapsed().as_millis(),
        error
    );
}

pub fn log_seek_start(key: u64, target: Duration) -> Instant {
    log::debug!(
        "[{}] Instance {} seek START: target={}s",
        LogCategory::Seek.as_str(),
        key,
        target.as_secs_f64()
    );
    Instant::now()
}

pub fn log_seek_complete(key: u64, start: Instant) {
    let elapsed_ms = start.elapsed().as_millis();

    if elapsed_ms > 2000 {
        log::error!(
            "[{}] Instance {} seek STALLED: {}ms",
            LogCategory::Seek.as_str(),
            key,
            elapsed_ms
        );
    } else if elapsed_ms > 500 {
        log::warn!(
            "[{}] Instance {} seek SLOW: {}ms",
            LogCategory::Seek.as_str(),
            key,
            elapsed_ms
        );
    } else {
        log::debug!(
            "[{}] Instance {} seek COMPLETE: {}ms",
            LogCategory::Seek.as_str(),
            key,
            elapsed_ms
        );
    }
}

pub fn log_seek_error(key: u64, error: &str, start: Instant) {
    log::error!(
        "[{}] Instance {} seek ERROR after {}ms: {}",
        LogCategory::Seek.as_str(),
        key,
        start.elapsed().as_millis(),
        error
    );
}

pub fn log_pause_toggle(key: u64, paused: bool) {
    log::debug!(
        "[{}] Instance {} paused={}",
        LogCategory::Pause.as_str(),
        key,
        paused
    );
}

pub fn log_instance_dropped(key: u64) {
    log::info!("Instance dropped: key={}", key);
}
