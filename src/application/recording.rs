//! Recording session use case
//!
//! Drives one consultation recording through
//! `Idle -> Recording <-> Paused -> Finalizing -> Stopped`, with `Failed`
//! reachable from any device or storage error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::error::{InputError, MissingFields};
use crate::domain::patient::PatientMetadata;
use crate::domain::recording::{
    canonical_destination, check_sample_rate, normalize_audio_extension, ElapsedTime,
    SessionState, DEFAULT_AUDIO_EXTENSION,
};

use super::ports::{
    AudioDevice, Clock, DeviceError, DeviceHandle, Permission, RecordingPreset, StorageError,
    StorageMover, TickHandle,
};

/// Period of the elapsed-time tick
pub const TICK_INTERVAL: StdDuration = StdDuration::from_secs(1);

/// Errors from the recording session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error(transparent)]
    Validation(#[from] MissingFields),

    #[error("Invalid recording settings: {0}")]
    InvalidConfig(#[from] InputError),

    #[error("Recording device error: {0}")]
    Device(#[from] DeviceError),

    /// The finished capture could not be moved. `kept` is the staged
    /// file, left in place so the audio is not lost.
    #[error("Failed to store recording: {source}{}", kept_note(.kept))]
    Storage {
        source: StorageError,
        kept: Option<PathBuf>,
    },
}

fn kept_note(kept: &Option<PathBuf>) -> String {
    match kept {
        Some(path) => format!(" (audio kept at {})", path.display()),
        None => String::new(),
    }
}

impl SessionError {
    /// Whether the session survived the error and the caller may retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::Validation(_) | Self::InvalidConfig(_)
        )
    }
}

/// Where and how finished recordings are stored
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub recordings_dir: PathBuf,
    /// Canonical extension given to moved recordings
    pub audio_extension: String,
    pub preset: RecordingPreset,
}

impl SessionConfig {
    pub fn new(recordings_dir: impl Into<PathBuf>) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            audio_extension: DEFAULT_AUDIO_EXTENSION.to_string(),
            preset: RecordingPreset::high_quality(),
        }
    }

    pub fn with_audio_extension(mut self, extension: impl Into<String>) -> Self {
        self.audio_extension = extension.into();
        self
    }

    pub fn with_preset(mut self, preset: RecordingPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Check the settings against a device producing `native_extension`
    /// files. Stored recordings must be told apart from staged ones.
    pub fn validate(&self, native_extension: &str) -> Result<(), InputError> {
        let extension = normalize_audio_extension(&self.audio_extension)?;
        if extension.eq_ignore_ascii_case(native_extension.trim_start_matches('.')) {
            return Err(InputError::ReservedExtension(extension));
        }
        check_sample_rate(self.preset.sample_rate)?;
        Ok(())
    }
}

/// Handed to the caller after a successful stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingResult {
    /// Final location of the audio file
    pub uri: PathBuf,
    /// Duration counted before the counter was reset
    pub elapsed: ElapsedTime,
    pub metadata: PatientMetadata,
    pub size_bytes: u64,
}

#[derive(Debug)]
struct ActiveTimer {
    handle: TickHandle,
    live: Arc<AtomicBool>,
}

/// State of one recording.
///
/// The timer exists only while `Recording`; the device handle only while
/// `Recording` or `Paused`.
#[derive(Debug)]
pub struct RecordingSession {
    state: SessionState,
    device: Option<DeviceHandle>,
    timer: Option<ActiveTimer>,
    elapsed: Arc<AtomicU64>,
    result_uri: Option<PathBuf>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            device: None,
            timer: None,
            elapsed: Arc::new(AtomicU64::new(0)),
            result_uri: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed(&self) -> ElapsedTime {
        ElapsedTime::from_secs(self.elapsed.load(Ordering::SeqCst))
    }

    /// Set only after a successful stop
    pub fn result_uri(&self) -> Option<&Path> {
        self.result_uri.as_deref()
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_some()
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Recording session controller
pub struct RecordingSessionController<D, C, S>
where
    D: AudioDevice,
    C: Clock,
    S: StorageMover,
{
    device: D,
    clock: C,
    storage: S,
    config: SessionConfig,
    session: RecordingSession,
}

impl<D, C, S> RecordingSessionController<D, C, S>
where
    D: AudioDevice,
    C: Clock,
    S: StorageMover,
{
    /// Create a controller holding a fresh `Idle` session
    pub fn new(device: D, clock: C, storage: S, config: SessionConfig) -> Self {
        Self {
            device,
            clock,
            storage,
            config,
            session: RecordingSession::new(),
        }
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn elapsed(&self) -> ElapsedTime {
        self.session.elapsed()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ask for the microphone and begin capturing.
    ///
    /// No-op unless the session is `Idle`. Invalid settings and a refused
    /// permission leave the session `Idle`.
    pub async fn start(&mut self) -> Result<SessionState, SessionError> {
        if self.session.state != SessionState::Idle {
            debug!(state = %self.session.state, "start ignored");
            return Ok(self.session.state);
        }
        if let Err(e) = self.config.validate(self.device.native_extension()) {
            warn!(error = %e, "start rejected, invalid settings");
            return Err(e.into());
        }

        match self.device.request_permission().await {
            Ok(Permission::Granted) => {}
            Ok(Permission::Denied) => {
                warn!("microphone permission denied");
                return Err(SessionError::PermissionDenied);
            }
            Err(e) => return Err(self.fail(e.into()).await),
        }

        let handle = match self.device.open(self.config.preset).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e.into()).await),
        };
        let started = self.device.start(&handle).await;
        self.session.device = Some(handle);
        if let Err(e) = started {
            return Err(self.fail(e.into()).await);
        }

        self.session.state = SessionState::Recording;
        self.start_ticking();
        info!(
            sample_rate = self.config.preset.sample_rate,
            "recording started"
        );
        Ok(self.session.state)
    }

    /// Pause while recording, resume while paused. No-op otherwise.
    pub async fn toggle_pause(&mut self) -> Result<SessionState, SessionError> {
        match self.session.state {
            SessionState::Recording => {
                self.stop_ticking();
                let paused = match &self.session.device {
                    Some(handle) => self.device.pause(handle).await,
                    None => return Ok(self.session.state),
                };
                if let Err(e) = paused {
                    return Err(self.fail(e.into()).await);
                }
                self.session.state = SessionState::Paused;
                info!(elapsed = %self.session.elapsed(), "recording paused");
            }
            SessionState::Paused => {
                let resumed = match &self.session.device {
                    Some(handle) => self.device.resume(handle).await,
                    None => return Ok(self.session.state),
                };
                if let Err(e) = resumed {
                    return Err(self.fail(e.into()).await);
                }
                self.session.state = SessionState::Recording;
                self.start_ticking();
                info!(elapsed = %self.session.elapsed(), "recording resumed");
            }
            state => debug!(%state, "pause ignored"),
        }
        Ok(self.session.state)
    }

    /// Finish the recording and move it into the recordings directory.
    ///
    /// # Returns
    /// `None` when there is no open recording. Missing metadata is rejected
    /// before anything is touched, leaving the session as it was.
    pub async fn stop(
        &mut self,
        metadata: &PatientMetadata,
    ) -> Result<Option<RecordingResult>, SessionError> {
        if !self.session.state.holds_device() {
            debug!(state = %self.session.state, "stop ignored");
            return Ok(None);
        }
        if let Err(missing) = metadata.validate() {
            warn!(fields = ?missing.fields, "stop rejected, metadata incomplete");
            return Err(missing.into());
        }

        self.stop_ticking();
        let elapsed = self.session.elapsed();
        self.session.state = SessionState::Finalizing;

        let Some(handle) = self.session.device.take() else {
            let e = DeviceError::FinalizeFailed("no open recording".to_string());
            return Err(self.fail(e.into()).await);
        };
        let source = match self.device.finalize(handle).await {
            Ok(path) => path,
            Err(e) => return Err(self.fail(e.into()).await),
        };
        let (uri, size_bytes) = match self.persist(&source).await {
            Ok(stored) => stored,
            Err(e) => {
                let kept = self.storage.stat(&source).await.ok().map(|info| info.path);
                let err = SessionError::Storage { source: e, kept };
                return Err(self.fail(err).await);
            }
        };

        self.session.elapsed.store(0, Ordering::SeqCst);
        self.session.state = SessionState::Stopped;
        self.session.result_uri = Some(uri.clone());
        info!(uri = %uri.display(), %elapsed, size_bytes, "recording stopped");

        Ok(Some(RecordingResult {
            uri,
            elapsed,
            metadata: metadata.clone(),
            size_bytes,
        }))
    }

    /// Poll the device while it holds a recording. A broken capture
    /// moves the session to `Failed`.
    pub async fn check_device(&mut self) -> Result<SessionState, SessionError> {
        let health = match &self.session.device {
            Some(handle) => self.device.health(handle).await,
            None => return Ok(self.session.state),
        };
        if let Err(e) = health {
            return Err(self.fail(e.into()).await);
        }
        Ok(self.session.state)
    }

    /// Abandon the recording and discard its audio.
    pub async fn cancel(&mut self) -> SessionState {
        if !self.session.state.holds_device() {
            return self.session.state;
        }

        self.stop_ticking();
        if let Some(handle) = self.session.device.take() {
            match self.device.finalize(handle).await {
                Ok(path) => {
                    if let Err(e) = self.storage.remove(&path).await {
                        warn!(error = %e, "failed to discard canceled recording");
                    }
                }
                Err(e) => warn!(error = %e, "failed to close canceled recording"),
            }
        }

        self.session.elapsed.store(0, Ordering::SeqCst);
        self.session.state = SessionState::Stopped;
        info!("recording canceled");
        self.session.state
    }

    /// Replace a finished session with a fresh `Idle` one.
    ///
    /// # Returns
    /// `false` if the current session is still in use
    pub fn new_session(&mut self) -> bool {
        if !self.session.state.is_terminal() {
            return false;
        }
        self.session = RecordingSession::new();
        debug!("new recording session");
        true
    }

    async fn persist(&self, source: &Path) -> Result<(PathBuf, u64), StorageError> {
        let info = self.storage.stat(source).await?;
        let destination = canonical_destination(
            &info.path,
            &self.config.recordings_dir,
            &self.config.audio_extension,
        )
        .ok_or_else(|| StorageError::InvalidPath(info.path.clone()))?;

        self.storage.move_file(&info.path, &destination).await?;
        Ok((destination, info.size))
    }

    /// Release everything the session holds and mark it `Failed`.
    /// Audio captured before the failure is discarded.
    async fn fail(&mut self, err: SessionError) -> SessionError {
        self.stop_ticking();
        if let Some(handle) = self.session.device.take() {
            match self.device.finalize(handle).await {
                Ok(path) => {
                    if let Err(e) = self.storage.remove(&path).await {
                        warn!(path = %path.display(), error = %e, "failed to discard partial recording");
                    }
                }
                Err(e) => warn!(error = %e, "failed to close recording"),
            }
        }
        self.session.state = SessionState::Failed;
        error!(error = %err, "recording session failed");
        err
    }

    fn start_ticking(&mut self) {
        self.stop_ticking();

        let live = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&live);
        let elapsed = Arc::clone(&self.session.elapsed);
        let handle = self.clock.every(
            TICK_INTERVAL,
            Arc::new(move || {
                if flag.load(Ordering::SeqCst) {
                    elapsed.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );
        self.session.timer = Some(ActiveTimer { handle, live });
    }

    fn stop_ticking(&mut self) {
        if let Some(timer) = self.session.timer.take() {
            // A tick racing the cancel must not count
            timer.live.store(false, Ordering::SeqCst);
            self.clock.cancel(timer.handle);
        }
    }
}

impl<D, C, S> Drop for RecordingSessionController<D, C, S>
where
    D: AudioDevice,
    C: Clock,
    S: StorageMover,
{
    fn drop(&mut self) {
        self.stop_ticking();
    }
}
