//! Microphone capture using cpal
//!
//! Each open handle owns a capture thread, since `cpal::Stream` is not
//! `Send`. Samples are downmixed to mono as they arrive and kept in memory
//! until finalize, which resamples them to the preset rate, encodes FLAC
//! and writes a staging file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use super::flac_encoder::encode_to_flac;
use crate::application::ports::{
    AudioDevice, DeviceError, DeviceHandle, Permission, RecordingPreset,
};

/// Extension of staged captures, replaced when the session stores them
pub const STAGING_EXTENSION: &str = "partial";

const POLL_INTERVAL: StdDuration = StdDuration::from_millis(50);

/// Shared between the capture thread and the async side
#[derive(Default)]
struct CaptureBuffers {
    samples: StdMutex<Vec<i16>>,
    device_rate: AtomicU32,
    /// Samples are kept only while set; cleared on pause
    capturing: AtomicBool,
    /// The thread holds the stream open while set
    alive: AtomicBool,
    /// First error reported by the stream; capture is over once set
    fault: StdMutex<Option<String>>,
}

struct Capture {
    preset: RecordingPreset,
    /// Unix seconds at open, keeps file names unique across runs
    opened_at: u64,
    buffers: Arc<CaptureBuffers>,
    thread: Option<JoinHandle<()>>,
}

/// Audio device backed by the default cpal input
pub struct CpalDevice {
    staging_dir: PathBuf,
    next_id: AtomicU64,
    captures: StdMutex<HashMap<u64, Capture>>,
}

impl CpalDevice {
    /// Finalized captures are written into `staging_dir`
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            next_id: AtomicU64::new(1),
            captures: StdMutex::new(HashMap::new()),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    fn captures(&self) -> MutexGuard<'_, HashMap<u64, Capture>> {
        self.captures.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn buffers(&self, handle: &DeviceHandle) -> Result<Arc<CaptureBuffers>, DeviceError> {
        self.captures()
            .get(&handle.id())
            .map(|c| Arc::clone(&c.buffers))
            .ok_or(DeviceError::UnknownHandle(handle.id()))
    }

    fn input_device() -> Result<cpal::Device, DeviceError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(DeviceError::NoInputDevice)
    }

    /// Pick an input config, preferring fewer channels and one that
    /// supports `target_rate` natively
    fn input_config(
        device: &cpal::Device,
        target_rate: u32,
    ) -> Result<(StreamConfig, SampleFormat), DeviceError> {
        let supported = device
            .supported_input_configs()
            .map_err(|e| DeviceError::OpenFailed(format!("Failed to get configs: {}", e)))?;

        let includes_target = |range: &cpal::SupportedStreamConfigRange| {
            range.min_sample_rate().0 <= target_rate && range.max_sample_rate().0 >= target_rate
        };

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for range in supported {
            if !matches!(range.sample_format(), SampleFormat::I16 | SampleFormat::F32) {
                continue;
            }
            let better = match &best {
                None => true,
                Some(current) => {
                    range.channels() < current.channels()
                        || (includes_target(&range) && !includes_target(current))
                }
            };
            if better {
                best = Some(range);
            }
        }

        let range = best.ok_or_else(|| DeviceError::OpenFailed("No suitable config found".into()))?;
        let sample_rate = if includes_target(&range) {
            SampleRate(target_rate)
        } else {
            range.min_sample_rate()
        };

        let config = StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, range.sample_format()))
    }

    /// `capture-<unix secs>-<id>.partial`
    fn staged_name(opened_at: u64, id: u64) -> String {
        format!("capture-{opened_at}-{id}.{STAGING_EXTENSION}")
    }

    /// Average interleaved channels into one
    fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return samples.to_vec();
        }
        samples
            .chunks(channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                (sum / i32::from(channels)) as i16
            })
            .collect()
    }

    fn resample(samples: &[i16], from: u32, to: u32) -> Result<Vec<i16>, DeviceError> {
        if from == to {
            return Ok(samples.to_vec());
        }

        let input: Vec<f32> = samples.iter().map(|&s| f32::from(s) / 32768.0).collect();
        let expected_len = (input.len() as f64 * f64::from(to) / f64::from(from)).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, 1024, 2, 1)
            .map_err(|e| DeviceError::FinalizeFailed(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(expected_len);
        let mut pos = 0;
        while pos < input.len() {
            let needed = resampler.input_frames_next();
            let end = (pos + needed).min(input.len());
            let mut chunk = input[pos..end].to_vec();
            chunk.resize(needed, 0.0);

            let resampled = resampler
                .process(&[chunk], None)
                .map_err(|e| DeviceError::FinalizeFailed(format!("Resampling failed: {}", e)))?;
            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            pos = end;
        }

        output.truncate(expected_len);
        Ok(output)
    }

    fn encode(samples: Vec<i16>, device_rate: u32, target_rate: u32) -> Result<Vec<u8>, DeviceError> {
        let resampled = Self::resample(&samples, device_rate, target_rate)?;
        encode_to_flac(&resampled, target_rate)
            .map_err(|e| DeviceError::FinalizeFailed(e.to_string()))
    }

    /// Body of the capture thread. Reports readiness once the stream plays,
    /// then keeps it open until `alive` is cleared.
    fn run_capture(
        buffers: Arc<CaptureBuffers>,
        target_rate: u32,
        ready: oneshot::Sender<Result<(), DeviceError>>,
    ) {
        let stream = match Self::build_stream(&buffers, target_rate) {
            Ok(stream) => stream,
            Err(e) => {
                buffers.alive.store(false, Ordering::SeqCst);
                let _ = ready.send(Err(e));
                return;
            }
        };
        if let Err(e) = stream.play() {
            buffers.alive.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(DeviceError::OpenFailed(e.to_string())));
            return;
        }
        let _ = ready.send(Ok(()));

        while buffers.alive.load(Ordering::SeqCst) {
            std::thread::sleep(POLL_INTERVAL);
        }
        drop(stream);
    }

    fn build_stream(
        buffers: &Arc<CaptureBuffers>,
        target_rate: u32,
    ) -> Result<cpal::Stream, DeviceError> {
        let device = Self::input_device()?;
        let (config, format) = Self::input_config(&device, target_rate)?;
        let channels = config.channels;
        buffers
            .device_rate
            .store(config.sample_rate.0, Ordering::SeqCst);

        let stream = match format {
            SampleFormat::I16 => {
                let sink = Arc::clone(buffers);
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        sink.push(&Self::downmix(data, channels));
                    },
                    Self::on_stream_error(buffers),
                    None,
                )
            }
            SampleFormat::F32 => {
                let sink = Arc::clone(buffers);
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let pcm: Vec<i16> = data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        sink.push(&Self::downmix(&pcm, channels));
                    },
                    Self::on_stream_error(buffers),
                    None,
                )
            }
            other => {
                return Err(DeviceError::OpenFailed(format!(
                    "Unsupported sample format: {other:?}"
                )))
            }
        };

        stream.map_err(|e| DeviceError::OpenFailed(e.to_string()))
    }

    fn on_stream_error(
        buffers: &Arc<CaptureBuffers>,
    ) -> impl FnMut(cpal::StreamError) + Send + 'static {
        let buffers = Arc::clone(buffers);
        move |err| {
            error!(error = %err, "audio stream error");
            buffers.record_fault(err.to_string());
        }
    }
}

impl CaptureBuffers {
    fn push(&self, mono: &[i16]) {
        if !self.capturing.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(mut samples) = self.samples.lock() {
            samples.extend_from_slice(mono);
        }
    }

    /// Stop capturing for good, keeping the first reported error
    fn record_fault(&self, message: String) {
        self.capturing.store(false, Ordering::SeqCst);
        self.alive.store(false, Ordering::SeqCst);
        let mut fault = self.fault.lock().unwrap_or_else(|e| e.into_inner());
        fault.get_or_insert(message);
    }

    fn fault(&self) -> Option<DeviceError> {
        self.fault
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|message| DeviceError::CaptureFailed(message.clone()))
    }

    /// Fails once the stream has errored or stopped
    fn check(&self) -> Result<(), DeviceError> {
        if let Some(err) = self.fault() {
            return Err(err);
        }
        if !self.alive.load(Ordering::SeqCst) {
            return Err(DeviceError::CaptureFailed("audio stream stopped".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AudioDevice for CpalDevice {
    /// Desktop hosts have no permission prompt; access is granted when an
    /// input device exists.
    async fn request_permission(&self) -> Result<Permission, DeviceError> {
        Self::input_device()?;
        Ok(Permission::Granted)
    }

    async fn open(&self, preset: RecordingPreset) -> Result<DeviceHandle, DeviceError> {
        Self::input_device()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.captures().insert(
            id,
            Capture {
                preset,
                opened_at: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default(),
                buffers: Arc::new(CaptureBuffers::default()),
                thread: None,
            },
        );
        debug!(id, sample_rate = preset.sample_rate, "capture opened");
        Ok(DeviceHandle::new(id))
    }

    async fn start(&self, handle: &DeviceHandle) -> Result<(), DeviceError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut captures = self.captures();
            let capture = captures
                .get_mut(&handle.id())
                .ok_or(DeviceError::UnknownHandle(handle.id()))?;
            if capture.thread.is_some() {
                return Err(DeviceError::CaptureFailed("capture already started".into()));
            }

            let buffers = Arc::clone(&capture.buffers);
            buffers.alive.store(true, Ordering::SeqCst);
            buffers.capturing.store(true, Ordering::SeqCst);
            let target_rate = capture.preset.sample_rate;
            capture.thread = Some(std::thread::spawn(move || {
                Self::run_capture(buffers, target_rate, tx)
            }));
        }

        rx.await
            .map_err(|_| DeviceError::OpenFailed("capture thread exited".into()))??;
        info!(id = handle.id(), "capture started");
        Ok(())
    }

    async fn pause(&self, handle: &DeviceHandle) -> Result<(), DeviceError> {
        let buffers = self.buffers(handle)?;
        buffers.check()?;
        buffers.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self, handle: &DeviceHandle) -> Result<(), DeviceError> {
        let buffers = self.buffers(handle)?;
        buffers.check()?;
        buffers.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn health(&self, handle: &DeviceHandle) -> Result<(), DeviceError> {
        self.buffers(handle)?.check()
    }

    async fn finalize(&self, handle: DeviceHandle) -> Result<PathBuf, DeviceError> {
        let id = handle.id();
        let mut capture = self
            .captures()
            .remove(&id)
            .ok_or(DeviceError::UnknownHandle(id))?;

        capture.buffers.capturing.store(false, Ordering::SeqCst);
        capture.buffers.alive.store(false, Ordering::SeqCst);
        if let Some(thread) = capture.thread.take() {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .map_err(|e| DeviceError::FinalizeFailed(format!("Join error: {}", e)))?
                .map_err(|_| DeviceError::FinalizeFailed("capture thread panicked".into()))?;
        }
        if let Some(err) = capture.buffers.fault() {
            return Err(err);
        }

        let samples = {
            let mut samples = capture.buffers.samples.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *samples)
        };
        if samples.is_empty() {
            return Err(DeviceError::FinalizeFailed("No audio data captured".into()));
        }

        let device_rate = capture.buffers.device_rate.load(Ordering::SeqCst);
        let target_rate = capture.preset.sample_rate;
        let flac = tokio::task::spawn_blocking(move || Self::encode(samples, device_rate, target_rate))
            .await
            .map_err(|e| DeviceError::FinalizeFailed(format!("Encode task error: {}", e)))??;

        let path = self
            .staging_dir
            .join(Self::staged_name(capture.opened_at, id));
        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|e| DeviceError::FinalizeFailed(e.to_string()))?;
        tokio::fs::write(&path, &flac)
            .await
            .map_err(|e| DeviceError::FinalizeFailed(e.to_string()))?;

        info!(id, path = %path.display(), bytes = flac.len(), "capture finalized");
        Ok(path)
    }

    fn native_extension(&self) -> &str {
        STAGING_EXTENSION
    }
}

impl Drop for CpalDevice {
    fn drop(&mut self) {
        for capture in self.captures().values() {
            capture.buffers.alive.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_mono_is_unchanged() {
        let mono = vec![100i16, 200, 300];
        assert_eq!(CpalDevice::downmix(&mono, 1), mono);
    }

    #[test]
    fn downmix_averages_frames() {
        let stereo = vec![100i16, 200, 300, 400];
        assert_eq!(CpalDevice::downmix(&stereo, 2), vec![150, 350]);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(CpalDevice::resample(&samples, 44_100, 44_100).unwrap(), samples);
    }

    #[test]
    fn resample_halves_length() {
        let samples = vec![0i16; 48_000];
        let out = CpalDevice::resample(&samples, 48_000, 24_000).unwrap();
        assert_eq!(out.len(), 24_000);
    }

    #[test]
    fn buffers_drop_samples_while_paused() {
        let buffers = CaptureBuffers::default();
        buffers.push(&[1, 2]);
        buffers.capturing.store(true, Ordering::SeqCst);
        buffers.push(&[3, 4]);
        buffers.capturing.store(false, Ordering::SeqCst);
        buffers.push(&[5]);

        assert_eq!(*buffers.samples.lock().unwrap(), vec![3, 4]);
    }

    #[tokio::test]
    async fn unknown_handle_is_rejected() {
        let device = CpalDevice::new(std::env::temp_dir());
        let err = device.pause(&DeviceHandle::new(99)).await.unwrap_err();
        assert!(matches!(err, DeviceError::UnknownHandle(99)));
        assert!(matches!(
            device.finalize(DeviceHandle::new(99)).await,
            Err(DeviceError::UnknownHandle(99))
        ));
    }

    #[test]
    fn first_stream_error_is_kept() {
        let buffers = CaptureBuffers::default();
        buffers.alive.store(true, Ordering::SeqCst);
        buffers.capturing.store(true, Ordering::SeqCst);
        assert!(buffers.check().is_ok());

        buffers.record_fault("device unplugged".to_string());
        buffers.record_fault("later error".to_string());
        buffers.push(&[1, 2]);

        assert!(!buffers.alive.load(Ordering::SeqCst));
        assert!(buffers.samples.lock().unwrap().is_empty());
        assert!(matches!(
            buffers.check(),
            Err(DeviceError::CaptureFailed(m)) if m == "device unplugged"
        ));
    }

    #[tokio::test]
    async fn stream_error_fails_pause_health_and_finalize() {
        let device = CpalDevice::new(std::env::temp_dir());
        let buffers = Arc::new(CaptureBuffers::default());
        buffers.alive.store(true, Ordering::SeqCst);
        buffers.samples.lock().unwrap().extend_from_slice(&[1, 2, 3]);
        device.captures().insert(
            5,
            Capture {
                preset: RecordingPreset::high_quality(),
                opened_at: 0,
                buffers: Arc::clone(&buffers),
                thread: None,
            },
        );
        let handle = DeviceHandle::new(5);
        assert!(device.health(&handle).await.is_ok());

        buffers.record_fault("stream disconnected".to_string());

        assert!(matches!(
            device.health(&handle).await,
            Err(DeviceError::CaptureFailed(_))
        ));
        assert!(matches!(
            device.pause(&handle).await,
            Err(DeviceError::CaptureFailed(_))
        ));
        assert!(matches!(
            device.resume(&handle).await,
            Err(DeviceError::CaptureFailed(_))
        ));
        assert!(matches!(
            device.finalize(handle).await,
            Err(DeviceError::CaptureFailed(m)) if m == "stream disconnected"
        ));
    }

    #[test]
    fn staged_name_includes_open_time() {
        assert_eq!(
            CpalDevice::staged_name(1_700_000_000, 3),
            "capture-1700000000-3.partial"
        );
    }

    #[test]
    fn stages_with_partial_extension() {
        let device = CpalDevice::new("/tmp/staging");
        assert_eq!(device.native_extension(), "partial");
        assert_eq!(device.staging_dir(), Path::new("/tmp/staging"));
    }
}
