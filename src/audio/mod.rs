//! Audio post-processing: raw synthesis output -> playable file on disk.
//!
//! The pipeline is channel selection, peak normalization, energy-scaled
//! enhancement, truncation to the target duration, WAV/MP3 encoding and
//! temp-directory maintenance. Every sample stage is total; only file I/O
//! can fail.

mod encoder;
mod pool;
mod resample;
mod wav;

pub use encoder::Mp3Encoder;
pub use pool::TempFilePool;
pub use resample::resample;
pub use wav::{read_wav, write_wav};

use std::path::PathBuf;

use ndarray::{s, Array1, Array2, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AudioConfig;
use crate::math;
use crate::mood::MusicalParameters;

/// Synthesis output: rank 1 `[frames]`, rank 2 `[channels, frames]` or
/// rank 3 `[batch, channels, frames]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudioBuffer {
    pub samples: ArrayD<f32>,
    pub sample_rate: u32,
}

impl RawAudioBuffer {
    pub fn new(samples: ArrayD<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(Array1::from(samples).into_dyn(), sample_rate)
    }

    pub fn from_channels(samples: Array2<f32>, sample_rate: u32) -> Self {
        Self::new(samples.into_dyn(), sample_rate)
    }

    pub fn rank(&self) -> usize {
        self.samples.ndim()
    }

    /// Length of the time axis (last dimension)
    pub fn frames(&self) -> usize {
        self.samples.shape().last().copied().unwrap_or(0)
    }

    pub fn duration_s(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Resampling error: {0}")]
    Resample(String),

    #[error("Encoder not found: {0}")]
    EncoderUnavailable(String),

    #[error("Encoder failed: {0}")]
    EncoderFailed(String),
}

/// Container of a finished file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp3,
    Wav,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

// ============================================================================
// Sample stages
// ============================================================================

/// Reduce any buffer to `[channels, frames]`.
///
/// Rank 3 keeps the first batch element, rank 2 passes through, rank 1 becomes
/// one channel, and any other rank is flattened into one channel.
pub fn select_channels(samples: &ArrayD<f32>) -> Array2<f32> {
    let shape = samples.shape();
    match shape.len() {
        3 if shape[0] > 0 => Array2::from_shape_fn((shape[1], shape[2]), |(c, f)| {
            samples[IxDyn(&[0, c, f])]
        }),
        3 => Array2::zeros((shape[1], shape[2])),
        2 => Array2::from_shape_fn((shape[0], shape[1]), |(c, f)| samples[IxDyn(&[c, f])]),
        1 => Array2::from_shape_fn((1, shape[0]), |(_, f)| samples[IxDyn(&[f])]),
        _ => {
            let flat: Vec<f32> = samples.iter().copied().collect();
            Array2::from_shape_fn((1, flat.len()), |(_, f)| flat[f])
        }
    }
}

/// Scale so the peak magnitude is 1, then apply `volume`. Silent input is left as is.
pub fn normalize(samples: &mut Array2<f32>, volume: f32) {
    let peak = math::peak_abs(samples.iter());
    if peak > 0.0 {
        samples.mapv_inplace(|x| x / peak * volume);
    }
}

/// Gain applied for an energy level: 0.3 at energy 0 up to 1.0 at energy 10
pub fn energy_gain(energy: u8) -> f32 {
    0.3 + (energy.min(10) as f32 / 10.0) * 0.7
}

/// Apply the energy gain and hard-clip to [-1, 1]; non-finite samples become 0.
pub fn enhance(samples: &mut Array2<f32>, energy: u8) {
    let gain = energy_gain(energy);
    samples.mapv_inplace(|x| {
        if x.is_finite() {
            (x * gain).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    });
}

/// Drop frames beyond `max_frames`; shorter buffers are kept as they are.
pub fn truncate(samples: Array2<f32>, max_frames: usize) -> Array2<f32> {
    if samples.ncols() <= max_frames {
        return samples;
    }
    samples.slice(s![.., ..max_frames]).to_owned()
}

/// `<mood>_<timestamp>_<short id>` without extension
pub fn file_stem(params: &MusicalParameters) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        params.mood_category,
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        &id[..8]
    )
}

// ============================================================================
// Processor
// ============================================================================

/// Turns raw synthesis output into a file in the temp directory.
#[derive(Debug)]
pub struct AudioPostProcessor {
    config: AudioConfig,
    encoder: Mp3Encoder,
    pool: TempFilePool,
}

impl AudioPostProcessor {
    pub fn new(config: AudioConfig) -> Result<Self, ProcessingError> {
        let pool = TempFilePool::new(&config.temp_dir, config.max_temp_files)?;
        let encoder = Mp3Encoder::new(config.encoder_command.clone(), config.bitrate_kbps);

        info!(
            temp_dir = %pool.dir().display(),
            max_files = pool.capacity(),
            encoder = %encoder.command(),
            "Audio post-processor ready"
        );

        Ok(Self {
            config,
            encoder,
            pool,
        })
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn encoder(&self) -> &Mp3Encoder {
        &self.encoder
    }

    pub fn pool(&self) -> &TempFilePool {
        &self.pool
    }

    /// Output format a successful encode produces with the current encoder
    pub fn preferred_format(&self) -> OutputFormat {
        if self.encoder.is_available() {
            OutputFormat::Mp3
        } else {
            OutputFormat::Wav
        }
    }

    /// Run the sample stages without touching the filesystem
    pub fn prepare(&self, buffer: &RawAudioBuffer, params: &MusicalParameters) -> Array2<f32> {
        let mut samples = select_channels(&buffer.samples);

        if self.config.normalization_enabled {
            normalize(&mut samples, self.config.volume_factor);
        }
        enhance(&mut samples, params.energy_level);

        truncate(samples, self.config.max_frames(buffer.sample_rate))
    }

    /// Process a buffer into a file and return its path.
    ///
    /// Stages run in order: channel selection, peak normalization (when
    /// enabled), energy gain with clipping, truncation to the configured
    /// duration. The result is written as a 16-bit WAV; if the encoder is
    /// available it is converted to MP3 and the WAV removed. A failed encode
    /// keeps the WAV. The temp pool is trimmed afterwards.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Raw synthesis output of any rank
    /// * `params` - Supplies the energy level and the file name's mood
    ///
    /// # Returns
    ///
    /// Path of the deliverable, `.mp3` or `.wav`, inside the temp directory.
    pub fn process(
        &self,
        buffer: RawAudioBuffer,
        params: &MusicalParameters,
    ) -> Result<PathBuf, ProcessingError> {
        let samples = self.prepare(&buffer, params);
        debug!(
            rank = buffer.rank(),
            channels = samples.nrows(),
            frames = samples.ncols(),
            sample_rate = buffer.sample_rate,
            "Prepared audio"
        );

        let stem = file_stem(params);
        let wav_path = self.pool.dir().join(format!("{stem}.{}", OutputFormat::Wav.extension()));
        write_wav(&wav_path, &samples, buffer.sample_rate)?;

        let path = if self.encoder.is_available() {
            let mp3_path = self.pool.dir().join(format!("{stem}.{}", OutputFormat::Mp3.extension()));
            match self.encoder.encode(&wav_path, &mp3_path, self.config.duration_s) {
                Ok(()) => {
                    if let Err(e) = std::fs::remove_file(&wav_path) {
                        warn!(path = %wav_path.display(), error = %e, "Failed to remove intermediate WAV");
                    }
                    mp3_path
                }
                Err(e) => {
                    warn!(error = %e, "MP3 encoding failed, delivering WAV");
                    let _ = std::fs::remove_file(&mp3_path);
                    wav_path
                }
            }
        } else {
            debug!("MP3 encoder unavailable, delivering WAV");
            wav_path
        };

        if let Err(e) = self.pool.enforce() {
            warn!(error = %e, "Temp file cleanup failed");
        }

        info!(path = %path.display(), "Audio processed");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn test_config(dir: &std::path::Path) -> AudioConfig {
        AudioConfig {
            sample_rate: 8_000,
            duration_s: 0.5,
            temp_dir: dir.to_path_buf(),
            max_temp_files: 3,
            encoder_command: "/nonexistent/ffmpeg".to_string(),
            ..AudioConfig::default()
        }
    }

    #[test]
    fn test_select_channels_by_rank() {
        let batched = Array3::from_shape_fn((2, 2, 4), |(b, c, f)| (b * 100 + c * 10 + f) as f32);
        let out = select_channels(&batched.into_dyn());
        assert_eq!(out.dim(), (2, 4));
        assert_eq!(out[[1, 3]], 13.0);

        let mono = RawAudioBuffer::mono(vec![0.1, 0.2, 0.3], 8_000);
        assert_eq!(select_channels(&mono.samples).dim(), (1, 3));

        let rank4 = ArrayD::from_elem(IxDyn(&[1, 1, 2, 3]), 0.5f32);
        assert_eq!(select_channels(&rank4).dim(), (1, 6));
    }

    #[test]
    fn test_normalize_scales_to_volume() {
        let mut samples = Array2::from_shape_vec((1, 3), vec![0.25, -0.5, 0.1]).unwrap();
        normalize(&mut samples, 0.7);
        assert!((samples[[0, 1]] + 0.7).abs() < 1e-6);

        let mut silent = Array2::<f32>::zeros((1, 4));
        normalize(&mut silent, 0.7);
        assert!(silent.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_enhance_clips_and_scrubs() {
        let mut samples =
            Array2::from_shape_vec((1, 4), vec![2.0, -3.0, f32::NAN, 0.5]).unwrap();
        enhance(&mut samples, 10);
        assert_eq!(samples[[0, 0]], 1.0);
        assert_eq!(samples[[0, 1]], -1.0);
        assert_eq!(samples[[0, 2]], 0.0);
        assert!((samples[[0, 3]] - 0.5).abs() < 1e-6);
        assert!(samples.iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[test]
    fn test_energy_gain() {
        assert!((energy_gain(0) - 0.3).abs() < 1e-6);
        assert!((energy_gain(5) - 0.65).abs() < 1e-6);
        assert!((energy_gain(10) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_truncate_never_pads() {
        let long = Array2::<f32>::zeros((2, 100));
        assert_eq!(truncate(long, 40).dim(), (2, 40));

        let short = Array2::<f32>::zeros((2, 10));
        assert_eq!(truncate(short, 40).dim(), (2, 10));
    }

    #[test]
    fn test_process_writes_wav_without_encoder() {
        let tmp = tempfile::tempdir().unwrap();
        let processor = AudioPostProcessor::new(test_config(tmp.path())).unwrap();
        assert_eq!(processor.preferred_format(), OutputFormat::Wav);

        let buffer = RawAudioBuffer::mono(vec![0.3; 8_000], 8_000);
        let params = MusicalParameters::default();
        let path = processor.process(buffer, &params).unwrap();

        assert_eq!(path.extension().unwrap(), "wav");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("calm_"));

        // 1 s of input, capped at 0.5 s
        let (decoded, rate) = read_wav(&path).unwrap();
        assert_eq!(rate, 8_000);
        assert_eq!(decoded.ncols(), 4_000);
    }

    /// Encoder that answers `-version`, records its arguments one per line
    /// and writes a stub file to its last argument
    #[cfg(unix)]
    const FAKE_ENCODER: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then exit 0; fi
printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
for last in "$@"; do :; done
printf 'ID3stub' > "$last"
"#;

    /// Encoder that starts writing its output and then fails
    #[cfg(unix)]
    const BROKEN_ENCODER: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then exit 0; fi
for last in "$@"; do :; done
printf 'partial' > "$last"
echo 'Unknown encoder libmp3lame' >&2
exit 1
"#;

    #[cfg(unix)]
    fn install_encoder(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn files_with_extension(dir: &std::path::Path, ext: &str) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == ext))
            .count()
    }

    #[cfg(unix)]
    #[test]
    fn test_process_encodes_mp3_and_removes_wav() {
        let bin = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let config = AudioConfig {
            encoder_command: install_encoder(bin.path(), FAKE_ENCODER),
            ..test_config(tmp.path())
        };
        let processor = AudioPostProcessor::new(config).unwrap();
        assert_eq!(processor.preferred_format(), OutputFormat::Mp3);

        let buffer = RawAudioBuffer::mono(vec![0.3; 8_000], 8_000);
        let path = processor.process(buffer, &MusicalParameters::default()).unwrap();

        assert_eq!(path.extension().unwrap(), "mp3");
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3stub");
        assert_eq!(files_with_extension(tmp.path(), "wav"), 0);
        assert_eq!(files_with_extension(tmp.path(), "mp3"), 1);

        let args = std::fs::read_to_string(bin.path().join("args.txt")).unwrap();
        let args: Vec<&str> = args.lines().collect();
        let t = args.iter().position(|a| *a == "-t").unwrap();
        assert_eq!(args[t + 1], "0.500");
        let b = args.iter().position(|a| *a == "-b:a").unwrap();
        assert_eq!(args[b + 1], "192k");
        assert_eq!(args.last().copied(), path.to_str());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_encode_delivers_wav() {
        let bin = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let config = AudioConfig {
            encoder_command: install_encoder(bin.path(), BROKEN_ENCODER),
            ..test_config(tmp.path())
        };
        let processor = AudioPostProcessor::new(config).unwrap();

        let buffer = RawAudioBuffer::mono(vec![0.3; 8_000], 8_000);
        let path = processor.process(buffer, &MusicalParameters::default()).unwrap();

        assert_eq!(path.extension().unwrap(), "wav");
        assert!(path.exists());
        assert_eq!(files_with_extension(tmp.path(), "mp3"), 0);
    }

    #[test]
    fn test_process_enforces_pool_capacity() {
        let tmp = tempfile::tempdir().unwrap();
        let processor = AudioPostProcessor::new(test_config(tmp.path())).unwrap();
        let params = MusicalParameters::default();

        let mut last = PathBuf::new();
        for _ in 0..5 {
            let buffer = RawAudioBuffer::mono(vec![0.1; 800], 8_000);
            last = processor.process(buffer, &params).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let files = processor.pool().files().unwrap();
        assert_eq!(files.len(), 3);
        assert!(last.exists());
    }
}
