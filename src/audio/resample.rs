//! Sample-rate conversion for multi-channel buffers.

use ndarray::Array2;
use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use super::ProcessingError;

const CHUNK_SIZE: usize = 1024;

/// Resample `[channels, frames]` audio from `from_rate` to `to_rate`.
///
/// Output length is `frames * to_rate / from_rate`, rounded down.
pub fn resample(
    samples: &Array2<f32>,
    from_rate: u32,
    to_rate: u32,
) -> Result<Array2<f32>, ProcessingError> {
    let (channels, frames) = samples.dim();
    if from_rate == to_rate || frames == 0 || channels == 0 {
        return Ok(samples.clone());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(ProcessingError::Resample(format!(
            "invalid sample rates {from_rate} -> {to_rate}"
        )));
    }

    let mut resampler =
        FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 1, channels)
            .map_err(|e| ProcessingError::Resample(format!("Resampler init failed: {e}")))?;

    let chunk_size = resampler.input_frames_max();
    let mut output: Vec<Vec<f32>> = vec![Vec::new(); channels];

    let mut start = 0;
    while start < frames {
        let end = (start + chunk_size).min(frames);
        let input: Vec<Vec<f32>> = samples
            .outer_iter()
            .map(|channel| {
                let mut chunk = channel.slice(ndarray::s![start..end]).to_vec();
                chunk.resize(chunk_size, 0.0);
                chunk
            })
            .collect();

        let resampled = resampler
            .process(&input, None)
            .map_err(|e| ProcessingError::Resample(format!("Resample failed: {e}")))?;

        for (out, chunk) in output.iter_mut().zip(resampled) {
            out.extend_from_slice(&chunk);
        }
        start = end;
    }

    let expected = (frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let len = output
        .iter()
        .map(Vec::len)
        .min()
        .unwrap_or(0)
        .min(expected);

    debug!(from_rate, to_rate, frames, resampled = len, "Resampled audio");

    Ok(Array2::from_shape_fn((channels, len), |(c, f)| output[c][f]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_identity() {
        let samples = Array2::from_elem((1, 10), 0.5);
        let out = resample(&samples, 32_000, 32_000).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_downsample_length() {
        let samples = Array2::from_shape_fn((2, 48_000), |(_, f)| {
            (f as f32 * 440.0 * std::f32::consts::TAU / 48_000.0).sin()
        });
        let out = resample(&samples, 48_000, 32_000).unwrap();
        assert_eq!(out.nrows(), 2);
        assert!(out.ncols() <= 32_000);
        assert!(out.ncols() > 30_000);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let samples = Array2::from_elem((1, 10), 0.5);
        assert!(resample(&samples, 0, 32_000).is_err());
    }
}
