//! WAV file I/O on `[channels, frames]` sample arrays.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ndarray::Array2;

use super::ProcessingError;

/// Write samples as 16-bit PCM, clamping to [-1, 1]
pub fn write_wav(path: &Path, samples: &Array2<f32>, sample_rate: u32) -> Result<(), ProcessingError> {
    let (channels, frames) = samples.dim();
    let spec = hound::WavSpec {
        channels: channels.max(1) as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::new(BufWriter::new(File::create(path)?), spec)?;

    for frame in 0..frames {
        for channel in 0..channels {
            let clamped = samples[[channel, frame]].clamp(-1.0, 1.0);
            writer.write_sample((clamped * 32767.0) as i16)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Read a WAV file into `[channels, frames]` floats in [-1, 1], with its sample rate
pub fn read_wav(path: &Path) -> Result<(Array2<f32>, u32), ProcessingError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let frames = interleaved.len() / channels;
    let samples = Array2::from_shape_fn((channels, frames), |(c, f)| interleaved[f * channels + c]);

    Ok((samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_stereo() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stereo.wav");

        let samples = Array2::from_shape_fn((2, 100), |(c, f)| {
            if c == 0 {
                (f as f32 / 100.0) * 0.5
            } else {
                -0.25
            }
        });
        write_wav(&path, &samples, 16_000).unwrap();

        let (decoded, rate) = read_wav(&path).unwrap();
        assert_eq!(rate, 16_000);
        assert_eq!(decoded.dim(), (2, 100));
        assert!((decoded[[0, 50]] - 0.25).abs() < 1e-3);
        assert!((decoded[[1, 10]] + 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_write_clamps_out_of_range() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("loud.wav");

        let samples = Array2::from_shape_vec((1, 2), vec![3.0, -3.0]).unwrap();
        write_wav(&path, &samples, 8_000).unwrap();

        let (decoded, _) = read_wav(&path).unwrap();
        assert!(decoded[[0, 0]] <= 1.0);
        assert!(decoded[[0, 1]] >= -1.0);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_wav(Path::new("/nonexistent/x.wav")).is_err());
    }
}
