use std::path::Path;
use std::time::Duration;

use playback_capture_core::CaptureError;

/// In-memory mono 16-bit PCM, the material a replay session serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl Clip {
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Silence for the given duration.
    pub fn silence(duration_ms: u64, sample_rate: u32) -> Self {
        let count = samples_for(duration_ms, sample_rate);
        Self::from_samples(vec![0i16; count], sample_rate)
    }

    /// A full-scale sine tone at `frequency` Hz.
    pub fn sine(frequency: f64, duration_ms: u64, sample_rate: u32) -> Self {
        let count = samples_for(duration_ms, sample_rate);
        let samples = (0..count)
            .map(|i| {
                let t = i as f64 / f64::from(sample_rate);
                let value = (2.0 * std::f64::consts::PI * frequency * t).sin();
                (value * f64::from(i16::MAX)) as i16
            })
            .collect();
        Self::from_samples(samples, sample_rate)
    }

    /// Load a mono 16-bit integer PCM WAV file.
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)
            .map_err(|err| CaptureError::Io(format!("failed to open {}: {}", path.display(), err)))?;

        let spec = reader.spec();
        if spec.channels != 1
            || spec.bits_per_sample != 16
            || spec.sample_format != hound::SampleFormat::Int
        {
            return Err(CaptureError::Io(format!(
                "{}: expected mono 16-bit integer PCM, got {} ch / {} bit",
                path.display(),
                spec.channels,
                spec.bits_per_sample
            )));
        }

        let samples = reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| CaptureError::Io(format!("failed to read {}: {}", path.display(), err)))?;

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// The little-endian byte stream a capture session delivers.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.samples.len() * 2);
        for &sample in &self.samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }
}

fn samples_for(duration_ms: u64, sample_rate: u32) -> usize {
    (u64::from(sample_rate) * duration_ms / 1000) as usize
}
