use serde::{Deserialize, Serialize};

/// Default capture sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Capacity in bytes of the pump's read buffer (one allocation per session).
pub const FRAME_BUFFER_CAPACITY: usize = 4096;

/// Playback usage categories eligible for capture.
///
/// The OS only routes audio from applications whose playback usage matches
/// one of the configured entries (and which have opted in to capture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureUsage {
    Media,
    Game,
    Unknown,
}

/// PCM sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Signed 16-bit little-endian linear PCM.
    #[serde(rename = "i16le")]
    I16Le,
}

impl SampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::I16Le => 2,
        }
    }
}

/// Configuration for a capture session.
///
/// Built once per `start_capture` and immutable for the session's lifetime.
/// Serializable so host bridges can hand it over as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture sample rate in Hz (default: 16 000).
    pub sample_rate: u32,

    /// Number of channels (only mono is supported).
    pub channels: u16,

    /// Sample encoding (only signed 16-bit LE PCM is supported).
    pub format: SampleFormat,

    /// Playback usages whose audio is captured.
    pub usages: Vec<CaptureUsage>,

    /// Read buffer capacity in bytes; every emitted chunk decodes to at
    /// most this many bytes.
    pub buffer_capacity: usize,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels != 1 {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.usages.is_empty() {
            return Err("at least one capture usage is required".into());
        }
        let frame = self.format.bytes_per_sample();
        if self.buffer_capacity == 0 || self.buffer_capacity % frame != 0 {
            return Err(format!(
                "buffer capacity must be a positive multiple of {} bytes",
                frame
            ));
        }
        Ok(())
    }

    /// Raw byte rate of the configured stream.
    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate as usize * self.channels as usize * self.format.bytes_per_sample()
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            format: SampleFormat::I16Le,
            usages: vec![CaptureUsage::Media, CaptureUsage::Game, CaptureUsage::Unknown],
            buffer_capacity: FRAME_BUFFER_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_16khz_mono_i16() {
        let config = CaptureConfig::default();
        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.format, SampleFormat::I16Le);
        assert_eq!(config.buffer_capacity, 4096);
        assert_eq!(config.bytes_per_second(), 32_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = CaptureConfig::default();
        config.sample_rate = 0;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.channels = 2;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.usages.clear();
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.buffer_capacity = 4095; // not frame-aligned
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.buffer_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let config = CaptureConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"media\""));
        assert!(json.contains("\"i16le\""));

        let back: CaptureConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
