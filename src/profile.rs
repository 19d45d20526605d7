use serde::{Deserialize, Serialize};

/// Output container/codec family for a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// AAC audio in a 3GPP container
    Aac3gp,
    /// AMR narrowband/wideband (variant picked by the high-quality flag)
    Amr,
    /// MP3
    Mp3,
}

impl OutputFormat {
    /// Parse a format name from the control surface.
    ///
    /// Unrecognized values fall back to MP3 rather than failing the command.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "aac3gp" | "aac" | "3gp" | "3gpp" => OutputFormat::Aac3gp,
            "amr" => OutputFormat::Amr,
            _ => OutputFormat::Mp3,
        }
    }
}

/// Concrete encoder variant handed to the recorder backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    Aac,
    AmrNb,
    AmrWb,
    Mp3,
}

// Nominal codec byte rates (bytes/second) used by the remaining-time
// estimator: AAC-LC mono 24 kbit/s, AMR-NB 12.2 kbit/s, AMR-WB 23.85 kbit/s,
// MP3 32 kbit/s.
const BYTE_RATE_AAC: u64 = 3000;
const BYTE_RATE_AMR_NB: u64 = 1650;
const BYTE_RATE_AMR_WB: u64 = 2980;
const BYTE_RATE_MP3: u64 = 4000;

/// Encoder parameters fixed at session start.
///
/// One profile is selected per `start` command; the byte rate feeds the
/// remaining-time estimator and the rest configures the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderProfile {
    pub format: OutputFormat,
    pub encoder: Encoder,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u64,
}

impl EncoderProfile {
    /// Select the profile for a start command.
    ///
    /// `default_sample_rate` comes from service configuration and applies to
    /// the fixed-rate profiles; the AMR profile derives its rate from
    /// `high_quality` (16 kHz wideband vs 8 kHz narrowband).
    pub fn select(format: OutputFormat, high_quality: bool, default_sample_rate: u32) -> Self {
        match format {
            OutputFormat::Aac3gp => Self {
                format,
                encoder: Encoder::Aac,
                channels: 1,
                sample_rate: default_sample_rate,
                byte_rate: BYTE_RATE_AAC,
            },
            OutputFormat::Amr => Self {
                format,
                encoder: if high_quality {
                    Encoder::AmrWb
                } else {
                    Encoder::AmrNb
                },
                channels: 1,
                sample_rate: if high_quality { 16000 } else { 8000 },
                byte_rate: if high_quality {
                    BYTE_RATE_AMR_WB
                } else {
                    BYTE_RATE_AMR_NB
                },
            },
            OutputFormat::Mp3 => Self {
                format,
                encoder: Encoder::Mp3,
                channels: 1,
                sample_rate: default_sample_rate,
                byte_rate: BYTE_RATE_MP3,
            },
        }
    }
}
