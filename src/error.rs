use std::fmt;

/// Error type for waveform synthesis and spectrogram rendering.
///
/// Every variant aborts the computation it came from; there are no partial results.
#[derive(Debug, Clone, PartialEq)]
pub enum ChirpError {
    /// A mass, a configuration value or a buffer size is out of range.
    InvalidInput(String),
    /// The signal is too short for the requested segmentation or DFT size.
    DegenerateSignal(String),
    /// The FFT primitive reported an error.
    TransformFailure(String),
}

impl fmt::Display for ChirpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChirpError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            ChirpError::DegenerateSignal(msg) => write!(f, "degenerate signal: {}", msg),
            ChirpError::TransformFailure(msg) => write!(f, "transform failure: {}", msg),
        }
    }
}

impl std::error::Error for ChirpError {}

impl From<realfft::FftError> for ChirpError {
    fn from(e: realfft::FftError) -> Self {
        ChirpError::TransformFailure(e.to_string())
    }
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, ChirpError>`.
pub type Result<T> = std::result::Result<T, ChirpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_kind() {
        let e = ChirpError::DegenerateSignal("piece length is zero".into());
        assert_eq!(e.to_string(), "degenerate signal: piece length is zero");
        let e = ChirpError::InvalidInput("mass1 must be positive".into());
        assert!(e.to_string().starts_with("invalid input"));
    }
}
