use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised by the power-law fitter itself.
///
/// These are reported synchronously to the caller; the fitter never logs and
/// continues past one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Fewer usable (positive-price) points than a line needs.
    #[error("insufficient data: {usable} usable point(s) with a positive price, need at least {required}")]
    InsufficientData { usable: usize, required: usize },

    /// A day index below 1 (where `ln` is undefined or negative-infinite).
    #[error("day index {day_index} is outside the fit domain (must be >= 1)")]
    Domain { day_index: f64 },

    /// Day indices must be strictly increasing across the fitted series.
    #[error("day indices must be strictly increasing: day {day_index} at position {position}")]
    UnorderedDays { position: usize, day_index: u32 },

    /// The least-squares solve produced no usable line.
    #[error("regression is degenerate: {0}")]
    Degenerate(&'static str),
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(4, format!("Power-law fit failed: {err}"))
    }
}
