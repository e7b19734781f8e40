use thiserror::Error;

/// Everything that can go wrong inside a single scheduler cycle.
/// None of these escape the cycle; they only decide its terminal tag.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Signal generation failed: {0}")]
    Generation(String),
    #[error("Trade execution failed for {instrument}: {reason}")]
    Execution { instrument: String, reason: String },
    #[error("Outcome resolution failed for {instrument}: {reason}")]
    Resolution { instrument: String, reason: String },
}
