use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvalidForecast {
    #[error("probability {value} for {field} is outside [0, 1]")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("1x2 probabilities sum to {sum}, expected ≈1")]
    WrongBooksum { sum: f64 },
}

#[derive(Debug, Error)]
pub enum InvalidEvent {
    #[error("predicted probabilities sum to {sum}; a positive mass is required")]
    NonPositiveMass { sum: f64 },

    #[error("predicted probabilities contain a non-finite value")]
    NonFinite,
}
