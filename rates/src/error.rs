use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from rate provider")]
    InvalidResponse,

    #[error("no cached rate for {from}->{to}")]
    RateUnavailable { from: String, to: String },

    #[error("amount must be greater than zero")]
    InvalidAmount,
}
