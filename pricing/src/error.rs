use thiserror::Error;

#[derive(Error, Debug)]
pub enum OfferError {
    #[error("fixture not found")]
    FixtureNotFound,

    #[error("price must be greater than zero")]
    InvalidPrice,

    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}
