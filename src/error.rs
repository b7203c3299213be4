use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("could not parse booking date {value:?}")]
    DateParse { value: String },
}

/// Reasons a booking is rejected before it reaches storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("{0} cannot be empty")]
    MissingField(&'static str),
    #[error("district is required")]
    MissingDistrict,
    #[error("unknown district {0:?}")]
    UnknownDistrict(String),
    #[error("total ({total}) cannot be less than advance ({advance})")]
    AdvanceExceedsTotal { total: i64, advance: i64 },
    #[error("amounts cannot be negative")]
    NegativeAmount,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("contract template error: {0}")]
    Template(#[from] tera::Error),
}
