use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkycheckError {
    #[error("Julian date {jd} is outside the supported span [{start}, {end}] of {source_name}")]
    OutOfRangeTime {
        jd: f64,
        start: f64,
        end: f64,
        source_name: &'static str,
    },

    #[error("Body {0} has no segment in the loaded kernel")]
    UnsupportedBody(i32),

    #[error("Numerical domain error in {context}: {value}")]
    DomainError { context: &'static str, value: f64 },

    #[error("No rows matched by time key ({left_rows} left rows, {right_rows} right rows)")]
    UnmatchedRows { left_rows: usize, right_rows: usize },

    #[error("Time key {key} appears more than once in the {side} dataset")]
    DuplicateTimeKey { key: String, side: &'static str },

    #[error("Categories exceeded their tolerance: {0:?}")]
    ToleranceExceeded(Vec<String>),

    #[error("Search window is empty: start {start} must be before end {end}")]
    InvalidRange { start: f64, end: f64 },

    #[error("Search step must be positive, got {0}")]
    InvalidStep(f64),

    #[error("Invalid SPK kernel: {0}")]
    InvalidKernel(String),

    #[error("Invalid SPK data type: {0}")]
    UnsupportedSpkType(i32),

    #[error("Body {body} cannot be chained to the Solar System Barycenter: {reason}")]
    BrokenChain { body: i32, reason: String },

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Dataset build was cancelled after {0} instants")]
    Cancelled(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid time key: {0}")]
    InvalidTimeFormat(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON fixture error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML configuration error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for SkycheckError {
    fn from(err: nom::Err<E>) -> Self {
        SkycheckError::NomParsingError(format!("{err:?}"))
    }
}

impl PartialEq for SkycheckError {
    fn eq(&self, other: &Self) -> bool {
        use SkycheckError::*;
        match (self, other) {
            (
                OutOfRangeTime {
                    jd: a,
                    start: sa,
                    end: ea,
                    source_name: na,
                },
                OutOfRangeTime {
                    jd: b,
                    start: sb,
                    end: eb,
                    source_name: nb,
                },
            ) => a == b && sa == sb && ea == eb && na == nb,
            (UnsupportedBody(a), UnsupportedBody(b)) => a == b,
            (
                DomainError {
                    context: ca,
                    value: va,
                },
                DomainError {
                    context: cb,
                    value: vb,
                },
            ) => ca == cb && (va == vb || (va.is_nan() && vb.is_nan())),
            (
                UnmatchedRows {
                    left_rows: la,
                    right_rows: ra,
                },
                UnmatchedRows {
                    left_rows: lb,
                    right_rows: rb,
                },
            ) => la == lb && ra == rb,
            (
                DuplicateTimeKey { key: ka, side: sa },
                DuplicateTimeKey { key: kb, side: sb },
            ) => ka == kb && sa == sb,
            (ToleranceExceeded(a), ToleranceExceeded(b)) => a == b,
            (InvalidRange { start: sa, end: ea }, InvalidRange { start: sb, end: eb }) => {
                sa == sb && ea == eb
            }
            (InvalidStep(a), InvalidStep(b)) => a == b,
            (InvalidKernel(a), InvalidKernel(b)) => a == b,
            (UnsupportedSpkType(a), UnsupportedSpkType(b)) => a == b,
            (BrokenChain { body: a, .. }, BrokenChain { body: b, .. }) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (Cancelled(a), Cancelled(b)) => a == b,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (InvalidTimeFormat(a), InvalidTimeFormat(b)) => a == b,

            // wrapped errors are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (TomlError(_), TomlError(_)) => true,

            _ => false,
        }
    }
}

impl SkycheckError {
    /// Whether a bulk run may drop the affected sample and continue.
    ///
    /// `OutOfRangeTime` and `UnsupportedBody` only invalidate the sample that
    /// raised them; every other error aborts the run.
    pub fn is_sample_local(&self) -> bool {
        matches!(
            self,
            SkycheckError::OutOfRangeTime { .. } | SkycheckError::UnsupportedBody(_)
        )
    }
}
