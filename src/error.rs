use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FfiecError {
    /// The supplied bytes are not a valid ZIP container. Fatal for the
    /// whole extraction; everything finer-grained is recovered per entry
    /// or per fact.
    #[cfg(feature = "archive")]
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("Not an XBRL instance document (root element is `{0}`)")]
    NotXbrl(String),

    #[error("Fact `{0}` has no contextRef attribute")]
    MissingContext(String),

    #[error("Context `{0}` has no RSSD segment")]
    MalformedContext(String),

    #[error("Context `{0}` contains no period date")]
    MissingPeriod(String),

    #[error("Context `{0}` contains an impossible period date")]
    InvalidPeriod(String),

    #[error("Fact `{0}` has no value")]
    MissingValue(String),

    #[error("Cannot coerce `{value}` under unit `{unit}` for fact `{concept}`")]
    Coercion {
        concept: String,
        unit: String,
        value: String,
    },

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] FromUtf8Error),
}

impl From<quick_xml::Error> for FfiecError {
    fn from(error: quick_xml::Error) -> Self {
        FfiecError::Xml(error.to_string())
    }
}

impl FfiecError {
    /// True for failures scoped to a single fact item: the surrounding
    /// document keeps processing and only the offending fact is dropped.
    pub fn is_fact_error(&self) -> bool {
        matches!(
            self,
            FfiecError::MissingContext(_)
                | FfiecError::MalformedContext(_)
                | FfiecError::MissingPeriod(_)
                | FfiecError::InvalidPeriod(_)
                | FfiecError::MissingValue(_)
                | FfiecError::Coercion { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FfiecError>;
