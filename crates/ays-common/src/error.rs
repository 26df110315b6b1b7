/// Errors raised while merging options and compiling an agent payload.
///
/// Every variant is fatal to the compile in progress: no partial payload is
/// ever produced. [`AgentError::category`] groups the variants into the
/// coarse classes callers report on.
///
/// # Examples
///
/// ```rust
/// use ays_common::error::{AgentError, ErrorCategory};
///
/// let err = AgentError::MissingField("parent");
/// assert_eq!(err.category(), ErrorCategory::Configuration);
/// assert!(err.to_string().contains("parent"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A required option (org secret, parent or monitor name) is empty.
    #[error("Missing required option: {0}")]
    MissingField(&'static str),

    /// The reporting interval is below the enforced minimum.
    #[error("Interval ({0}s) must be at least {min} seconds", min = crate::types::MIN_INTERVAL_SECS)]
    IntervalTooShort(u64),

    /// The byte divisor override is neither 1000 nor 1024.
    #[error("Invalid byte base ({0}). Valid options are (1000, 1024).")]
    InvalidByteBase(u64),

    /// A threshold expression does not start with a known comparison.
    #[error("Invalid threshold type ({0}). Valid options are (<N, >N, eN, neN, N-N).")]
    InvalidThresholdType(String),

    /// A threshold matched a comparison prefix but carries no number.
    #[error("Threshold ({0}) does not contain a numeric value")]
    MissingThresholdValue(String),

    /// A threshold, heartbeat or status level is not one of the allowed levels.
    #[error("Invalid {context} level ({value}). Valid options are ({options}).")]
    InvalidLevel {
        context: &'static str,
        value: String,
        options: &'static str,
    },

    /// The node type is not machine, service or vendor.
    #[error("Invalid node type ({0}). Valid options are (machine, service, vendor).")]
    InvalidNodeType(String),

    /// A monitor resource selector is unknown.
    #[error("Invalid monitor resource ({0}). Available options are (all, cpu, hdd, ram, net).")]
    InvalidMonitorResource(String),

    /// A names or thresholds list does not line up with the values list.
    #[error("The number of {field} ({count}) must match the number of values ({values_count})")]
    CountMismatch {
        field: &'static str,
        count: usize,
        values_count: usize,
    },

    /// A child node name is empty.
    #[error("Node name must not be empty")]
    EmptyName,

    /// A child node name does not start with a lowercase ASCII letter.
    #[error("Node name must start with a lowercase letter (a-z), found '{0}'")]
    InvalidFirstCharacter(char),

    /// A child node name is longer than the allowed maximum.
    #[error("Node name is {0} characters long; the maximum is {max}", max = crate::types::MAX_NODE_NAME_LEN)]
    NameTooLong(usize),

    /// A value or threshold number could not be parsed.
    #[error("{0}")]
    NumericFormat(#[from] std::num::ParseFloatError),

    /// Reading or writing the configuration file failed.
    #[error("Config: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for the options model.
    #[error("Config: parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The options could not be rendered as TOML.
    #[error("Config: serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

/// Coarse classification of [`AgentError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Grammar,
    CountMismatch,
    NameFormat,
    NumericFormat,
    Storage,
}

impl AgentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingField(_) | Self::IntervalTooShort(_) | Self::InvalidByteBase(_) => {
                ErrorCategory::Configuration
            }
            Self::InvalidThresholdType(_)
            | Self::MissingThresholdValue(_)
            | Self::InvalidLevel { .. }
            | Self::InvalidNodeType(_)
            | Self::InvalidMonitorResource(_) => ErrorCategory::Grammar,
            Self::CountMismatch { .. } => ErrorCategory::CountMismatch,
            Self::EmptyName | Self::InvalidFirstCharacter(_) | Self::NameTooLong(_) => {
                ErrorCategory::NameFormat
            }
            Self::NumericFormat(_) => ErrorCategory::NumericFormat,
            Self::Io(_) | Self::ConfigParse(_) | Self::ConfigWrite(_) => ErrorCategory::Storage,
        }
    }
}

/// Convenience `Result` alias for option and payload operations.
pub type Result<T> = std::result::Result<T, AgentError>;
