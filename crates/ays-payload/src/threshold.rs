//! Compact threshold grammar.
//!
//! | expression     | meaning                          |
//! |----------------|----------------------------------|
//! | `>N`, `<N`     | above / below `N`                |
//! | `eN`, `neN`    | equal / not equal to `N`         |
//! | `MIN-MAX`      | outside the `MIN..MAX` range     |
//!
//! Any form may end with `:warning`, `:error` or `:critical`; the level
//! defaults to `critical`.

use ays_common::error::{AgentError, Result};
use ays_common::types::{Level, Threshold};
use regex::Regex;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Above,
    Below,
    Equal,
    NotEqual,
}

impl Comparison {
    fn from_prefix(expr: &str) -> Result<Self> {
        if expr.starts_with('>') {
            Ok(Self::Above)
        } else if expr.starts_with('<') {
            Ok(Self::Below)
        } else if expr.starts_with("ne") {
            Ok(Self::NotEqual)
        } else if expr.starts_with('e') {
            Ok(Self::Equal)
        } else {
            Err(AgentError::InvalidThresholdType(expr.to_string()))
        }
    }

    fn build(self, value: f64, level: Level) -> Threshold {
        match self {
            Self::Above => Threshold::Above { value, level },
            Self::Below => Threshold::Below { value, level },
            Self::Equal => Threshold::Equal { value, level },
            Self::NotEqual => Threshold::NotEqual { value, level },
        }
    }
}

/// Parses a threshold expression.
///
/// `None`, an empty string, or a string that is empty once quotes are
/// stripped yields `Ok(None)`.
///
/// # Errors
///
/// - [`AgentError::InvalidThresholdType`] for an unknown comparison prefix.
/// - [`AgentError::InvalidLevel`] for an unknown `:LEVEL` suffix.
/// - [`AgentError::NumericFormat`] when a range bound is not a number.
pub fn parse(expr: Option<&str>) -> Result<Option<Threshold>> {
    let Some(raw) = expr else {
        return Ok(None);
    };
    let expr = normalize(raw);
    if expr.is_empty() {
        return Ok(None);
    }

    if expr.contains('-') {
        return parse_outside(&expr).map(Some);
    }

    let comparison = Comparison::from_prefix(&expr)?;
    let level = parse_level(expr.split_once(':').map(|(_, level)| level))?;
    let value = NUMBER
        .find(&expr)
        .ok_or_else(|| AgentError::MissingThresholdValue(expr.clone()))?
        .as_str()
        .parse::<f64>()?;

    Ok(Some(comparison.build(value, level)))
}

fn parse_outside(expr: &str) -> Result<Threshold> {
    let (range, level) = match expr.split_once(':') {
        Some((range, level)) => (range, Some(level)),
        None => (expr, None),
    };
    let level = parse_level(level)?;
    let (min, max) = range.split_once('-').unwrap_or((range, ""));
    Ok(Threshold::Outside {
        min: min.parse()?,
        max: max.parse()?,
        level,
    })
}

fn parse_level(level: Option<&str>) -> Result<Level> {
    match level {
        Some(level) => Level::parse(level, "threshold"),
        None => Ok(Level::Critical),
    }
}

fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}
