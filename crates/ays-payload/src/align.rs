use crate::threshold;
use ays_common::error::{AgentError, Result};
use ays_common::types::Measurement;

/// Zips comma-separated values, names and threshold expressions into
/// measurements, preserving input order.
///
/// Missing names fall back to `value{index}`; a blank threshold segment
/// means the value has no threshold.
///
/// # Errors
///
/// [`AgentError::CountMismatch`] when a non-empty names or thresholds list
/// does not have one entry per value, then any value or threshold parse error.
pub fn align(
    raw_values: &str,
    raw_names: Option<&str>,
    raw_thresholds: Option<&str>,
) -> Result<Vec<Measurement>> {
    let values = split(raw_values);
    let names = split_parallel(raw_names, values.len());
    let thresholds = split_parallel(raw_thresholds, values.len());

    check_count("names", &names, &values)?;
    check_count("thresholds", &thresholds, &values)?;

    values
        .iter()
        .zip(names)
        .zip(thresholds)
        .enumerate()
        .map(|(i, ((value, name), threshold))| -> Result<Measurement> {
            let name = match name {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => format!("value{i}"),
            };
            Ok(Measurement {
                name,
                value: value.parse()?,
                threshold: threshold::parse(threshold)?,
            })
        })
        .collect()
}

fn split(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).collect()
}

/// An absent or empty list stands in as one placeholder per value.
fn split_parallel(raw: Option<&str>, len: usize) -> Vec<Option<&str>> {
    match raw {
        Some(raw) if !raw.is_empty() => split(raw).into_iter().map(Some).collect(),
        _ => vec![None; len],
    }
}

fn check_count(field: &'static str, items: &[Option<&str>], values: &[&str]) -> Result<()> {
    if items.len() != values.len() {
        return Err(AgentError::CountMismatch {
            field,
            count: items.len(),
            values_count: values.len(),
        });
    }
    Ok(())
}
