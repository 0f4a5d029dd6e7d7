//! Validation of dynamically typed target input.
//!
//! Targets arriving as JSON may be missing fields or carry the wrong types.
//! Each problem is reported with its own message before any optimizer state
//! is touched.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::types::Target;
use crate::error::{Error, Result};

/// Parses and validates a list of targets.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use u_hillclimb::hc::parse_targets;
///
/// let targets = parse_targets(&json!([
///     { "name": "a", "value": 50, "min": 0, "max": 100 },
///     { "name": "b", "value": 1.5, "min": 0, "max": 2, "precision": 1 },
/// ]))
/// .unwrap();
/// assert_eq!(targets.len(), 2);
/// ```
pub fn parse_targets(value: &Value) -> Result<Vec<Target>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::invalid("targets must be a list of target objects"))?;
    if items.is_empty() {
        return Err(Error::invalid("at least one target is required"));
    }
    let targets = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_at(item, &format!("target at index {i}")))
        .collect::<Result<Vec<_>>>()?;
    validate_targets(&targets)?;
    Ok(targets)
}

/// Parses and validates a single target.
pub fn parse_target(value: &Value) -> Result<Target> {
    let target = parse_at(value, "target")?;
    target.validate()?;
    Ok(target)
}

/// Validates an already typed target list: non-empty, each target well
/// formed, names unique.
pub fn validate_targets(targets: &[Target]) -> Result<()> {
    if targets.is_empty() {
        return Err(Error::invalid("at least one target is required"));
    }
    let mut seen = HashSet::with_capacity(targets.len());
    for target in targets {
        target.validate()?;
        if !seen.insert(target.name.as_str()) {
            return Err(Error::invalid(format!(
                "duplicate target name '{}'",
                target.name
            )));
        }
    }
    Ok(())
}

fn parse_at(value: &Value, label: &str) -> Result<Target> {
    let map = value
        .as_object()
        .ok_or_else(|| Error::invalid(format!("{label} must be an object")))?;

    let name = map
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid(format!("{label} must have a string `name`")))?;
    let label = format!("{label} ('{name}')");

    let precision = match map.get("precision") {
        None | Some(Value::Null) => 0,
        Some(p) => p
            .as_u64()
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| {
                Error::invalid(format!("{label} `precision` must be a non-negative integer"))
            })?,
    };

    Ok(Target {
        name: name.to_string(),
        value: number(map, "value", &label)?,
        min: number(map, "min", &label)?,
        max: number(map, "max", &label)?,
        precision,
    })
}

fn number(map: &Map<String, Value>, key: &str, label: &str) -> Result<f64> {
    map.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::invalid(format!("{label} must have a numeric `{key}`")))
}
