//! Resource unit conversion

use crate::error::{CorralError, Result};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parse a compose memory value (`"512M"`, `"1.5g"`, `"1073741824"`)
/// into gigabytes, rounded to two decimals
pub fn memory_to_gb(value: &str) -> Result<f64> {
    let gb = (parse_bytes(value)? / GIB * 100.0).round() / 100.0;
    if !gb.is_finite() || gb <= 0.0 {
        return Err(CorralError::invalid_resource("memory", value));
    }
    Ok(gb)
}

/// Parse a compose CPU value (`"0.5"`, `"2"`)
pub fn parse_cpus(value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(cpus) if cpus.is_finite() && cpus > 0.0 => Ok(cpus),
        _ => Err(CorralError::invalid_resource("cpus", value)),
    }
}

fn parse_bytes(value: &str) -> Result<f64> {
    let trimmed = value.trim().to_ascii_lowercase();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let multiplier = match unit.trim() {
        "" | "b" => 1.0,
        "k" | "kb" => 1024.0,
        "m" | "mb" => 1024.0 * 1024.0,
        "g" | "gb" => GIB,
        _ => return Err(CorralError::invalid_resource("memory", value)),
    };

    let number: f64 = number
        .parse()
        .map_err(|_| CorralError::invalid_resource("memory", value))?;
    Ok(number * multiplier)
}
