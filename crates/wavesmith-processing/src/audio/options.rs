//! Per-operation parameters, their defaults, and the filter expressions built from them.

use crate::validator::{require_range, ValidationError};
use serde_json::{json, Map, Value};

/// Sample rate the speed/pitch change resamples back to.
pub const BASE_SAMPLE_RATE: u32 = 44_100;

/// Loudness normalization target (EBU R128 integrated loudness, range, true peak).
pub const NORMALIZE_FILTER: &str = "loudnorm=I=-16:LRA=11:TP=-1.5";

/// Echo delay taps in milliseconds.
const ECHO_DELAYS_MS: (u32, u32) = (1000, 1800);

/// Chain of named filters, each with ordered parameters joined by `:`.
///
/// `{"aecho": {"in_gain": 0.5, "out_gain": 0.5, "delay": 500, "decay": 0.8}}` becomes
/// `aecho=0.5:0.5:500:0.8`; several filters are chained with `|`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverbOptions {
    filters: Map<String, Value>,
}

impl Default for ReverbOptions {
    fn default() -> Self {
        let mut aecho = Map::new();
        aecho.insert("in_gain".to_string(), json!(0.5));
        aecho.insert("out_gain".to_string(), json!(0.5));
        aecho.insert("delay".to_string(), json!(500));
        aecho.insert("decay".to_string(), json!(0.8));

        let mut filters = Map::new();
        filters.insert("aecho".to_string(), Value::Object(aecho));
        Self { filters }
    }
}

impl ReverbOptions {
    /// Parse the `reverbOptions` form value (a JSON object of filter objects).
    pub fn from_json(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationError::InvalidFilter(format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(filters) = value else {
            return Err(ValidationError::InvalidFilter(
                "expected an object of filters".to_string(),
            ));
        };
        if filters.is_empty() {
            return Err(ValidationError::InvalidFilter(
                "at least one filter is required".to_string(),
            ));
        }

        for (name, params) in &filters {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ValidationError::InvalidFilter(format!(
                    "invalid filter name '{}'",
                    name
                )));
            }
            let Value::Object(params) = params else {
                return Err(ValidationError::InvalidFilter(format!(
                    "parameters of '{}' must be an object",
                    name
                )));
            };
            if params.is_empty() {
                return Err(ValidationError::InvalidFilter(format!(
                    "'{}' has no parameters",
                    name
                )));
            }
            for (key, value) in params {
                if scalar_text(value).is_none() {
                    return Err(ValidationError::InvalidFilter(format!(
                        "'{}.{}' must be a number or a plain value",
                        name, key
                    )));
                }
            }
        }

        Ok(Self { filters })
    }

    pub fn filter_expression(&self) -> String {
        self.filters
            .iter()
            .map(|(name, params)| {
                let values = match params {
                    Value::Object(params) => params
                        .values()
                        .filter_map(scalar_text)
                        .collect::<Vec<_>>()
                        .join(":"),
                    _ => String::new(),
                };
                format!("{}={}", name, values)
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Text of a parameter value, or `None` if it could escape the filter graph.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s)
            if !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '|')) =>
        {
            Some(s.clone())
        }
        _ => None,
    }
}

/// Echo strength as a percentage; 100 means gain and decay of `1.00`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoOptions {
    pub percentage: f64,
}

impl Default for EchoOptions {
    fn default() -> Self {
        Self { percentage: 50.0 }
    }
}

impl EchoOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_range("echoPercentage", self.percentage, 0.0, 100.0)
    }

    pub fn intensity(&self) -> String {
        format!("{:.2}", self.percentage / 100.0)
    }

    pub fn filter_expression(&self) -> String {
        let i = self.intensity();
        format!(
            "aecho={i}:{i}:{}|{}:{i}|{i}",
            ECHO_DELAYS_MS.0, ECHO_DELAYS_MS.1
        )
    }
}

/// Playback-rate multiplier. Speed and pitch move together: there is no tempo correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedOptions {
    pub factor: f64,
}

impl Default for SpeedOptions {
    fn default() -> Self {
        Self { factor: 1.5 }
    }
}

impl SpeedOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(ValidationError::parameter(
                "speedFactor",
                "must be a positive number",
            ));
        }
        Ok(())
    }

    pub fn filter_expression(&self) -> String {
        format!(
            "asetrate={base}*{factor},aresample={base}",
            base = BASE_SAMPLE_RATE,
            factor = self.factor
        )
    }
}

/// Section to keep, in seconds from the start of the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimOptions {
    pub start: f64,
    pub end: f64,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 10.0,
        }
    }
}

impl TrimOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(ValidationError::parameter(
                "startTime",
                "must be a non-negative number",
            ));
        }
        if !self.end.is_finite() || self.end <= self.start {
            return Err(ValidationError::parameter(
                "endTime",
                "must be greater than startTime",
            ));
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// `-ss` value.
    pub fn start_arg(&self) -> String {
        seconds_arg(self.start)
    }

    /// `-t` value.
    pub fn duration_arg(&self) -> String {
        seconds_arg(self.duration())
    }
}

/// Millisecond precision with trailing zeros dropped, so `0.3 - 0.1` is passed as `0.2`.
fn seconds_arg(seconds: f64) -> String {
    let fixed = format!("{:.3}", seconds);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
