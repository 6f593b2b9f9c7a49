//! Evaluation and rendering settings.
//!
//! Every field has a default, so a partial JSON document such as
//! `{"divisionByZero": "fail"}` is a valid configuration.

use serde::{Deserialize, Serialize};

/// Hard ceiling on the sample domain: 96 kHz for 60 seconds.
pub const MAX_SAMPLES: usize = 96_000 * 60;

/// What integer (and, under `Fail`, float) division or modulo by zero does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionByZero {
    /// Integer `x / 0` and `x % 0` produce 0; float division follows IEEE 754.
    #[default]
    Zero,
    /// The first zero divisor aborts evaluation.
    Fail,
}

/// What happens to NaN and ±inf in the final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonFinite {
    /// Pass them through; quantization maps them to 0.
    #[default]
    Keep,
    /// Abort with `NonNumericResult`.
    Fail,
}

/// How evaluated values are narrowed to the 8-bit sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationPolicy {
    /// Keep the low 8 bits (the bytebeat convention).
    #[default]
    Wrap,
    /// Saturate into `0..=255`.
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvalConfig {
    pub division_by_zero: DivisionByZero,
    pub non_finite: NonFinite,
    pub truncation: TruncationPolicy,
    /// Largest domain `evaluate` accepts.
    pub max_samples: usize,
    /// Samples per evaluation chunk. Each chunk walks the tree once.
    pub chunk_size: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            division_by_zero: DivisionByZero::default(),
            non_finite: NonFinite::default(),
            truncation: TruncationPolicy::default(),
            max_samples: MAX_SAMPLES,
            chunk_size: 1 << 16,
        }
    }
}

impl EvalConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.division_by_zero, DivisionByZero::Zero);
        assert_eq!(config.non_finite, NonFinite::Keep);
        assert_eq!(config.truncation, TruncationPolicy::Wrap);
        assert_eq!(config.max_samples, 5_760_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EvalConfig::from_json(r#"{"divisionByZero": "fail", "chunkSize": 1024}"#).unwrap();
        assert_eq!(
            config,
            EvalConfig {
                division_by_zero: DivisionByZero::Fail,
                chunk_size: 1024,
                ..EvalConfig::default()
            }
        );
    }

    #[test]
    fn round_trips_through_json() {
        let config = EvalConfig {
            non_finite: NonFinite::Fail,
            truncation: TruncationPolicy::Clamp,
            ..EvalConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""truncation":"clamp""#));
        assert_eq!(EvalConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(EvalConfig::from_json(r#"{"divisionByZero": "ignore"}"#).is_err());
    }
}
