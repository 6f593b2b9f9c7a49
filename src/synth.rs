//! One-call synthesis: expression in, normalized waveform out.

use crate::config::EvalConfig;
use crate::error::BytebeatError;
use crate::eval::Evaluator;
use crate::render::{Waveform, render};
use crate::validator::validate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_EXPRESSION: &str = "(t * (t >> 9 | t >> 13) & 16) & 255";
pub const DEFAULT_SAMPLE_RATE: u32 = 8000;
pub const DEFAULT_DURATION: f64 = 15.0;

pub const MIN_SAMPLE_RATE: u32 = 8000;
pub const MAX_SAMPLE_RATE: u32 = 96000;
pub const MIN_DURATION: f64 = 1.0;
pub const MAX_DURATION: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthRequest {
    pub sample_rate: u32,
    /// Seconds.
    pub duration: f64,
    pub expression: String,
}

impl Default for SynthRequest {
    fn default() -> Self {
        SynthRequest {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: DEFAULT_DURATION,
            expression: DEFAULT_EXPRESSION.to_string(),
        }
    }
}

impl SynthRequest {
    pub fn new(expression: impl Into<String>, sample_rate: u32, duration: f64) -> Self {
        SynthRequest {
            sample_rate,
            duration,
            expression: expression.into(),
        }
    }

    pub fn check(&self) -> Result<(), BytebeatError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(BytebeatError::InvalidRequest(format!(
                "sample rate {} is outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE} Hz",
                self.sample_rate
            )));
        }
        if !(MIN_DURATION..=MAX_DURATION).contains(&self.duration) {
            return Err(BytebeatError::InvalidRequest(format!(
                "duration {} is outside {MIN_DURATION}..={MAX_DURATION} seconds",
                self.duration
            )));
        }
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        (f64::from(self.sample_rate) * self.duration).round() as usize
    }
}

/// Validate, evaluate over `0..sample_count` and render.
pub fn synthesize(request: &SynthRequest, config: &EvalConfig) -> Result<Waveform, BytebeatError> {
    request.check()?;
    let expr = validate(&request.expression)?;
    let sample_count = request.sample_count();
    debug!(
        expression = %expr,
        sample_rate = request.sample_rate,
        samples = sample_count,
        "synthesizing"
    );
    let samples = Evaluator::new(config.clone()).evaluate_domain(&expr, sample_count)?;
    Ok(render(&samples, config.truncation, request.sample_rate))
}
