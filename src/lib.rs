pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod synth;
pub mod syntax;
pub mod token;
pub mod validator;
pub mod whitelist;

use crate::ast::Expr;
use crate::config::EvalConfig;
use crate::error::{BytebeatError, EvalError, Rejection};
use crate::eval::{Evaluator, Samples};
use crate::synth::SynthRequest;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the bytebeat-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Parse and check an expression against the whitelist.
pub fn validate(expression: &str) -> Result<Expr, Rejection> {
    validator::validate(expression)
}

/// Evaluate a validated expression over `t` with the default policies.
pub fn evaluate(expr: &Expr, t: &[u32]) -> Result<Samples, EvalError> {
    Evaluator::default().evaluate(expr, t)
}

/// Validate `expression` and evaluate it over `t = 0..sample_count`.
pub fn validate_and_evaluate(expression: &str, sample_count: usize) -> Result<Samples, BytebeatError> {
    let expr = validate(expression)?;
    Ok(Evaluator::default().evaluate_domain(&expr, sample_count)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckedExpression {
    normalized: String,
    node_count: usize,
    depends_on_time: bool,
    ast: Expr,
}

/// WASM-exposed: validate an expression. Resolves to the validated AST, or
/// rejects with a plain-text diagnostic pointing into the source.
#[wasm_bindgen]
pub fn check_expression(source: &str) -> Result<JsValue, JsValue> {
    let expr = validate(source)
        .map_err(|e| JsValue::from_str(&diagnostic::render_rejection(source, &e, false)))?;
    let checked = CheckedExpression {
        normalized: expr.to_string(),
        node_count: expr.node_count(),
        depends_on_time: expr.depends_on_time(),
        ast: expr,
    };
    serde_wasm_bindgen::to_value(&checked).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: synthesize an expression to a mono 16-bit WAV byte array.
#[wasm_bindgen]
pub fn render_bytebeat_wav(expression: &str, sample_rate: u32, duration: f64) -> Result<Vec<u8>, JsValue> {
    let request = SynthRequest::new(expression, sample_rate, duration);
    let waveform = synth::synthesize(&request, &EvalConfig::default()).map_err(to_js_error)?;
    waveform.to_wav().map_err(|e| to_js_error(e.into()))
}

/// WASM-exposed: synthesize an expression to normalized mono f32 samples.
/// Returns the raw audio buffer for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_bytebeat_samples(expression: &str, sample_rate: u32, duration: f64) -> Result<Vec<f32>, JsValue> {
    let request = SynthRequest::new(expression, sample_rate, duration);
    let waveform = synth::synthesize(&request, &EvalConfig::default()).map_err(to_js_error)?;
    Ok(waveform.into_samples())
}

fn to_js_error(e: BytebeatError) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn version_matches_manifest() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn validate_and_evaluate_composes() {
        let out = validate_and_evaluate("t * 3 & 7", 4).unwrap();
        assert_eq!(out, Samples::Int(vec![0, 3, 6, 1]));
    }

    #[test]
    fn validate_and_evaluate_reports_rejections() {
        let err = validate_and_evaluate("t + ", 4).unwrap_err();
        assert!(matches!(err, BytebeatError::Rejected(Rejection::Syntax { .. })));
    }

    #[test]
    fn validate_and_evaluate_reports_domain_limit() {
        let err = validate_and_evaluate("t", config::MAX_SAMPLES + 1).unwrap_err();
        assert!(matches!(
            err,
            BytebeatError::Evaluation(EvalError::DomainTooLarge { .. })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn huge_sample_counts_are_refused_up_front() {
        let err = validate_and_evaluate("t", 1 << 40).unwrap_err();
        assert!(matches!(
            err,
            BytebeatError::Evaluation(EvalError::DomainTooLarge {
                len: 1_099_511_627_776,
                max: config::MAX_SAMPLES
            })
        ));
    }
}
