//! Vectorized evaluation of a validated [`Expr`] over a sample domain.
//!
//! The domain is split into chunks of `chunk_size` indices. Each chunk
//! walks the tree once, every node producing a whole [`Lane`] of values,
//! and chunk results are joined in domain order. With the `parallel`
//! feature the chunks run on the rayon pool; the output is identical
//! either way.

mod lane;
mod operators;
mod value;

pub use lane::Lane;
pub use value::{Samples, Value, to_uint32};

use crate::ast::{Expr, Literal};
use crate::config::{EvalConfig, NonFinite};
use crate::error::EvalError;
use tracing::{debug, trace, warn};

/// The sample-index domain `0..sample_count`. Indices are `u32`, so a
/// count past `u32::MAX` cannot be represented.
pub fn domain(sample_count: usize) -> Result<Vec<u32>, EvalError> {
    let end = u32::try_from(sample_count).map_err(|_| EvalError::DomainTooLarge {
        len: sample_count,
        max: u32::MAX as usize,
    })?;
    Ok((0..end).collect())
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Evaluator { config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate `expr` over `t = 0..sample_count`. The length limit is
    /// checked before the domain is allocated.
    pub fn evaluate_domain(&self, expr: &Expr, sample_count: usize) -> Result<Samples, EvalError> {
        self.check_len(sample_count)?;
        self.evaluate(expr, &domain(sample_count)?)
    }

    /// Evaluate `expr` at every index in `t`. The result has exactly
    /// `t.len()` samples.
    pub fn evaluate(&self, expr: &Expr, t: &[u32]) -> Result<Samples, EvalError> {
        self.check_len(t.len())?;
        let chunk_size = self.config.chunk_size.max(1);
        debug!(
            samples = t.len(),
            nodes = expr.node_count(),
            chunks = t.len().div_ceil(chunk_size),
            "evaluating expression"
        );

        let samples = if t.is_empty() {
            self.evaluate_chunk(expr, t, 0)?
        } else {
            Samples::concat(self.evaluate_chunks(expr, t, chunk_size)?)
        };

        if samples.len() != t.len() {
            return Err(EvalError::ShapeMismatch {
                expected: t.len(),
                found: samples.len(),
            });
        }
        if self.config.non_finite == NonFinite::Fail {
            if let Some(index) = samples
                .as_float()
                .and_then(|v| v.iter().position(|x| !x.is_finite()))
            {
                warn!(index, "non-finite sample");
                return Err(EvalError::NonNumericResult { index });
            }
        }
        Ok(samples)
    }

    fn check_len(&self, len: usize) -> Result<(), EvalError> {
        if len > self.config.max_samples {
            return Err(EvalError::DomainTooLarge {
                len,
                max: self.config.max_samples,
            });
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn evaluate_chunks(
        &self,
        expr: &Expr,
        t: &[u32],
        chunk_size: usize,
    ) -> Result<Vec<Samples>, EvalError> {
        use rayon::prelude::*;

        // Collected before short-circuiting so the reported error is the
        // earliest one in domain order.
        let parts: Vec<Result<Samples, EvalError>> = t
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| self.evaluate_chunk(expr, chunk, i * chunk_size))
            .collect();
        parts.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_chunks(
        &self,
        expr: &Expr,
        t: &[u32],
        chunk_size: usize,
    ) -> Result<Vec<Samples>, EvalError> {
        t.chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| self.evaluate_chunk(expr, chunk, i * chunk_size))
            .collect()
    }

    fn evaluate_chunk(&self, expr: &Expr, chunk: &[u32], offset: usize) -> Result<Samples, EvalError> {
        trace!(offset, len = chunk.len(), "chunk");
        let value = self.eval(expr, chunk).map_err(|e| {
            let e = e.offset_by(offset);
            warn!(error = %e, "evaluation failed");
            e
        })?;
        let len = chunk.len();
        let found = match &value {
            Value::Int(Lane::Each(v)) => v.len(),
            Value::Float(Lane::Each(v)) => v.len(),
            _ => len,
        };
        let samples = match value {
            Value::Int(lane) => lane.into_vec(len).map(Samples::Int),
            Value::Float(lane) => lane.into_vec(len).map(Samples::Float),
        };
        samples.ok_or(EvalError::ShapeMismatch { expected: len, found })
    }

    fn eval(&self, expr: &Expr, t: &[u32]) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(Literal::Int(n)) => Ok(Value::Int(Lane::Splat(*n))),
            Expr::Literal(Literal::Float(x)) => Ok(Value::Float(Lane::Splat(*x))),
            Expr::Variable(_) => Ok(Value::Int(Lane::Each(t.to_vec()))),
            Expr::Unary { op, operand } => Ok(operators::unary(*op, self.eval(operand, t)?)),
            Expr::Binary { op, left, right } => {
                let l = self.eval(left, t)?;
                let r = self.eval(right, t)?;
                operators::binary(*op, l, r, self.config.division_by_zero)
            }
            Expr::Call { function, args } => {
                let malformed = || EvalError::MalformedCall {
                    function: function.name(),
                    found: args.len(),
                };
                match args.as_slice() {
                    [x] => operators::call1(*function, self.eval(x, t)?).ok_or_else(malformed),
                    [x, y] => {
                        let a = self.eval(x, t)?;
                        let b = self.eval(y, t)?;
                        operators::call2(*function, a, b).ok_or_else(malformed)
                    }
                    _ => Err(malformed()),
                }
            }
        }
    }
}
