use super::lane::Lane;
use serde::Serialize;

/// A node's result: 32-bit unsigned integers or doubles.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(Lane<u32>),
    Float(Lane<f64>),
}

impl Value {
    pub fn into_float(self) -> Lane<f64> {
        match self {
            Value::Int(lane) => lane.map(f64::from),
            Value::Float(lane) => lane,
        }
    }

    /// Integer view for bitwise operators; floats go through [`to_uint32`].
    pub fn into_uint(self) -> Lane<u32> {
        match self {
            Value::Int(lane) => lane,
            Value::Float(lane) => lane.map(to_uint32),
        }
    }
}

/// ECMAScript `ToUint32`: truncate toward zero, reduce modulo 2^32;
/// NaN and ±inf become 0.
pub fn to_uint32(x: f64) -> u32 {
    if !x.is_finite() {
        return 0;
    }
    x.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// The evaluated waveform, one value per sample index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum Samples {
    Int(Vec<u32>),
    Float(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int(v) => v.len(),
            Samples::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Samples::Int(v) => v.get(index).map(|&x| f64::from(x)),
            Samples::Float(v) => v.get(index).copied(),
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Samples::Int(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Samples::Float(v) => v.clone(),
        }
    }

    pub fn as_int(&self) -> Option<&[u32]> {
        match self {
            Samples::Int(v) => Some(v),
            Samples::Float(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Samples::Int(_) => None,
            Samples::Float(v) => Some(v),
        }
    }

    /// Join per-chunk results in order. All chunks of one tree share a
    /// type; a mix is widened to float.
    pub(crate) fn concat(parts: Vec<Samples>) -> Samples {
        if parts.iter().all(|p| matches!(p, Samples::Int(_))) {
            let mut out = Vec::with_capacity(parts.iter().map(Samples::len).sum());
            for part in parts {
                if let Samples::Int(v) = part {
                    out.extend(v);
                }
            }
            return Samples::Int(out);
        }
        let mut out = Vec::with_capacity(parts.iter().map(Samples::len).sum());
        for part in parts {
            match part {
                Samples::Int(v) => out.extend(v.into_iter().map(f64::from)),
                Samples::Float(v) => out.extend(v),
            }
        }
        Samples::Float(out)
    }
}
