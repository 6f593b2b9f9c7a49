use crate::config::TruncationPolicy;
use crate::eval::Samples;

/// Narrow evaluated samples to unsigned 8-bit.
pub fn quantize(samples: &Samples, policy: TruncationPolicy) -> Vec<u8> {
    match (samples, policy) {
        (Samples::Int(v), TruncationPolicy::Wrap) => v.iter().map(|&x| x as u8).collect(),
        (Samples::Int(v), TruncationPolicy::Clamp) => v.iter().map(|&x| x.min(255) as u8).collect(),
        (Samples::Float(v), TruncationPolicy::Wrap) => v.iter().map(|&x| wrap_float(x)).collect(),
        (Samples::Float(v), TruncationPolicy::Clamp) => v.iter().map(|&x| clamp_float(x)).collect(),
    }
}

fn wrap_float(x: f64) -> u8 {
    if !x.is_finite() {
        return 0;
    }
    x.trunc().rem_euclid(256.0) as u8
}

// `as` saturates and maps NaN to 0.
fn clamp_float(x: f64) -> u8 {
    x.clamp(0.0, 255.0) as u8
}
