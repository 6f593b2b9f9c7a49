//! From evaluated samples to audio: 8-bit quantization, 16-bit PCM,
//! peak normalization and WAV encoding.

mod quantize;
mod wav;
mod waveform;

pub use quantize::quantize;
pub use waveform::{HEADROOM, Waveform, normalize, to_pcm16};

use crate::config::TruncationPolicy;
use crate::eval::Samples;
use tracing::debug;

/// Run the full audio pipeline over evaluated samples.
pub fn render(samples: &Samples, policy: TruncationPolicy, sample_rate: u32) -> Waveform {
    let bytes = quantize(samples, policy);
    let pcm = to_pcm16(&bytes);
    let waveform = Waveform::new(normalize(&pcm), sample_rate);
    debug!(
        samples = waveform.len(),
        sample_rate,
        peak = waveform.peak(),
        "rendered waveform"
    );
    waveform
}
