use serde::Serialize;

/// Peak level after normalization, as a fraction of full scale.
pub const HEADROOM: f32 = 0.9;

/// Center unsigned 8-bit samples on zero and widen to 16-bit PCM.
pub fn to_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes.iter().map(|&b| (i16::from(b) - 128) * 256).collect()
}

/// Scale so the loudest sample sits at [`HEADROOM`]. Silence stays silent.
pub fn normalize(pcm: &[i16]) -> Vec<f32> {
    let peak = pcm.iter().map(|&s| f32::from(s).abs()).fold(0.0f32, f32::max);
    if peak == 0.0 {
        return vec![0.0; pcm.len()];
    }
    pcm.iter().map(|&s| f32::from(s) / peak * HEADROOM).collect()
}

/// A rendered mono signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Waveform {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `[batch, channels, samples]`.
    pub fn shape(&self) -> [usize; 3] {
        [1, 1, self.samples.len()]
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
    }
}
