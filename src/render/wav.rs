//! WAV encoding of a [`Waveform`] (16-bit mono PCM).

use super::waveform::Waveform;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

impl Waveform {
    pub fn to_wav(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate(),
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.len() * 2));
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &s in self.samples() {
            writer.write_sample(to_i16(s))?;
        }
        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}

fn to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wav_header_valid() {
        let wav = Waveform::new(vec![0.0, 0.5, -0.5], 8000).to_wav().unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 8000);
        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 1);
    }

    #[test]
    fn wav_size_correct() {
        let wav = Waveform::new(vec![0.0; 8000], 8000).to_wav().unwrap();
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 16000);
        assert_eq!(wav.len(), 44 + 16000);
    }

    #[test]
    fn samples_survive_encoding() {
        let wav = Waveform::new(vec![0.9, -0.9, 0.0], 8000).to_wav().unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(decoded, vec![29490, -29490, 0]);
    }
}
