//! WAV and raw PCM conversion helpers.
//!
//! Everything inside redub is mono 16-bit PCM. These helpers bring WAV data
//! from synthesizers and raw `s16le` data from ffmpeg into that shape, and
//! write the composed track back out.

use crate::audio::clip::AudioClip;
use crate::error::{DubError, Result};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Decode WAV data into a mono clip at its native sample rate.
///
/// Integer and float sample formats are accepted; multichannel audio is
/// downmixed by averaging the channels of each frame.
pub fn read_wav<R: Read>(reader: R) -> Result<AudioClip> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| DubError::AudioDecode {
        message: format!("Failed to parse WAV data: {}", e),
    })?;

    let spec = wav_reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (hound::SampleFormat::Int, bits) => {
            let shift = bits.saturating_sub(16) as u32;
            wav_reader
                .samples::<i32>()
                .map(|s| s.map(|v| scale_int(v, bits, shift)))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        (hound::SampleFormat::Float, _) => wav_reader
            .samples::<f32>()
            .map(|s| s.map(f32_to_i16))
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    let mono = if channels > 1 {
        interleaved
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    } else {
        interleaved
    };

    Ok(AudioClip::new(mono, spec.sample_rate))
}

/// Decode WAV bytes that may come from a pipe.
///
/// Writers streaming to stdout cannot seek back to patch the header, so the
/// RIFF and `data` lengths are left at a placeholder (espeak-ng writes
/// `0x7ffff000`). The lengths are rewritten to match the bytes actually
/// present before decoding.
pub fn read_streamed_wav(mut data: Vec<u8>) -> Result<AudioClip> {
    repair_streamed_header(&mut data);
    read_wav(std::io::Cursor::new(data))
}

/// Clamp the RIFF and `data` chunk lengths to the buffer. The data length is
/// rounded down to whole frames. Data that does not look like RIFF/WAVE is
/// left untouched.
fn repair_streamed_header(data: &mut [u8]) {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return;
    }
    let riff_len = (data.len() - 8) as u32;
    data[4..8].copy_from_slice(&riff_len.to_le_bytes());

    let mut block_align = 1usize;
    let mut offset = 12;
    while offset + 8 <= data.len() {
        let id = [
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ];
        let declared = u32::from_le_bytes([
            data[offset + 4],
            data[offset + 5],
            data[offset + 6],
            data[offset + 7],
        ]) as usize;
        let body = offset + 8;

        if &id == b"fmt " && body + 14 <= data.len() {
            block_align = u16::from_le_bytes([data[body + 12], data[body + 13]]).max(1) as usize;
        }
        if &id == b"data" {
            let available = data.len() - body;
            let actual = declared.min(available);
            let actual = actual - actual % block_align;
            data[offset + 4..offset + 8].copy_from_slice(&(actual as u32).to_le_bytes());
            return;
        }
        offset = body.saturating_add(declared).saturating_add(declared & 1);
    }
}

fn scale_int(value: i32, bits: u16, shift: u32) -> i16 {
    if bits < 16 {
        (value << (16 - bits)) as i16
    } else {
        (value >> shift) as i16
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode mono 16-bit samples as WAV into any seekable writer.
pub fn write_wav_to<W: Write + Seek>(writer: W, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav_writer = hound::WavWriter::new(writer, spec)?;
    for &s in samples {
        wav_writer.write_sample(s)?;
    }
    wav_writer.finalize()?;
    Ok(())
}

/// Encode mono 16-bit samples as a WAV file at `path`.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_wav_to(file, samples, sample_rate)
}

/// Interpret raw little-endian signed 16-bit PCM bytes.
///
/// A trailing odd byte is ignored.
pub fn pcm_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
