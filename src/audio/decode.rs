// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Clip decoding and sample rate conversion.
//!
//! Uses Symphonia to probe and decode a whole clip held in memory, keeping
//! the first channel as mono, and rubato to bring it to the device rate.

use std::io::{Cursor, ErrorKind};

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{SampleBuffer as InterleavedBuffer, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use super::{AudioError, SampleBuffer};

/// Input block size for the sinc resampler
const RESAMPLE_CHUNK: usize = 1024;

/// Decode an encoded clip into a mono buffer.
///
/// `extension` is a probe hint (e.g. `"wav"`); the container is still
/// sniffed from the bytes when it is missing or wrong.
pub fn decode_clip(bytes: Vec<u8>, extension: Option<&str>) -> Result<SampleBuffer, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::Decode("no default audio track".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut sample_rate = codec_params.sample_rate;
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(reason)) => {
                debug!(reason, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        let channels = spec.channels.count().max(1);

        let mut interleaved = InterleavedBuffer::<f32>::new(decoded.frames() as u64, spec);
        interleaved.copy_interleaved_ref(decoded);
        samples.extend(interleaved.samples().iter().step_by(channels).copied());
    }

    let sample_rate = sample_rate
        .ok_or_else(|| AudioError::Decode("unknown sample rate".to_string()))?;
    Ok(SampleBuffer::new(samples, sample_rate))
}

/// Convert a clip to `target_rate`, keeping its duration
pub fn resample(buffer: &SampleBuffer, target_rate: u32) -> Result<SampleBuffer, AudioError> {
    let source_rate = buffer.sample_rate();
    if source_rate == target_rate || buffer.is_empty() {
        return Ok(SampleBuffer::new(buffer.samples().to_vec(), target_rate));
    }

    let failed = |reason: String| AudioError::Resample {
        from: source_rate,
        to: target_rate,
        reason,
    };

    let sinc_params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = target_rate as f64 / source_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_params, RESAMPLE_CHUNK, 1)
        .map_err(|e| failed(e.to_string()))?;

    let input = buffer.samples();
    let expected = (input.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay);

    let mut pos = 0;
    while input.len() - pos >= resampler.input_frames_next() {
        let n = resampler.input_frames_next();
        let block: &[&[f32]] = &[&input[pos..pos + n]];
        let chunk = resampler
            .process(block, None)
            .map_err(|e| failed(e.to_string()))?;
        output.extend_from_slice(&chunk[0]);
        pos += n;
    }

    if pos < input.len() {
        let tail: &[&[f32]] = &[&input[pos..]];
        let chunk = resampler
            .process_partial(Some(tail), None)
            .map_err(|e| failed(e.to_string()))?;
        output.extend_from_slice(&chunk[0]);
    }

    // Flush the filter tail until the delayed output covers the whole clip
    while output.len() < delay + expected {
        let chunk = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| failed(e.to_string()))?;
        if chunk[0].is_empty() {
            break;
        }
        output.extend_from_slice(&chunk[0]);
    }

    let end = (delay + expected).min(output.len());
    let start = delay.min(end);
    Ok(SampleBuffer::new(output[start..end].to_vec(), target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn wav_bytes(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for s in samples {
                writer.write_sample(*s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_mono_wav() {
        let bytes = wav_bytes(&[0, 16384, -16384, 0], 1, 8000);
        let buffer = decode_clip(bytes, Some("wav")).unwrap();
        assert_eq!(buffer.sample_rate(), 8000);
        assert_eq!(buffer.len(), 4);
        assert!((buffer.samples()[1] - 0.5).abs() < 0.001);
        assert!((buffer.samples()[2] + 0.5).abs() < 0.001);
    }

    #[test]
    fn test_decode_stereo_keeps_first_channel() {
        // Interleaved L/R: left carries the signal, right is silent
        let bytes = wav_bytes(&[16384, 0, 16384, 0, 16384, 0], 2, 22050);
        let buffer = decode_clip(bytes, Some("wav")).unwrap();
        assert_eq!(buffer.sample_rate(), 22050);
        assert_eq!(buffer.len(), 3);
        assert!(buffer.samples().iter().all(|s| (s - 0.5).abs() < 0.001));
    }

    #[test]
    fn test_decode_without_hint() {
        let bytes = wav_bytes(&[1000; 16], 1, 8000);
        let buffer = decode_clip(bytes, None).unwrap();
        assert_eq!(buffer.len(), 16);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_clip(b"definitely not audio".to_vec(), Some("wav"));
        assert!(result.is_err());
    }

    #[test]
    fn test_resample_same_rate_is_copy() {
        let buffer = SampleBuffer::new(vec![0.1, 0.2, 0.3], 44100);
        let out = resample(&buffer, 44100).unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn test_resample_keeps_duration() {
        let buffer = SampleBuffer::new(vec![0.25; 22050], 22050);
        let out = resample(&buffer, 44100).unwrap();
        assert_eq!(out.sample_rate(), 44100);
        let diff = (out.len() as i64 - 44100).abs();
        assert!(diff < 64, "unexpected resampled length {}", out.len());
    }
}
