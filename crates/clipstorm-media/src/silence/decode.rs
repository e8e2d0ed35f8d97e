//! Voice track decoding.
//!
//! WAV input is read directly. Anything the WAV reader cannot open (MP3,
//! compressed WAV variants, video containers) is first re-encoded to
//! canonical 16-bit PCM WAV with FFmpeg and then read.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, info};

use super::waveform::Waveform;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// WAV format of the canonical intermediate and of trimmed output.
pub fn canonical_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Read a WAV file into normalized samples.
pub fn read_wav(path: &Path) -> MediaResult<Waveform> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(Waveform::new(samples, spec.channels, spec.sample_rate))
}

/// Write samples as 16-bit PCM WAV.
pub fn write_wav(path: &Path, samples: &[f32], channels: u16, sample_rate: u32) -> MediaResult<()> {
    let mut writer = WavWriter::create(path, canonical_spec(channels, sample_rate))
        .map_err(|e| MediaError::encode_failed(e.to_string()))?;
    for &sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(pcm)
            .map_err(|e| MediaError::encode_failed(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| MediaError::encode_failed(e.to_string()))
}

/// Path of the canonical intermediate for `input` inside `work_dir`.
fn canonical_path(input: &Path, work_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "voice".to_string());
    work_dir.join(format!("{}_canonical.wav", stem))
}

/// Re-encode any FFmpeg-readable audio to canonical PCM WAV.
pub async fn transcode_to_wav(runner: &FfmpegRunner, input: &Path, output: &Path) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(input, output)
        .no_video()
        .audio_codec("pcm_s16le");
    runner.run(&cmd).await
}

/// Decode a voice track, converting it first when it is not plain WAV.
pub async fn decode_audio(
    runner: &FfmpegRunner,
    input: &Path,
    work_dir: &Path,
) -> MediaResult<Waveform> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    let direct = {
        let input = input.to_path_buf();
        tokio::task::spawn_blocking(move || read_wav(&input))
            .await
            .map_err(|e| MediaError::internal(e.to_string()))?
    };

    let direct_err = match direct {
        Ok(wave) => return Ok(wave),
        Err(e) => e,
    };

    info!(
        input = %input.display(),
        reason = %direct_err,
        "Voice track is not readable WAV, converting to canonical format"
    );

    let canonical = canonical_path(input, work_dir);
    transcode_to_wav(runner, input, &canonical)
        .await
        .map_err(|e| MediaError::decode_failed(format!("{}: {}", input.display(), e)))?;

    let wave = tokio::task::spawn_blocking(move || read_wav(&canonical))
        .await
        .map_err(|e| MediaError::internal(e.to_string()))??;

    debug!(
        frames = wave.frame_count(),
        channels = wave.channels(),
        sample_rate = wave.sample_rate(),
        "Decoded canonical voice track"
    );

    Ok(wave)
}
