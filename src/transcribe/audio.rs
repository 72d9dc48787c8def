use hound::{SampleFormat, WavReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Whisper's required sample rate
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Minimum silence duration to split chunks (in seconds)
pub const MIN_SILENCE_DURATION_SECS: f32 = 2.0;
/// Silence threshold - windows with RMS below this are considered silence
/// This is normalized, so 0.01 = about -40dB
const SILENCE_THRESHOLD: f32 = 0.01;
/// Window size for silence detection (in samples at 16kHz)
const SILENCE_WINDOW_SIZE: usize = 1600; // 100ms windows
/// Chunks shorter than this are not worth transcribing
const MIN_CHUNK_SAMPLES: usize = (WHISPER_SAMPLE_RATE / 2) as usize;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read WAV: {0}")]
    Wav(#[from] hound::Error),
    #[error("Unsupported audio: {0}")]
    Unsupported(String),
}

/// A span of speech cut out of the full recording
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Chunk index (0-based)
    pub index: usize,
    /// Audio samples at 16kHz
    pub samples: Vec<f32>,
    /// Start time offset in seconds
    pub start_time_secs: f32,
    /// End time offset in seconds
    pub end_time_secs: f32,
}

impl AudioChunk {
    pub fn duration_secs(&self) -> f32 {
        self.end_time_secs - self.start_time_secs
    }
}

/// Read a WAV file and return 16kHz mono samples in [-1.0, 1.0]
pub fn load_wav(path: &Path) -> Result<Vec<f32>, AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    info!(
        "Reading {:?}: {} Hz, {} channel(s), {}-bit {:?}",
        path, spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    );

    if spec.channels == 0 {
        return Err(AudioError::Unsupported("WAV has no channels".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = downmix_to_mono(&interleaved, spec.channels as usize);
    let samples = resample_to_16k(&mono, spec.sample_rate)?;

    info!(
        "Prepared {} samples at 16kHz ({:.1}s)",
        samples.len(),
        samples.len() as f32 / WHISPER_SAMPLE_RATE as f32
    );

    Ok(samples)
}

/// Average interleaved channels into one
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Bring mono samples to 16kHz.
///
/// Integer multiples of 16kHz are downsampled by averaging; other rates use
/// linear interpolation.
pub fn resample_to_16k(samples: &[f32], sample_rate: u32) -> Result<Vec<f32>, AudioError> {
    if sample_rate == 0 {
        return Err(AudioError::Unsupported("sample rate of 0 Hz".into()));
    }
    if sample_rate == WHISPER_SAMPLE_RATE {
        return Ok(samples.to_vec());
    }

    if sample_rate % WHISPER_SAMPLE_RATE == 0 {
        let ratio = (sample_rate / WHISPER_SAMPLE_RATE) as usize;
        debug!("Downsampling {} Hz by averaging every {} samples", sample_rate, ratio);
        return Ok(samples
            .chunks(ratio)
            .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
            .collect());
    }

    debug!("Resampling {} Hz to 16kHz with linear interpolation", sample_rate);
    let step = sample_rate as f64 / WHISPER_SAMPLE_RATE as f64;
    let out_len = (samples.len() as u64 * WHISPER_SAMPLE_RATE as u64 / sample_rate as u64) as usize;

    Ok((0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos as usize).min(samples.len() - 1);
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx];
            let b = samples.get(idx + 1).copied().unwrap_or(a);
            a + (b - a) * frac
        })
        .collect())
}

/// Check if a window of samples is silence
fn is_silence_window(samples: &[f32]) -> bool {
    if samples.is_empty() {
        return true;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    let rms = (sum_squares / samples.len() as f32).sqrt();

    rms < SILENCE_THRESHOLD
}

/// Find silence regions as (start_sample, end_sample) pairs at least
/// `min_silence_samples` long
fn find_silence_regions(samples: &[f32], min_silence_samples: usize) -> Vec<(usize, usize)> {
    let mut regions = Vec::new();
    let mut silence_start: Option<usize> = None;

    for (w, window) in samples.chunks(SILENCE_WINDOW_SIZE).enumerate() {
        let pos = w * SILENCE_WINDOW_SIZE;

        match (is_silence_window(window), silence_start) {
            (true, None) => silence_start = Some(pos),
            (false, Some(start)) => {
                if pos - start >= min_silence_samples {
                    regions.push((start, pos));
                }
                silence_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = silence_start {
        if samples.len() - start >= min_silence_samples {
            regions.push((start, samples.len()));
        }
    }

    regions
}

/// Split 16kHz samples into speech chunks separated by long silences.
///
/// Each chunk boundary sits in the middle of a silence region. Chunks that
/// are very short or entirely silent are dropped, so the recognizer never
/// sees pure silence.
pub fn split_on_silence(samples: &[f32], min_silence_secs: f32) -> Vec<AudioChunk> {
    let min_silence_samples = (min_silence_secs.max(0.0) * WHISPER_SAMPLE_RATE as f32) as usize;
    let regions = find_silence_regions(samples, min_silence_samples.max(1));

    let mut boundaries = vec![0];
    boundaries.extend(regions.iter().map(|(start, end)| start + (end - start) / 2));
    boundaries.push(samples.len());

    let mut chunks = Vec::new();
    for pair in boundaries.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if to <= from {
            continue;
        }

        let chunk_samples = &samples[from..to];
        if chunk_samples.len() < MIN_CHUNK_SAMPLES || is_silence_window(chunk_samples) {
            continue;
        }

        chunks.push(AudioChunk {
            index: chunks.len(),
            samples: chunk_samples.to_vec(),
            start_time_secs: from as f32 / WHISPER_SAMPLE_RATE as f32,
            end_time_secs: to as f32 / WHISPER_SAMPLE_RATE as f32,
        });
    }

    info!(
        "Split {:.1}s of audio into {} speech chunks (silence >= {:.1}s)",
        samples.len() as f32 / WHISPER_SAMPLE_RATE as f32,
        chunks.len(),
        min_silence_secs
    );

    chunks
}
