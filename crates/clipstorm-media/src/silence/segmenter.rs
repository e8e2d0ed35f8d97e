//! Splitting a waveform on silence.
//!
//! Every `min_silence_ms` window, taken at each `seek_step_ms`, is compared
//! against a level relative to the whole track. Runs of silent windows
//! become silent ranges; their complement, widened by `keep_silence_ms` on
//! both sides, is what gets kept.
//!
//! ```text
//!   |--speech--|....silence....|--speech--|..|--speech--|
//!   [  keep  +pad]          [pad+ keep ][  keep   ]
//!                                  overlap split at midpoint
//! ```

use super::config::SilenceTrimConfig;
use super::waveform::Waveform;

/// Label indicating whether a segment should be kept or cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLabel {
    /// Keep this segment in the output.
    Keep,
    /// Cut (remove) this segment from the output.
    Cut,
}

/// A time segment with a Keep or Cut label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Start time in milliseconds.
    pub start_ms: u64,
    /// End time in milliseconds.
    pub end_ms: u64,
    /// Whether to keep or cut this segment.
    pub label: SegmentLabel,
}

impl Segment {
    fn keep(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms,
            label: SegmentLabel::Keep,
        }
    }

    fn cut(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms,
            label: SegmentLabel::Cut,
        }
    }

    /// Duration of this segment in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Prefix sums of squared samples, for O(1) window RMS.
pub struct LoudnessIndex<'a> {
    wave: &'a Waveform,
    prefix: Vec<f64>,
}

impl<'a> LoudnessIndex<'a> {
    pub fn new(wave: &'a Waveform) -> Self {
        let ch = wave.channels() as usize;
        let mut prefix = Vec::with_capacity(wave.frame_count() + 1);
        prefix.push(0.0f64);
        let mut acc = 0.0f64;
        for frame in wave.samples().chunks_exact(ch) {
            acc += frame.iter().map(|s| (*s as f64) * (*s as f64)).sum::<f64>();
            prefix.push(acc);
        }
        Self { wave, prefix }
    }

    /// RMS level of `[start_ms, end_ms)`, full scale 1.0.
    pub fn rms(&self, start_ms: u64, end_ms: u64) -> f64 {
        let start = self.wave.ms_to_frame(start_ms);
        let end = self.wave.ms_to_frame(end_ms);
        if end <= start {
            return 0.0;
        }
        let sum = (self.prefix[end] - self.prefix[start]).max(0.0);
        let n = (end - start) * self.wave.channels() as usize;
        (sum / n as f64).sqrt()
    }

    /// Loudness of the whole track in dBFS; `-inf` for digital silence.
    pub fn track_dbfs(&self) -> f64 {
        to_dbfs(self.rms(0, self.wave.duration_ms()))
    }
}

/// Convert a linear RMS level to dBFS.
pub fn to_dbfs(rms: f64) -> f64 {
    if rms <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * rms.log10()
}

/// Convert dBFS to a linear level; `-inf` maps to `0.0`.
pub fn from_dbfs(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Silent ranges `[start_ms, end_ms)` of the track.
pub fn detect_silence(index: &LoudnessIndex<'_>, config: &SilenceTrimConfig) -> Vec<(u64, u64)> {
    let seg_len = index.wave.duration_ms();
    let min_silence = config.min_silence_ms.max(1);
    if seg_len < min_silence {
        return Vec::new();
    }

    let step = config.seek_step_ms.max(1);
    let threshold = from_dbfs(index.track_dbfs() - config.threshold_offset_db);

    let last_start = seg_len - min_silence;
    let tail = (last_start % step != 0).then_some(last_start);
    let silent_starts: Vec<u64> = (0..=last_start)
        .step_by(step as usize)
        .chain(tail)
        .filter(|&i| index.rms(i, i + min_silence) <= threshold)
        .collect();

    let Some((&first, rest)) = silent_starts.split_first() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut range_start = first;
    let mut prev = first;
    for &start in rest {
        let continuous = start == prev + step;
        let has_gap = start > prev + min_silence;
        if !continuous && has_gap {
            ranges.push((range_start, prev + min_silence));
            range_start = start;
        }
        prev = start;
    }
    ranges.push((range_start, prev + min_silence));
    ranges
}

/// Non-silent ranges `[start_ms, end_ms)` of the track.
pub fn detect_nonsilent(index: &LoudnessIndex<'_>, config: &SilenceTrimConfig) -> Vec<(u64, u64)> {
    let seg_len = index.wave.duration_ms();
    let silent = detect_silence(index, config);

    if silent.is_empty() {
        return vec![(0, seg_len)];
    }
    if silent[0] == (0, seg_len) {
        return Vec::new();
    }

    let mut ranges = Vec::with_capacity(silent.len() + 1);
    let mut prev_end = 0u64;
    for &(start, end) in &silent {
        ranges.push((prev_end, start));
        prev_end = end;
    }
    if prev_end != seg_len {
        ranges.push((prev_end, seg_len));
    }
    if ranges.first() == Some(&(0, 0)) {
        ranges.remove(0);
    }
    ranges
}

/// Ranges to keep, in order, padded and clamped to the track.
///
/// Padded ranges that would overlap meet at the midpoint of the overlap.
/// Returns an empty vector when the whole track is silent.
pub fn split_on_silence(wave: &Waveform, config: &SilenceTrimConfig) -> Vec<Segment> {
    let index = LoudnessIndex::new(wave);
    let pad = config.keep_silence_ms as i64;

    let mut padded: Vec<(i64, i64)> = detect_nonsilent(&index, config)
        .into_iter()
        .map(|(start, end)| (start as i64 - pad, end as i64 + pad))
        .collect();

    for i in 1..padded.len() {
        let last_end = padded[i - 1].1;
        let next_start = padded[i].0;
        if next_start < last_end {
            let mid = (last_end + next_start).div_euclid(2);
            padded[i - 1].1 = mid;
            padded[i].0 = mid;
        }
    }

    let len = wave.duration_ms() as i64;
    padded
        .into_iter()
        .map(|(start, end)| Segment::keep(start.max(0) as u64, end.min(len).max(0) as u64))
        .collect()
}

/// Full Keep/Cut timeline from kept ranges.
pub fn timeline(keeps: &[Segment], total_duration_ms: u64) -> Vec<Segment> {
    let mut out = Vec::with_capacity(keeps.len() * 2 + 1);
    let mut cursor = 0u64;
    for keep in keeps {
        if keep.start_ms > cursor {
            out.push(Segment::cut(cursor, keep.start_ms));
        }
        out.push(keep.clone());
        cursor = cursor.max(keep.end_ms);
    }
    if cursor < total_duration_ms {
        out.push(Segment::cut(cursor, total_duration_ms));
    }
    out
}

/// Calculate statistics about the segments.
pub fn compute_segment_stats(segments: &[Segment]) -> SegmentStats {
    let mut total_keep_ms = 0u64;
    let mut total_cut_ms = 0u64;
    let mut keep_count = 0usize;
    let mut cut_count = 0usize;

    for segment in segments {
        let duration = segment.duration_ms();
        match segment.label {
            SegmentLabel::Keep => {
                total_keep_ms += duration;
                keep_count += 1;
            }
            SegmentLabel::Cut => {
                total_cut_ms += duration;
                cut_count += 1;
            }
        }
    }

    let total_ms = total_keep_ms + total_cut_ms;
    let keep_ratio = if total_ms > 0 {
        total_keep_ms as f64 / total_ms as f64
    } else {
        1.0
    };

    SegmentStats {
        total_keep_ms,
        total_cut_ms,
        keep_count,
        cut_count,
        keep_ratio,
    }
}

/// Statistics about Keep/Cut segments.
#[derive(Debug, Clone)]
pub struct SegmentStats {
    /// Total duration of Keep segments in milliseconds.
    pub total_keep_ms: u64,
    /// Total duration of Cut segments in milliseconds.
    pub total_cut_ms: u64,
    /// Number of Keep segments.
    pub keep_count: usize,
    /// Number of Cut segments.
    pub cut_count: usize,
    /// Ratio of kept content (0.0 to 1.0).
    pub keep_ratio: f64,
}
