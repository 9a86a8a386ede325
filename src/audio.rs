//! Audio-cue timeline synthesis
//!
//! Turns the frame indices of recorded physics events into the smallest set
//! of play intervals: events closer together than the silence gap share one
//! cue, and a cue rings on for one gap after its last event.

use serde::{Deserialize, Serialize};

/// What a cue plays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueSource {
    /// Resolved sound reference
    Asset(String),
    /// The sound failed to resolve, or none was configured
    Silent,
}

/// One play interval handed to the encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioCue {
    pub source: CueSource,
    pub start_frame: u64,
    pub duration_ms: u64,
}

#[inline]
fn frames_to_ms(frames: u64, fps: u32) -> u64 {
    (frames as f64 / fps.max(1) as f64 * 1000.0).round() as u64
}

/// Coalesce ordered event frames into cues
///
/// An interval closes when the next event is at least `gap` frames after the
/// previous one; its duration covers the last event plus one gap. If the run
/// ends within `gap` frames of the final event, the last interval is measured
/// against `run_end` instead.
pub fn synthesize_cues(
    frames: &[u64],
    gap: u64,
    fps: u32,
    run_end: u64,
    source: &CueSource,
) -> Vec<AudioCue> {
    let Some((&first, rest)) = frames.split_first() else {
        return Vec::new();
    };

    let mut cues = Vec::new();
    let mut start = first;
    let mut last = first;

    for &frame in rest {
        if frame.saturating_sub(last) >= gap {
            cues.push(AudioCue {
                source: source.clone(),
                start_frame: start,
                duration_ms: frames_to_ms(last + gap - start, fps),
            });
            start = frame;
        }
        last = frame;
    }

    let end = if run_end.saturating_sub(last) <= gap {
        run_end.max(last)
    } else {
        last + gap
    };
    cues.push(AudioCue {
        source: source.clone(),
        start_frame: start,
        duration_ms: frames_to_ms(end - start, fps),
    });

    cues
}

/// Merge several cue lists into start-frame order (stable for equal starts)
pub fn merge_timelines(timelines: impl IntoIterator<Item = Vec<AudioCue>>) -> Vec<AudioCue> {
    let mut merged: Vec<AudioCue> = timelines.into_iter().flatten().collect();
    merged.sort_by_key(|c| c.start_frame);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> CueSource {
        CueSource::Asset("bounce.wav".into())
    }

    #[test]
    fn test_two_cues_flushed_against_run_end() {
        let cues = synthesize_cues(&[0, 5, 10, 70], 60, 60, 130, &src());
        assert_eq!(
            cues,
            vec![
                AudioCue {
                    source: src(),
                    start_frame: 0,
                    duration_ms: 1167
                },
                AudioCue {
                    source: src(),
                    start_frame: 70,
                    duration_ms: 1000
                },
            ]
        );
    }

    #[test]
    fn test_no_events_no_cues() {
        assert!(synthesize_cues(&[], 60, 60, 600, &src()).is_empty());
    }

    #[test]
    fn test_single_event_long_before_end() {
        let cues = synthesize_cues(&[30], 60, 60, 600, &src());
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start_frame, 30);
        assert_eq!(cues[0].duration_ms, 1000);
    }

    #[test]
    fn test_final_cue_cut_at_run_end() {
        // run ends 20 frames after the last event
        let cues = synthesize_cues(&[100, 110], 60, 60, 130, &src());
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].duration_ms, 500);
    }

    #[test]
    fn test_dense_events_single_cue() {
        let frames: Vec<u64> = (0..300).step_by(10).collect();
        let cues = synthesize_cues(&frames, 60, 60, 1000, &CueSource::Silent);
        assert_eq!(cues.len(), 1);
        // 290 + 60 frames
        assert_eq!(cues[0].duration_ms, frames_to_ms(350, 60));
        assert_eq!(cues[0].source, CueSource::Silent);
    }

    #[test]
    fn test_merge_orders_by_start() {
        let a = synthesize_cues(&[0, 200], 60, 60, 1000, &src());
        let b = synthesize_cues(&[100], 60, 60, 1000, &CueSource::Silent);
        let merged = merge_timelines([a, b]);
        let starts: Vec<u64> = merged.iter().map(|c| c.start_frame).collect();
        assert_eq!(starts, vec![0, 100, 200]);
    }
}
