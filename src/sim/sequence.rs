//! Bounce-driven image sequence playhead
//!
//! A bounce starts playback at `sequence_fps / fps` sequence frames per step.
//! Once `gap` steps pass without another bounce the playhead freezes where it
//! is until the next one.

/// Playback position over a looping list of frame assets
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePlayhead {
    frames: Vec<String>,
    position: f64,
    rate: f64,
    playing_rate: f64,
    last_bounce: u64,
    gap: u64,
}

impl SequencePlayhead {
    pub fn new(frames: Vec<String>, sequence_fps: f32, fps: u32, gap: u64) -> Self {
        Self {
            frames,
            position: 0.0,
            rate: 0.0,
            playing_rate: sequence_fps as f64 / fps.max(1) as f64,
            last_bounce: 0,
            gap,
        }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn is_playing(&self) -> bool {
        self.rate > 0.0
    }

    /// (Re)start playback from the step that bounced
    pub fn on_bounce(&mut self, frame: u64) {
        self.rate = self.playing_rate;
        self.last_bounce = frame;
    }

    /// End of step `frame`: stop after a quiet gap, then move the playhead
    pub fn advance(&mut self, frame: u64) {
        if frame.saturating_sub(self.last_bounce) >= self.gap {
            self.rate = 0.0;
        }
        self.position += self.rate;
    }

    /// Index into `frames` currently shown
    pub fn index(&self) -> usize {
        if self.frames.is_empty() {
            return 0;
        }
        self.position.round() as usize % self.frames.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.frames.get(self.index()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playhead(sequence_fps: f32) -> SequencePlayhead {
        let frames = (1..=3).map(|i| format!("f{i}")).collect();
        SequencePlayhead::new(frames, sequence_fps, 60, 60)
    }

    #[test]
    fn test_idle_until_first_bounce() {
        let mut p = playhead(60.0);
        for frame in 0..100 {
            p.advance(frame);
        }
        assert!(!p.is_playing());
        assert_eq!(p.current(), Some("f1"));
    }

    #[test]
    fn test_bounce_plays_and_wraps() {
        let mut p = playhead(60.0);
        p.on_bounce(10);
        p.advance(10);
        assert_eq!(p.current(), Some("f2"));
        p.advance(11);
        p.advance(12);
        // wraps back to the first frame
        assert_eq!(p.current(), Some("f1"));
    }

    #[test]
    fn test_slower_sequence_rate() {
        let mut p = playhead(20.0);
        p.on_bounce(0);
        p.advance(0);
        assert_eq!(p.index(), 0);
        p.advance(1);
        assert_eq!(p.index(), 1);
    }

    #[test]
    fn test_freezes_after_quiet_gap() {
        let mut p = playhead(60.0);
        p.on_bounce(5);
        for frame in 5..65 {
            p.advance(frame);
        }
        assert!(p.is_playing());
        p.advance(65);
        assert!(!p.is_playing());
        let frozen = p.index();
        p.advance(66);
        assert_eq!(p.index(), frozen);

        p.on_bounce(70);
        assert!(p.is_playing());
    }
}
