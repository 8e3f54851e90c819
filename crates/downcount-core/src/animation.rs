//! Looping text animations for the `{animation:<id>}` placeholder.

/// A single animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame duration in milliseconds, always >= 1.
    pub duration_ms: u64,
    /// Frame text; may itself contain placeholders.
    pub text: String,
}

/// An ordered, looping sequence of frames.
///
/// The current frame is selected by wall-clock epoch milliseconds modulo the
/// total loop duration, so every viewer sees the same frame at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    frames: Vec<Frame>,
    total_ms: u64,
}

impl Animation {
    /// Builds an animation from explicit per-frame durations.
    ///
    /// Durations below one millisecond are clamped up; an empty frame list
    /// degrades to a single empty one-second frame.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        if frames.is_empty() {
            return Self::empty();
        }
        let frames: Vec<Frame> = frames
            .into_iter()
            .map(|f| Frame {
                duration_ms: f.duration_ms.max(1),
                text: f.text,
            })
            .collect();
        let total_ms = frames.iter().map(|f| f.duration_ms).sum::<u64>().max(1);
        Self { frames, total_ms }
    }

    /// Builds an animation where every frame lasts `interval_ms`.
    pub fn uniform(interval_ms: u64, texts: Vec<String>) -> Self {
        let interval_ms = interval_ms.max(1);
        let frames = if texts.is_empty() {
            vec![Frame {
                duration_ms: interval_ms,
                text: String::new(),
            }]
        } else {
            texts
                .into_iter()
                .map(|text| Frame {
                    duration_ms: interval_ms,
                    text,
                })
                .collect()
        };
        Self::from_frames(frames)
    }

    fn empty() -> Self {
        Self {
            frames: vec![Frame {
                duration_ms: 1000,
                text: String::new(),
            }],
            total_ms: 1000,
        }
    }

    /// Total loop duration in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Returns the frame text visible at the given epoch millisecond.
    pub fn frame_at(&self, epoch_ms: i64) -> &str {
        let offset = epoch_ms.rem_euclid(self.total_ms as i64) as u64;
        let mut acc = 0u64;
        for frame in &self.frames {
            acc += frame.duration_ms;
            if offset < acc {
                return &frame.text;
            }
        }
        // offset is always < total_ms, but keep the loop total-proof
        self.frames
            .last()
            .map(|f| f.text.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_frames_cycle() {
        let anim = Animation::uniform(500, vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(anim.total_ms(), 1500);
        assert_eq!(anim.frame_at(0), "a");
        assert_eq!(anim.frame_at(499), "a");
        assert_eq!(anim.frame_at(500), "b");
        assert_eq!(anim.frame_at(1499), "c");
        assert_eq!(anim.frame_at(1500), "a");
    }

    #[test]
    fn test_per_frame_durations() {
        let anim = Animation::from_frames(vec![
            Frame {
                duration_ms: 100,
                text: "x".into(),
            },
            Frame {
                duration_ms: 900,
                text: "y".into(),
            },
        ]);
        assert_eq!(anim.frame_at(99), "x");
        assert_eq!(anim.frame_at(100), "y");
        assert_eq!(anim.frame_at(999), "y");
    }

    #[test]
    fn test_empty_degrades_to_blank_frame() {
        let anim = Animation::from_frames(Vec::new());
        assert_eq!(anim.frame_at(12345), "");
        assert_eq!(anim.total_ms(), 1000);
    }

    #[test]
    fn test_negative_epoch_wraps() {
        let anim = Animation::uniform(1000, vec!["a".into(), "b".into()]);
        // rem_euclid keeps the offset in range for pre-epoch clocks
        assert_eq!(anim.frame_at(-1), "b");
    }
}
