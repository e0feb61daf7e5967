//! Scripted page turns.
//!
//! A sequence of automatic turns is a small state machine advanced by
//! [`crate::Book::update`]: the first turn starts immediately, every later one
//! after a sampled delay. Dropping the [`AutoTurnSequence`] cancels whatever
//! has not started yet; papers already falling finish on their own.

use rand::Rng;
use serde::{Deserialize, Serialize};

use folio_config::{
    AutoTurnSetting, AutoTurnSettings, MAX_BEND, MAX_DURATION, MAX_TWIST, MIN_BEND, MIN_DURATION, MIN_TWIST,
};

pub use folio_config::AutoTurnMode;

/// Which way a scripted turn moves through the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoTurnDirection {
    Next,
    Back,
}

impl AutoTurnDirection {
    pub fn is_next(self) -> bool {
        self == Self::Next
    }
}

/// Resolved values for one scripted turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoTurnStep {
    pub mode: AutoTurnMode,
    pub twist: f32,
    pub bend: f32,
    pub duration: f32,
}

/// Pick a value of `setting` at the given progress.
pub fn sample<R: Rng + ?Sized>(setting: &AutoTurnSetting, paper_index_time: f32, turn_index_time: f32, rng: &mut R) -> f32 {
    let (a, b) = setting.range(paper_index_time, turn_index_time);
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo < hi { rng.random_range(lo..=hi) } else { lo }
}

/// Resolve every setting of a turn, clamped into its range.
pub fn sample_step<R: Rng + ?Sized>(
    settings: &AutoTurnSettings,
    paper_index_time: f32,
    turn_index_time: f32,
    rng: &mut R,
) -> AutoTurnStep {
    let mut value = |setting: &AutoTurnSetting, min: f32, max: f32| {
        sample(setting, paper_index_time, turn_index_time, rng).clamp(min, max)
    };
    AutoTurnStep {
        mode: settings.mode,
        twist: value(&settings.twist, MIN_TWIST, MAX_TWIST),
        bend: value(&settings.bend, MIN_BEND, MAX_BEND),
        duration: value(&settings.duration, MIN_DURATION, MAX_DURATION),
    }
}

/// What the book should do after polling a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequenceAction {
    /// Nothing to start this frame
    Wait,
    Turn(AutoTurnStep),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Ready,
    Waiting {
        remaining: f32,
        paper_index_time: f32,
        turn_index_time: f32,
    },
}

/// Pending turns of a scripted sequence.
#[derive(Debug, Clone)]
pub struct AutoTurnSequence {
    direction: AutoTurnDirection,
    settings: AutoTurnSettings,
    delay: AutoTurnSetting,
    count: usize,
    index: usize,
    stage: Stage,
}

impl AutoTurnSequence {
    pub fn new(direction: AutoTurnDirection, settings: AutoTurnSettings, count: usize, delay: AutoTurnSetting) -> Self {
        Self {
            direction,
            settings: settings.clamped(),
            delay,
            count,
            index: 0,
            stage: Stage::Ready,
        }
    }

    pub fn direction(&self) -> AutoTurnDirection {
        self.direction
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Turns started so far.
    pub fn started(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.count
    }

    /// Progress through the sequence; 0 for a single turn.
    pub fn turn_index_time(&self) -> f32 {
        if self.count > 1 {
            self.index as f32 / (self.count - 1) as f32
        } else {
            0.0
        }
    }

    /// Advance by `elapsed` seconds, consuming the time spent waiting.
    ///
    /// `paper_index_time` is the progress of the paper that would turn next,
    /// or `None` when no paper can turn in the sequence's direction.
    pub fn poll<R: Rng + ?Sized>(&mut self, elapsed: &mut f32, paper_index_time: Option<f32>, rng: &mut R) -> SequenceAction {
        loop {
            if self.is_finished() {
                return SequenceAction::Finished;
            }
            match self.stage {
                Stage::Ready => {
                    let Some(paper_index_time) = paper_index_time else {
                        return SequenceAction::Finished;
                    };
                    let turn_index_time = self.turn_index_time();
                    let remaining = if self.index > 0 {
                        sample(&self.delay, paper_index_time, turn_index_time, rng).max(0.0)
                    } else {
                        0.0
                    };
                    self.stage = Stage::Waiting {
                        remaining,
                        paper_index_time,
                        turn_index_time,
                    };
                }
                Stage::Waiting {
                    remaining,
                    paper_index_time,
                    turn_index_time,
                } => {
                    if remaining > *elapsed {
                        self.stage = Stage::Waiting {
                            remaining: remaining - *elapsed,
                            paper_index_time,
                            turn_index_time,
                        };
                        *elapsed = 0.0;
                        return SequenceAction::Wait;
                    }
                    *elapsed -= remaining;
                    self.stage = Stage::Ready;
                    self.index += 1;
                    return SequenceAction::Turn(sample_step(&self.settings, paper_index_time, turn_index_time, rng));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_config::{AnimationCurve, CurveTimeMode};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_sample_constant_and_random() {
        let mut rng = rng();
        assert_eq!(sample(&AutoTurnSetting::constant(0.3), 0.0, 0.0, &mut rng), 0.3);
        for _ in 0..20 {
            let v = sample(&AutoTurnSetting::random(0.8, 0.2), 0.0, 0.0, &mut rng);
            assert!((0.2..=0.8).contains(&v));
        }
    }

    #[test]
    fn test_sample_step_clamps() {
        let settings = AutoTurnSettings {
            twist: AutoTurnSetting::curve(AnimationCurve::linear(0.0, -3.0, 1.0, 3.0), CurveTimeMode::TurnIndexTime),
            ..Default::default()
        };
        let step = sample_step(&settings, 0.0, 1.0, &mut rng());
        assert_eq!(step.twist, MAX_TWIST);
        assert_eq!(step.bend, 1.0);
        assert_eq!(step.duration, 0.5);
        assert_eq!(step.mode, AutoTurnMode::Surface);
    }

    #[test]
    fn test_first_turn_starts_immediately() {
        let mut sequence = AutoTurnSequence::new(
            AutoTurnDirection::Next,
            AutoTurnSettings::default(),
            3,
            AutoTurnSetting::constant(0.25),
        );
        let mut rng = rng();
        let mut elapsed = 0.0;
        assert!(matches!(sequence.poll(&mut elapsed, Some(0.0), &mut rng), SequenceAction::Turn(_)));
        assert_eq!(sequence.started(), 1);

        // second turn waits for the delay
        let mut elapsed = 0.1;
        assert_eq!(sequence.poll(&mut elapsed, Some(0.5), &mut rng), SequenceAction::Wait);
        assert_eq!(elapsed, 0.0);
        let mut elapsed = 0.2;
        assert!(matches!(sequence.poll(&mut elapsed, Some(0.5), &mut rng), SequenceAction::Turn(_)));
        assert!((elapsed - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_zero_delay_fires_in_one_poll() {
        let mut sequence = AutoTurnSequence::new(
            AutoTurnDirection::Back,
            AutoTurnSettings::default(),
            2,
            AutoTurnSetting::constant(0.0),
        );
        let mut rng = rng();
        let mut elapsed = 0.0;
        assert!(matches!(sequence.poll(&mut elapsed, Some(1.0), &mut rng), SequenceAction::Turn(_)));
        assert!(matches!(sequence.poll(&mut elapsed, Some(0.5), &mut rng), SequenceAction::Turn(_)));
        assert!(sequence.is_finished());
        assert_eq!(sequence.poll(&mut elapsed, Some(0.0), &mut rng), SequenceAction::Finished);
    }

    #[test]
    fn test_sequence_stops_when_no_paper_left() {
        let mut sequence = AutoTurnSequence::new(
            AutoTurnDirection::Next,
            AutoTurnSettings::default(),
            5,
            AutoTurnSetting::constant(0.0),
        );
        let mut elapsed = 0.0;
        assert_eq!(sequence.poll(&mut elapsed, None, &mut rng()), SequenceAction::Finished);
    }

    #[test]
    fn test_turn_index_time() {
        let single = AutoTurnSequence::new(AutoTurnDirection::Next, AutoTurnSettings::default(), 1, AutoTurnSetting::constant(0.0));
        assert_eq!(single.turn_index_time(), 0.0);

        let mut sequence = AutoTurnSequence::new(
            AutoTurnDirection::Next,
            AutoTurnSettings::default(),
            3,
            AutoTurnSetting::constant(0.0),
        );
        let mut elapsed = 0.0;
        let _ = sequence.poll(&mut elapsed, Some(0.0), &mut rng());
        assert_eq!(sequence.turn_index_time(), 0.5);
    }
}
