//! Scripted page turn settings.
//!
//! Every tunable of an automatic turn is an [`AutoTurnSetting`]: a constant,
//! a random pick between two constants, or a curve sampled over the book or
//! over the turn sequence. Sampling randomness is left to the engine.

use serde::{Deserialize, Serialize};

pub const MIN_TWIST: f32 = -1.0;
pub const MAX_TWIST: f32 = 1.0;
pub const MIN_BEND: f32 = 0.0;
pub const MAX_BEND: f32 = 1.0;
pub const MIN_DURATION: f32 = 0.0;
pub const MAX_DURATION: f32 = 5.0;

/// How a scripted turn grabs the paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoTurnMode {
    /// Swipe the paper surface
    #[default]
    Surface,
    /// Hold the paper edge
    Edge,
}

/// Curve key with Hermite tangents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
}

impl Keyframe {
    /// Key with flat tangents.
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub fn with_tangents(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Piecewise cubic Hermite curve. Evaluation clamps to the end keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct AnimationCurve {
    keys: Vec<Keyframe>,
}

impl From<Vec<Keyframe>> for AnimationCurve {
    fn from(keys: Vec<Keyframe>) -> Self {
        Self::new(keys)
    }
}

impl From<AnimationCurve> for Vec<Keyframe> {
    fn from(curve: AnimationCurve) -> Self {
        curve.keys
    }
}

impl AnimationCurve {
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight line from `(t0, v0)` to `(t1, v1)`.
    pub fn linear(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        let slope = if t1 != t0 { (v1 - v0) / (t1 - t0) } else { 0.0 };
        Self::new(vec![
            Keyframe::with_tangents(t0, v0, slope, slope),
            Keyframe::with_tangents(t1, v1, slope, slope),
        ])
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![Keyframe::new(0.0, value), Keyframe::new(1.0, value)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let i = self.keys.partition_point(|k| k.time <= time);
        let (k0, k1) = (&self.keys[i - 1], &self.keys[i]);
        let dt = k1.time - k0.time;
        if dt <= 0.0 {
            return k1.value;
        }

        let s = (time - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }

    /// Rescale key times into 0..1 and clamp key values into `min..=max`.
    pub fn normalized(&self, min: f32, max: f32) -> Self {
        let (t0, t1) = self
            .keys
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(a, b), k| (a.min(k.time), b.max(k.time)));
        let keys = self
            .keys
            .iter()
            .map(|k| Keyframe {
                time: if t1 > t0 { ((k.time - t0) / (t1 - t0)).clamp(0.0, 1.0) } else { 0.0 },
                value: k.value.clamp(min, max),
                ..*k
            })
            .collect();
        Self::new(keys)
    }
}

/// Which progress a curve setting is sampled at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveTimeMode {
    /// Index of the turned paper over the paper count
    #[default]
    PaperIndexTime,
    /// Index of the turn over the turn count of the sequence
    TurnIndexTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoTurnSettingMode {
    Constant,
    RandomBetweenTwoConstants,
    Curve,
    RandomBetweenTwoCurves,
}

/// One tunable value of a scripted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AutoTurnSetting {
    Constant {
        value: f32,
    },
    RandomBetweenTwoConstants {
        min: f32,
        max: f32,
    },
    Curve {
        curve: AnimationCurve,
        #[serde(default)]
        time_mode: CurveTimeMode,
    },
    RandomBetweenTwoCurves {
        min: AnimationCurve,
        max: AnimationCurve,
        #[serde(default)]
        time_mode: CurveTimeMode,
    },
}

impl Default for AutoTurnSetting {
    fn default() -> Self {
        Self::Constant { value: 0.0 }
    }
}

impl From<f32> for AutoTurnSetting {
    fn from(value: f32) -> Self {
        Self::Constant { value }
    }
}

impl AutoTurnSetting {
    pub fn constant(value: f32) -> Self {
        Self::Constant { value }
    }

    pub fn random(min: f32, max: f32) -> Self {
        Self::RandomBetweenTwoConstants { min, max }
    }

    pub fn curve(curve: AnimationCurve, time_mode: CurveTimeMode) -> Self {
        Self::Curve { curve, time_mode }
    }

    pub fn random_curves(min: AnimationCurve, max: AnimationCurve, time_mode: CurveTimeMode) -> Self {
        Self::RandomBetweenTwoCurves { min, max, time_mode }
    }

    pub fn mode(&self) -> AutoTurnSettingMode {
        match self {
            Self::Constant { .. } => AutoTurnSettingMode::Constant,
            Self::RandomBetweenTwoConstants { .. } => AutoTurnSettingMode::RandomBetweenTwoConstants,
            Self::Curve { .. } => AutoTurnSettingMode::Curve,
            Self::RandomBetweenTwoCurves { .. } => AutoTurnSettingMode::RandomBetweenTwoCurves,
        }
    }

    /// Sample time for curve modes.
    pub fn time(&self, paper_index_time: f32, turn_index_time: f32) -> f32 {
        let mode = match self {
            Self::Curve { time_mode, .. } | Self::RandomBetweenTwoCurves { time_mode, .. } => *time_mode,
            _ => CurveTimeMode::PaperIndexTime,
        };
        match mode {
            CurveTimeMode::PaperIndexTime => paper_index_time,
            CurveTimeMode::TurnIndexTime => turn_index_time,
        }
    }

    /// Bounds the value is picked from at the given progress. Both bounds
    /// are equal for the deterministic modes.
    pub fn range(&self, paper_index_time: f32, turn_index_time: f32) -> (f32, f32) {
        let time = self.time(paper_index_time, turn_index_time);
        match self {
            Self::Constant { value } => (*value, *value),
            Self::RandomBetweenTwoConstants { min, max } => (*min, *max),
            Self::Curve { curve, .. } => {
                let v = curve.evaluate(time);
                (v, v)
            }
            Self::RandomBetweenTwoCurves { min, max, .. } => (min.evaluate(time), max.evaluate(time)),
        }
    }

    /// Clamp constants and curve values into `min..=max`.
    pub fn clamped(&self, min: f32, max: f32) -> Self {
        match self {
            Self::Constant { value } => Self::Constant {
                value: value.clamp(min, max),
            },
            Self::RandomBetweenTwoConstants { min: a, max: b } => Self::RandomBetweenTwoConstants {
                min: a.clamp(min, max),
                max: b.clamp(min, max),
            },
            Self::Curve { curve, time_mode } => Self::Curve {
                curve: curve.normalized(min, max),
                time_mode: *time_mode,
            },
            Self::RandomBetweenTwoCurves { min: a, max: b, time_mode } => Self::RandomBetweenTwoCurves {
                min: a.normalized(min, max),
                max: b.normalized(min, max),
                time_mode: *time_mode,
            },
        }
    }
}

/// Settings of one scripted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoTurnSettings {
    pub mode: AutoTurnMode,
    /// Skews the grab handle along the spine, -1..1
    pub twist: AutoTurnSetting,
    /// How far the paper may curl, 0..1
    pub bend: AutoTurnSetting,
    /// Seconds, 0..5
    pub duration: AutoTurnSetting,
}

impl Default for AutoTurnSettings {
    fn default() -> Self {
        Self {
            mode: AutoTurnMode::Surface,
            twist: AutoTurnSetting::constant(0.0),
            bend: AutoTurnSetting::constant(1.0),
            duration: AutoTurnSetting::constant(0.5),
        }
    }
}

impl AutoTurnSettings {
    pub fn clamped(mut self) -> Self {
        self.twist = self.twist.clamped(MIN_TWIST, MAX_TWIST);
        self.bend = self.bend.clamped(MIN_BEND, MAX_BEND);
        self.duration = self.duration.clamped(MIN_DURATION, MAX_DURATION);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_clamps_ends() {
        let curve = AnimationCurve::new(vec![Keyframe::new(1.0, 5.0), Keyframe::new(0.0, 1.0)]);
        assert_eq!(curve.keys()[0].time, 0.0);
        assert_eq!(curve.evaluate(-1.0), 1.0);
        assert_eq!(curve.evaluate(2.0), 5.0);
        assert_eq!(AnimationCurve::default().evaluate(0.5), 0.0);
    }

    #[test]
    fn test_flat_tangents_ease() {
        let curve = AnimationCurve::new(vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)]);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        // ease in: slower than linear near the start
        assert!(curve.evaluate(0.25) < 0.25);
        assert!((curve.evaluate(0.25) - 0.15625).abs() < 1e-6);
    }

    #[test]
    fn test_linear_curve() {
        let curve = AnimationCurve::linear(0.0, 2.0, 1.0, 4.0);
        assert!((curve.evaluate(0.25) - 2.5).abs() < 1e-5);
        assert!((curve.evaluate(0.75) - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_three_key_curve_passes_through_keys() {
        let curve = AnimationCurve::new(vec![
            Keyframe::new(0.0, 10.0),
            Keyframe::new(0.5, 90.0),
            Keyframe::new(1.0, 170.0),
        ]);
        assert!((curve.evaluate(0.5) - 90.0).abs() < 1e-4);
        assert!(curve.evaluate(0.25) > 10.0 && curve.evaluate(0.25) < 90.0);
    }

    #[test]
    fn test_normalized_curve() {
        let curve = AnimationCurve::new(vec![Keyframe::new(2.0, -3.0), Keyframe::new(4.0, 3.0)]);
        let curve = curve.normalized(-1.0, 1.0);
        assert_eq!(curve.keys()[0].time, 0.0);
        assert_eq!(curve.keys()[1].time, 1.0);
        assert_eq!(curve.keys()[0].value, -1.0);
        assert_eq!(curve.keys()[1].value, 1.0);
    }

    #[test]
    fn test_setting_range_by_time_mode() {
        let curve = AnimationCurve::linear(0.0, 0.0, 1.0, 1.0);
        let paper = AutoTurnSetting::curve(curve.clone(), CurveTimeMode::PaperIndexTime);
        let turn = AutoTurnSetting::curve(curve, CurveTimeMode::TurnIndexTime);
        assert!((paper.range(0.2, 0.8).0 - 0.2).abs() < 1e-5);
        assert!((turn.range(0.2, 0.8).0 - 0.8).abs() < 1e-5);
        assert_eq!(AutoTurnSetting::random(1.0, 2.0).range(0.0, 0.0), (1.0, 2.0));
    }

    #[test]
    fn test_settings_clamped() {
        let settings = AutoTurnSettings {
            twist: AutoTurnSetting::random(-4.0, 4.0),
            duration: AutoTurnSetting::constant(9.0),
            ..Default::default()
        }
        .clamped();
        assert_eq!(settings.twist, AutoTurnSetting::random(MIN_TWIST, MAX_TWIST));
        assert_eq!(settings.duration, AutoTurnSetting::constant(MAX_DURATION));
        assert_eq!(settings.bend, AutoTurnSetting::constant(1.0));
    }

    #[test]
    fn test_settings_json() {
        let json = r#"{
            "mode": "edge",
            "twist": { "mode": "random_between_two_constants", "min": -0.2, "max": 0.2 },
            "duration": { "mode": "curve", "curve": [
                { "time": 0.0, "value": 0.3 },
                { "time": 1.0, "value": 0.6 }
            ] }
        }"#;
        let settings: AutoTurnSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.mode, AutoTurnMode::Edge);
        assert_eq!(settings.twist.mode(), AutoTurnSettingMode::RandomBetweenTwoConstants);
        assert_eq!(settings.bend, AutoTurnSetting::constant(1.0));
        assert!((settings.duration.range(1.0, 0.0).0 - 0.6).abs() < 1e-6);
    }
}
