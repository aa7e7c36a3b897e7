//! Score, level and the score-derived difficulty curve.

use crate::config::Tuning;
use crate::game::RunState;

/// `min(1 + score * step, cap)`. Non-decreasing in score.
pub fn difficulty_multiplier(score: u32, step: f64, cap: f64) -> f64 {
    (1.0 + f64::from(score) * step).min(cap)
}

pub fn scroll_speed(base_dx: f64, multiplier: f64) -> f64 {
    base_dx * multiplier
}

pub fn spawn_interval(base_interval: u32, multiplier: f64) -> u32 {
    (f64::from(base_interval) / multiplier).floor() as u32
}

pub fn level_for(score: u32, points_per_level: u32) -> u32 {
    score / points_per_level + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
}

/// Score and level rules, applied to the loop's `RunState`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRules {
    step: f64,
    cap: f64,
    points_per_level: u32,
}

impl ScoreRules {
    pub fn new(t: &Tuning) -> Self {
        Self {
            step: t.difficulty_step,
            cap: t.difficulty_cap,
            points_per_level: t.points_per_level,
        }
    }

    pub fn multiplier(&self, run: &RunState) -> f64 {
        difficulty_multiplier(run.score, self.step, self.cap)
    }

    /// One point per retired obstacle. Reports the last level reached if any
    /// point crossed a level boundary.
    pub fn award(&self, run: &mut RunState, points: u32) -> Option<LevelUp> {
        let mut level_up = None;
        for _ in 0..points {
            run.score += 1;
            let level = level_for(run.score, self.points_per_level);
            if level > run.level {
                run.level = level;
                level_up = Some(LevelUp { level });
            }
        }
        level_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_grows_then_caps() {
        assert_eq!(difficulty_multiplier(0, 0.02, 2.5), 1.0);
        assert!((difficulty_multiplier(10, 0.02, 2.5) - 1.2).abs() < 1e-12);
        assert_eq!(difficulty_multiplier(80, 0.02, 2.5), 2.5);
        assert_eq!(difficulty_multiplier(10_000, 0.02, 2.5), 2.5);
    }

    #[test]
    fn multiplier_is_monotonic() {
        let mut prev = 0.0;
        for score in 0..200 {
            let m = difficulty_multiplier(score, 0.02, 2.5);
            assert!(m >= prev);
            assert!(m <= 2.5);
            prev = m;
        }
    }

    #[test]
    fn speed_and_interval_follow_multiplier() {
        assert_eq!(scroll_speed(2.0, 1.5), 3.0);
        assert_eq!(spawn_interval(110, 1.0), 110);
        assert_eq!(spawn_interval(110, 1.2), 91);
    }

    #[test]
    fn level_every_ten_points() {
        assert_eq!(level_for(0, 10), 1);
        assert_eq!(level_for(9, 10), 1);
        assert_eq!(level_for(10, 10), 2);
        assert_eq!(level_for(25, 10), 3);
    }

    #[test]
    fn award_reports_level_up() {
        let rules = ScoreRules::new(&Tuning::default());
        let mut run = RunState::default();
        assert_eq!(rules.award(&mut run, 9), None);
        assert_eq!(rules.award(&mut run, 1), Some(LevelUp { level: 2 }));
        assert_eq!((run.score, run.level), (10, 2));
        assert_eq!(rules.award(&mut run, 0), None);
        assert_eq!(rules.award(&mut run, 25), Some(LevelUp { level: 4 }));
    }

    #[test]
    fn rules_multiplier_reads_run_score() {
        let rules = ScoreRules::new(&Tuning::default());
        let run = RunState {
            score: 50,
            ..RunState::default()
        };
        assert!((rules.multiplier(&run) - 2.0).abs() < 1e-12);
    }
}
