//! Pipe pairs, the live obstacle queue and the spawner that feeds it.
//!
//! Obstacles enter at the right edge in spawn order and leave from the head
//! of the queue once their trailing edge crosses x = 0.

use rand::Rng;
use std::collections::VecDeque;
use std::ops::RangeInclusive;

use crate::collision::{Rect, Viewport};
use crate::config::{SpawnPolicy, Tuning};
use crate::game::RunState;
use crate::scoring;

/// A pipe pair. Only the gap's top edge varies; gap height is shared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub gap_start: f64,
}

impl Obstacle {
    pub fn top_segment(&self, pipe_w: f64) -> Rect {
        Rect {
            left: self.x,
            top: 0.0,
            right: self.x + pipe_w,
            bottom: self.gap_start,
        }
    }

    pub fn bottom_segment(&self, pipe_w: f64, gap: f64, height: f64) -> Rect {
        Rect {
            left: self.x,
            top: self.gap_start + gap,
            right: self.x + pipe_w,
            bottom: height,
        }
    }
}

/// Live obstacles in spawn order. The head is always the leftmost one, since
/// every pipe enters at the right edge and all scroll at the same speed.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    queue: VecDeque<Obstacle>,
    pipe_w: f64,
    gap: f64,
}

impl ObstacleField {
    pub fn new(pipe_w: f64, gap: f64) -> Self {
        Self {
            queue: VecDeque::new(),
            pipe_w,
            gap,
        }
    }

    pub fn pipe_w(&self) -> f64 {
        self.pipe_w
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.queue.iter()
    }

    /// The most recently spawned obstacle.
    pub fn last(&self) -> Option<&Obstacle> {
        self.queue.back()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn push(&mut self, obstacle: Obstacle) {
        self.queue.push_back(obstacle);
    }

    pub fn scroll(&mut self, dx: f64) {
        for o in &mut self.queue {
            o.x -= dx;
        }
    }

    /// Pops every obstacle whose trailing edge has crossed x = 0 and returns
    /// them, oldest first.
    pub fn retire_passed(&mut self) -> Vec<Obstacle> {
        let mut passed = Vec::new();
        while let Some(front) = self.queue.front() {
            if front.x + self.pipe_w > 0.0 {
                break;
            }
            if let Some(o) = self.queue.pop_front() {
                passed.push(o);
            }
        }
        passed
    }
}

/// Valid gap-start values for a viewport, or `None` when the surface is too
/// short to fit both minimum-length segments plus the gap.
pub fn gap_bounds(height: f64, gap: f64, min_segment: f64) -> Option<RangeInclusive<i64>> {
    let lo = min_segment.ceil() as i64;
    let hi = (height - gap - min_segment).floor() as i64;
    if hi < lo {
        return None;
    }
    Some(lo..=hi)
}

/// Places new obstacles on the right edge.
#[derive(Debug, Clone)]
pub struct Spawner {
    policy: SpawnPolicy,
    base_interval: u32,
    min_segment: f64,
}

impl Spawner {
    pub fn new(t: &Tuning) -> Self {
        Self {
            policy: t.spawn_policy,
            base_interval: t.base_spawn_interval,
            min_segment: t.min_segment,
        }
    }

    pub fn policy(&self) -> SpawnPolicy {
        self.policy
    }

    /// Ticks between spawns at the given difficulty multiplier.
    pub fn interval(&self, multiplier: f64) -> u32 {
        match self.policy {
            SpawnPolicy::Dynamic => scoring::spawn_interval(self.base_interval, multiplier),
            SpawnPolicy::FixedInterval { interval } => interval,
        }
    }

    /// Advances the spawn clock by one tick and spawns when due. Returns the
    /// new obstacle, if any.
    pub fn update<R: Rng>(
        &self,
        run: &mut RunState,
        multiplier: f64,
        field: &mut ObstacleField,
        viewport: Viewport,
        rng: &mut R,
    ) -> Option<Obstacle> {
        run.frames_since_spawn = run.frames_since_spawn.saturating_add(1);
        let due = match self.policy {
            SpawnPolicy::Dynamic => run.frames_since_spawn > self.interval(multiplier),
            SpawnPolicy::FixedInterval { interval } => run.frame % u64::from(interval) == 0,
        };
        if !due {
            return None;
        }

        let Some(bounds) = gap_bounds(viewport.height, field.gap(), self.min_segment) else {
            tracing::debug!(height = viewport.height, "viewport too short, skipping spawn");
            return None;
        };
        // After a shrink the newest pipe can still sit past the right edge
        if field.last().is_some_and(|tail| tail.x >= viewport.width) {
            tracing::debug!(width = viewport.width, "right edge occupied, deferring spawn");
            return None;
        }
        let obstacle = Obstacle {
            x: viewport.width,
            gap_start: rng.gen_range(bounds) as f64,
        };
        field.push(obstacle);
        run.frames_since_spawn = 0;
        tracing::debug!(x = obstacle.x, gap_start = obstacle.gap_start, "spawned obstacle");
        Some(obstacle)
    }
}
