//! Axis-aligned hit tests between the player and the pipes.

use crate::obstacles::{Obstacle, ObstacleField};
use crate::physics::PlayerBody;

/// Current drawable area in world units. Read fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn inset(self, margin: f64) -> Rect {
        Rect {
            left: self.left + margin,
            top: self.top + margin,
            right: self.right - margin,
            bottom: self.bottom - margin,
        }
    }

    pub fn overlaps_span(&self, left: f64, right: f64) -> bool {
        self.right > left && self.left < right
    }
}

/// Raised when the player hitbox enters a pipe segment. Always ends the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeCollision {
    pub obstacle_x: f64,
}

/// Player bounds shrunk by `inset` on every side; grazing a pipe is forgiven.
pub fn player_hitbox(body: &PlayerBody, inset: f64) -> Rect {
    body.bounds().inset(inset)
}

/// True when the hitbox shares the obstacle's columns and pokes out of its gap.
pub fn hits_obstacle(hitbox: &Rect, obstacle: &Obstacle, pipe_w: f64, gap: f64) -> bool {
    if !hitbox.overlaps_span(obstacle.x, obstacle.x + pipe_w) {
        return false;
    }
    hitbox.top < obstacle.gap_start || hitbox.bottom > obstacle.gap_start + gap
}

/// Tests every live obstacle; stops at the first hit.
pub fn check(body: &PlayerBody, field: &ObstacleField, inset: f64) -> Option<PipeCollision> {
    let hitbox = player_hitbox(body, inset);
    field
        .iter()
        .find(|o| hits_obstacle(&hitbox, o, field.pipe_w(), field.gap()))
        .map(|o| PipeCollision { obstacle_x: o.x })
}
