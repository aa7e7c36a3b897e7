//! The run state machine: Idle → Running → Over.
//!
//! [`Game`] owns every piece of mutable gameplay state. One call to
//! [`Game::tick`] is one simulation step and runs, in order: obstacle spawn
//! and scroll, player physics, pipe collision, scoring. Inputs arrive through
//! [`Game::activate`], [`Game::restart`] and [`Game::home`].

use rand::rngs::StdRng;

use crate::assets::CharacterId;
use crate::collision::{self, Viewport};
use crate::config::{SpawnPolicy, Tuning};
use crate::effects::{Effect, Effects};
use crate::highscore::{HighScore, ScoreStore};
use crate::obstacles::{ObstacleField, Spawner};
use crate::physics::PlayerBody;
use crate::scoring::{self, ScoreRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crash {
    Ground,
    Pipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running. Nothing was touched.
    Halted,
    Advanced { scored: u32 },
    Ended(Crash),
}

/// Per-run counters and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub frame: u64,
    pub frames_since_spawn: u32,
    /// Ticks left on the "level N" banner.
    pub banner_ticks: u32,
    pub crash: Option<Crash>,
    /// The finished run beat the stored best.
    pub new_best: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            level: 1,
            frame: 0,
            frames_since_spawn: 0,
            banner_ticks: 0,
            crash: None,
            new_best: false,
        }
    }
}

pub struct Game<S> {
    tuning: Tuning,
    body: PlayerBody,
    field: ObstacleField,
    spawner: Spawner,
    rules: ScoreRules,
    run: RunState,
    high_score: HighScore<S>,
    character: CharacterId,
    rng: StdRng,
}

impl<S: ScoreStore> Game<S> {
    pub fn new(tuning: Tuning, store: S, character: CharacterId, rng: StdRng) -> Self {
        Self {
            body: PlayerBody::new(&tuning),
            field: ObstacleField::new(tuning.pipe_w, tuning.pipe_gap),
            spawner: Spawner::new(&tuning),
            rules: ScoreRules::new(&tuning),
            run: RunState::default(),
            high_score: HighScore::open(store),
            character,
            rng,
            tuning,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> Phase {
        self.run.phase
    }

    pub fn is_running(&self) -> bool {
        self.run.phase == Phase::Running
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn high_score(&self) -> &HighScore<S> {
        &self.high_score
    }

    pub fn character(&self) -> CharacterId {
        self.character
    }

    pub fn multiplier(&self) -> f64 {
        self.rules.multiplier(&self.run)
    }

    pub fn scroll_speed(&self) -> f64 {
        match self.spawner.policy() {
            SpawnPolicy::Dynamic => scoring::scroll_speed(self.tuning.base_dx, self.multiplier()),
            SpawnPolicy::FixedInterval { .. } => self.tuning.base_dx,
        }
    }

    /// The generic "tap": flap while running, start a run while idle.
    /// Ignored once a run is over. Returns whether anything happened.
    pub fn activate(&mut self, fx: &mut dyn Effects) -> bool {
        match self.run.phase {
            Phase::Idle => {
                self.start_run(fx);
                true
            }
            Phase::Running => {
                self.flap(fx);
                true
            }
            Phase::Over => false,
        }
    }

    /// Over → Running with a fresh state.
    pub fn restart(&mut self, fx: &mut dyn Effects) -> bool {
        if self.run.phase != Phase::Over {
            return false;
        }
        self.start_run(fx);
        true
    }

    /// Over → Idle.
    pub fn home(&mut self) -> bool {
        if self.run.phase != Phase::Over {
            return false;
        }
        self.reset();
        tracing::info!("back to title");
        true
    }

    /// Character choice is only open on the title screen.
    pub fn cycle_character(&mut self) -> bool {
        if self.run.phase != Phase::Idle {
            return false;
        }
        self.character = self.character.next();
        tracing::info!(character = %self.character, "character selected");
        true
    }

    pub fn tick(&mut self, viewport: Viewport, fx: &mut dyn Effects) -> TickOutcome {
        if self.run.phase != Phase::Running {
            return TickOutcome::Halted;
        }
        self.run.frame += 1;
        self.run.banner_ticks = self.run.banner_ticks.saturating_sub(1);

        let multiplier = self.multiplier();
        self.spawner.update(
            &mut self.run,
            multiplier,
            &mut self.field,
            viewport,
            &mut self.rng,
        );
        self.field.scroll(self.scroll_speed());

        if self.body.integrate(viewport.height).is_some() {
            self.end_run(Crash::Ground, fx);
            return TickOutcome::Ended(Crash::Ground);
        }

        if let Some(hit) = collision::check(&self.body, &self.field, self.tuning.hitbox_inset) {
            tracing::debug!(obstacle_x = hit.obstacle_x, y = self.body.y, "pipe hit");
            self.end_run(Crash::Pipe, fx);
            return TickOutcome::Ended(Crash::Pipe);
        }

        let scored = self.field.retire_passed().len() as u32;
        if let Some(up) = self.rules.award(&mut self.run, scored) {
            self.run.banner_ticks = self.tuning.level_banner_ticks;
            tracing::info!(level = up.level, score = self.run.score, "level up");
            fx.emit(Effect::LevelUp(up.level));
        }
        TickOutcome::Advanced { scored }
    }

    fn reset(&mut self) {
        self.body.reset();
        self.field.clear();
        self.run = RunState::default();
    }

    fn start_run(&mut self, fx: &mut dyn Effects) {
        self.reset();
        self.run.phase = Phase::Running;
        tracing::info!(character = %self.character, best = self.high_score.best(), "run started");
        self.flap(fx);
    }

    fn flap(&mut self, fx: &mut dyn Effects) {
        self.body.flap();
        fx.emit(Effect::Flap(self.character));
    }

    fn end_run(&mut self, crash: Crash, fx: &mut dyn Effects) {
        self.run.phase = Phase::Over;
        self.run.crash = Some(crash);
        fx.emit(Effect::Crash);
        self.run.new_best = self.high_score.submit(self.run.score);
        tracing::info!(
            score = self.run.score,
            best = self.high_score.best(),
            ?crash,
            frames = self.run.frame,
            "run over"
        );
    }
}
