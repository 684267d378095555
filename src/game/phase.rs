use std::time::{Duration, Instant};

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::simulation::{GameSimulation, TickOutcome};
use crate::assets::AssetSet;
use crate::config::{AssetConfig, ColorConfig, Config};
use crate::render::{LIGHT_GREY, RED, Rect, Surface, TextSize, WHITE};

pub const COUNTDOWN: Duration = Duration::from_secs(3);

const TITLE: &str = "FLAPPY PINCH";
const BIRD_SPRITE_SIZE: f64 = 50.0;
const BIRD_RADIUS: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Intro,
    Countdown,
    Playing,
    GameOver,
}

/// Keyboard input sampled for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Start (from the intro) or restart (after a crash) was pressed.
    pub start_pressed: bool,
}

/// What happened during one [`PhaseMachine::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepEvents {
    pub entered: Option<GamePhase>,
    /// The gesture closed this frame while playing.
    pub jumped_edge: bool,
    pub outcome: Option<TickOutcome>,
}

pub struct PhaseMachine<R = StdRng> {
    phase: GamePhase,
    phase_entered_at: Instant,
    last_step_at: Instant,
    was_closed: bool,
    sim: GameSimulation<R>,
    colors: ColorConfig,
    assets: AssetConfig,
}

impl<R: Rng> PhaseMachine<R> {
    pub fn new(config: &Config, rng: R, now: Instant) -> Self {
        Self {
            phase: GamePhase::Intro,
            phase_entered_at: now,
            last_step_at: now,
            was_closed: false,
            sim: GameSimulation::new(config, rng),
            colors: config.colors.clone(),
            assets: config.assets.clone(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn simulation(&self) -> &GameSimulation<R> {
        &self.sim
    }

    /// Whole seconds left on the countdown, `3` down to `1`.
    pub fn countdown_remaining(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.phase_entered_at);
        COUNTDOWN.as_secs().saturating_sub(elapsed.as_secs())
    }

    pub fn step(&mut self, input: FrameInput, gesture_closed: bool, now: Instant) -> StepEvents {
        let mut events = StepEvents::default();
        self.last_step_at = now;

        match self.phase {
            GamePhase::Intro => {
                if input.start_pressed {
                    self.enter(GamePhase::Countdown, now, &mut events);
                }
            }
            GamePhase::Countdown => {
                if now.saturating_duration_since(self.phase_entered_at) >= COUNTDOWN {
                    // Keep the countdown's entry time; the first frame plays.
                    self.enter(GamePhase::Playing, self.phase_entered_at, &mut events);
                    self.play(gesture_closed, now, &mut events);
                }
            }
            GamePhase::Playing => self.play(gesture_closed, now, &mut events),
            GamePhase::GameOver => {
                if input.start_pressed {
                    self.sim.reset();
                    let backdated = now.checked_sub(COUNTDOWN).unwrap_or(now);
                    self.enter(GamePhase::Playing, backdated, &mut events);
                }
            }
        }

        self.was_closed = gesture_closed;
        events
    }

    fn play(&mut self, gesture_closed: bool, now: Instant, events: &mut StepEvents) {
        events.jumped_edge = gesture_closed && !self.was_closed;
        let outcome = self.sim.tick(gesture_closed);
        events.outcome = Some(outcome);
        if outcome.is_fatal() {
            info!(
                score = self.sim.displayed_score(),
                collided = outcome.collided,
                out_of_bounds = outcome.out_of_bounds,
                "run over"
            );
            self.enter(GamePhase::GameOver, now, events);
        }
    }

    fn enter(&mut self, phase: GamePhase, entered_at: Instant, events: &mut StepEvents) {
        debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        self.phase_entered_at = entered_at;
        events.entered = Some(phase);
    }

    /// Draw the current phase. Does not present.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        assets: &AssetSet,
        gesture_closed: bool,
    ) {
        let (w, h) = surface.size();
        surface.clear(self.colors.background);
        if let Some(bg) = assets.background.sprite() {
            surface.blit(bg, Rect::new(0.0, 0.0, w, h));
        }

        match self.phase {
            GamePhase::Intro => {
                self.draw_logo(surface, assets, h / 3.0 - 80.0);
                surface.draw_text(TITLE, w / 2.0, h / 2.0, TextSize::Large, WHITE);
                let (cx, y) = (w / 2.0, h / 2.0 + 40.0);
                surface.draw_text("PRESS SPACE TO START", cx, y, TextSize::Small, WHITE);
                surface.draw_text("PINCH TO FLAP", cx, y + 20.0, TextSize::Small, LIGHT_GREY);
            }
            GamePhase::Countdown => {
                let n = self.countdown_remaining(self.last_step_at);
                let text = format!("STARTING IN {n}");
                surface.draw_text(&text, w / 2.0, h / 2.0, TextSize::Large, WHITE);
            }
            GamePhase::Playing => {
                self.draw_logo(surface, assets, 10.0);
                self.draw_pipes(surface, h);
                self.draw_bird(surface, assets);
                let score = self.sim.displayed_score().to_string();
                surface.draw_text(&score, w / 2.0, 20.0, TextSize::Large, WHITE);
                let hand = if gesture_closed {
                    "HAND: PINCH"
                } else {
                    "HAND: OPEN"
                };
                surface.draw_text_at(hand, 10.0, h - 30.0, TextSize::Small, LIGHT_GREY);
            }
            GamePhase::GameOver => {
                surface.draw_text("GAME OVER", w / 2.0, h / 3.0, TextSize::Large, RED);
                let score = format!("SCORE: {}", self.sim.displayed_score());
                surface.draw_text(&score, w / 2.0, h / 2.0, TextSize::Large, WHITE);
                let (cx, y) = (w / 2.0, h / 2.0 + 40.0);
                surface.draw_text("PRESS SPACE TO RESTART", cx, y, TextSize::Small, WHITE);
            }
        }
    }

    fn draw_logo<S: Surface + ?Sized>(&self, surface: &mut S, assets: &AssetSet, y: f64) {
        let Some(logo) = assets.logo.sprite() else {
            return;
        };
        let (w, _) = surface.size();
        let size = self.assets.logo_size;
        surface.blit(logo, Rect::new(w / 2.0 - size / 2.0, y, size, size));
    }

    fn draw_pipes<S: Surface + ?Sized>(&self, surface: &mut S, h: f64) {
        let field = self.sim.field();
        let (pw, gap) = (field.pipe_width(), field.gap());
        for pipe in field.obstacles() {
            let top = Rect::new(pipe.x, 0.0, pw, pipe.gap_top);
            surface.fill_rect(top, self.colors.pipe_top);
            let bottom = pipe.gap_top + gap;
            let bottom = Rect::new(pipe.x, bottom, pw, h - bottom);
            surface.fill_rect(bottom, self.colors.pipe_bottom);
        }
    }

    fn draw_bird<S: Surface + ?Sized>(&self, surface: &mut S, assets: &AssetSet) {
        let (x, y) = (self.sim.bird_x(), self.sim.bird().y);
        match assets.bird.sprite() {
            Some(sprite) => {
                let half = BIRD_SPRITE_SIZE / 2.0;
                let dest = Rect::new(x - half, y - half, BIRD_SPRITE_SIZE, BIRD_SPRITE_SIZE);
                surface.blit(sprite, dest);
            }
            None => surface.fill_circle(x, y, BIRD_RADIUS, self.colors.bird),
        }
    }
}
