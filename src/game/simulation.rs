use rand::Rng;
use rand::rngs::StdRng;

use super::obstacles::{Obstacle, ObstacleField};
use crate::config::{Config, PhysicsConfig};

/// Raw score ticks per displayed point (half a second at 60 Hz).
pub const SCORE_DIVISOR: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    pub y: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub bird: Bird,
    pub collided: bool,
    pub out_of_bounds: bool,
}

impl TickOutcome {
    /// The run is over.
    pub fn is_fatal(&self) -> bool {
        self.collided || self.out_of_bounds
    }
}

/// Bird physics, the obstacle field and the score. Knows nothing about
/// phases; the caller decides when to tick and what a fatal outcome means.
pub struct GameSimulation<R = StdRng> {
    bird: Bird,
    field: ObstacleField,
    score: u64,
    physics: PhysicsConfig,
    start_y: f64,
    height: f64,
    bird_x: f64,
    rng: R,
}

impl<R: Rng> GameSimulation<R> {
    pub fn new(config: &Config, rng: R) -> Self {
        let start_y = config.screen.height / 2.0;
        Self {
            bird: Bird {
                y: start_y,
                velocity: 0.0,
            },
            field: ObstacleField::new(config),
            score: 0,
            physics: config.physics.clone(),
            start_y,
            height: config.screen.height,
            bird_x: config.screen.bird_x,
            rng,
        }
    }

    pub fn reset(&mut self) {
        self.bird = Bird {
            y: self.start_y,
            velocity: 0.0,
        };
        self.field.reset();
        self.score = 0;
    }

    /// Advance one frame. `jump` overwrites the velocity after gravity has
    /// been applied, so holding it keeps the bird rising at a constant rate.
    pub fn tick(&mut self, jump: bool) -> TickOutcome {
        self.bird.velocity += self.physics.gravity;
        self.bird.y += self.bird.velocity;
        if jump {
            self.bird.velocity = self.physics.jump_strength;
        }

        self.field.advect();
        self.field.maybe_spawn(&mut self.rng);
        self.field.cull();

        let collided = self.field.collides(self.bird_x, self.bird.y);
        let out_of_bounds = self.bird.y < 0.0 || self.bird.y > self.height;

        // Counted even on the frame that ends the run.
        self.score += 1;

        TickOutcome {
            bird: self.bird,
            collided,
            out_of_bounds,
        }
    }

    pub fn bird(&self) -> Bird {
        self.bird
    }

    pub fn bird_x(&self) -> f64 {
        self.bird_x
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.field.obstacles()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn displayed_score(&self) -> u64 {
        self.score / SCORE_DIVISOR
    }

    #[cfg(test)]
    pub(crate) fn field_mut(&mut self) -> &mut ObstacleField {
        &mut self.field
    }
}
