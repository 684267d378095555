use rand::Rng;

use crate::config::Config;

/// One top/bottom pipe pair. The open gap runs from `gap_top` down to
/// `gap_top + gap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub gap_top: f64,
}

impl Obstacle {
    pub const fn new(x: f64, gap_top: f64) -> Self {
        Self { x, gap_top }
    }

    /// Strictly inside the horizontal span `(x, x + width)`.
    pub fn covers(&self, x: f64, width: f64) -> bool {
        self.x < x && x < self.x + width
    }

    /// `y` is outside the gap.
    pub fn blocks(&self, y: f64, gap: f64) -> bool {
        y < self.gap_top || y > self.gap_top + gap
    }
}

/// The pipes currently on screen, ordered left to right. Pipes only ever
/// spawn at the right edge, so insertion order is spatial order.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    screen_width: f64,
    pipe_width: f64,
    gap: f64,
    speed: f64,
    spawn_distance: f64,
    gap_top_min: u32,
    gap_top_max: u32,
}

impl ObstacleField {
    pub fn new(config: &Config) -> Self {
        let mut field = Self {
            obstacles: Vec::new(),
            screen_width: config.screen.width,
            pipe_width: config.pipes.width,
            gap: config.pipes.gap,
            speed: config.pipes.speed,
            spawn_distance: config.pipes.spawn_distance,
            gap_top_min: config.pipes.gap_top_min,
            gap_top_max: config.pipes.gap_top_max,
        };
        field.reset();
        field
    }

    /// Back to the opening layout: one pipe just off the right edge.
    pub fn reset(&mut self) {
        let first = Obstacle::new(self.screen_width + 100.0, 200.0);
        self.obstacles.clear();
        self.obstacles.push(first);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn pipe_width(&self) -> f64 {
        self.pipe_width
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Scroll every pipe left by one tick's worth.
    pub fn advect(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= self.speed;
        }
    }

    /// Spawn at the right edge once the rightmost pipe has moved far enough
    /// in. At most one pipe per call.
    pub fn maybe_spawn<R: Rng>(&mut self, rng: &mut R) -> Option<Obstacle> {
        let due = match self.obstacles.last() {
            Some(last) => last.x < self.screen_width - self.spawn_distance,
            None => true,
        };
        if !due {
            return None;
        }
        let gap_top = rng.random_range(self.gap_top_min..=self.gap_top_max) as f64;
        let obstacle = Obstacle::new(self.screen_width, gap_top);
        self.obstacles.push(obstacle);
        Some(obstacle)
    }

    /// Drop every pipe that has scrolled fully off the left edge. Returns how
    /// many were removed.
    pub fn cull(&mut self) -> usize {
        let before = self.obstacles.len();
        let limit = -self.pipe_width;
        self.obstacles.retain(|o| o.x > limit);
        before - self.obstacles.len()
    }

    /// Does a bird at `(bird_x, bird_y)` hit any pipe?
    pub fn collides(&self, bird_x: f64, bird_y: f64) -> bool {
        self.obstacles
            .iter()
            .filter(|o| o.covers(bird_x, self.pipe_width))
            .any(|o| o.blocks(bird_y, self.gap))
    }

    #[cfg(test)]
    pub(crate) fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn field() -> ObstacleField {
        ObstacleField::new(&Config::default())
    }

    #[test]
    fn starts_with_one_pipe_off_screen() {
        assert_eq!(field().obstacles(), &[Obstacle::new(500.0, 200.0)]);
    }

    #[test]
    fn advect_moves_every_pipe_by_speed() {
        let mut f = field();
        let pipes = vec![Obstacle::new(10.0, 100.0), Obstacle::new(210.0, 300.0)];
        f.set_obstacles(pipes);
        f.advect();
        assert_eq!(
            f.obstacles(),
            &[Obstacle::new(8.5, 100.0), Obstacle::new(208.5, 300.0)]
        );
    }

    #[test]
    fn spawns_only_when_rightmost_is_far_enough_in() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut f = field();

        f.set_obstacles(vec![Obstacle::new(200.0, 150.0)]);
        assert!(
            f.maybe_spawn(&mut rng).is_none(),
            "exactly width-200 is not past it"
        );

        f.set_obstacles(vec![Obstacle::new(199.0, 150.0)]);
        let spawned = f.maybe_spawn(&mut rng).expect("should spawn");
        assert_eq!(spawned.x, 400.0);
        assert!((100.0..=400.0).contains(&spawned.gap_top));
        assert_eq!(spawned.gap_top.fract(), 0.0);

        // The new pipe is now rightmost, so a second call does nothing.
        assert!(f.maybe_spawn(&mut rng).is_none());
        assert_eq!(f.obstacles().len(), 2);
    }

    #[test]
    fn only_rightmost_pipe_is_checked() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut f = field();
        let pipes = vec![Obstacle::new(0.0, 150.0), Obstacle::new(300.0, 150.0)];
        f.set_obstacles(pipes);
        assert!(f.maybe_spawn(&mut rng).is_none());
    }

    #[test]
    fn empty_field_spawns() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut f = field();
        f.set_obstacles(Vec::new());
        assert!(f.maybe_spawn(&mut rng).is_some());
    }

    #[test]
    fn at_most_one_spawn_per_tick() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut f = field();
        for _ in 0..2_000 {
            let before = f.obstacles().len();
            f.advect();
            let spawned = f.maybe_spawn(&mut rng).is_some();
            assert!(f.obstacles().len() - before <= 1);
            assert_eq!(f.obstacles().len() - before, spawned as usize);
            f.cull();
            let xs: Vec<f64> = f.obstacles().iter().map(|o| o.x).collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]), "out of order");
        }
    }

    #[test]
    fn cull_removes_fully_offscreen_and_is_idempotent() {
        let mut f = field();
        f.set_obstacles(vec![
            Obstacle::new(-80.0, 100.0),
            Obstacle::new(-55.0, 100.0),
            Obstacle::new(-54.9, 100.0),
            Obstacle::new(120.0, 100.0),
        ]);
        assert_eq!(f.cull(), 2);
        assert!(f.obstacles().iter().all(|o| o.x > -55.0));
        assert_eq!(f.cull(), 0);
        assert_eq!(f.obstacles().len(), 2);
    }

    #[test]
    fn collision_iff_outside_gap_while_covering() {
        let mut f = field();
        for h in [100.0, 200.0, 250.0, 400.0] {
            f.set_obstacles(vec![Obstacle::new(20.0, h)]);
            for p in [0.0, h - 0.1, h, h + 90.0, h + 180.0, h + 180.1, 600.0] {
                let expected = p < h || p > h + 180.0;
                assert_eq!(f.collides(50.0, p), expected, "P={p} H={h}");
            }
        }
    }

    #[test]
    fn pipe_right_of_bird_never_collides() {
        let mut f = field();
        f.set_obstacles(vec![Obstacle::new(350.0, 200.0)]);
        for p in [0.0, 100.0, 300.0, 500.0, 600.0] {
            assert!(!f.collides(50.0, p));
        }
    }

    #[test]
    fn span_edges_are_exclusive() {
        let mut f = field();
        f.set_obstacles(vec![Obstacle::new(50.0, 200.0)]);
        assert!(!f.collides(50.0, 0.0));
        f.set_obstacles(vec![Obstacle::new(-5.0, 200.0)]);
        assert!(!f.collides(50.0, 0.0));
        f.set_obstacles(vec![Obstacle::new(-4.9, 200.0)]);
        assert!(f.collides(50.0, 0.0));
    }
}
