//! A single animated cell of the source frame.
//!
//! Each [`Tile`] owns one `TILE_WIDTH × TILE_HEIGHT` block of source pixels
//! and the physics state that moves it around the output surface. A tile is
//! in exactly one of three phases per tick, decided from its current state:
//!
//! - **Expanding** while `force > FORCE_EPSILON`: velocity is scaled by the
//!   force, added to the position, and the force decays by `FORCE_DECAY`.
//! - **Contracting** once the force is spent but the tile is still displaced
//!   or rotated: each axis closes `SETTLE_RATE` of the gap and snaps home once
//!   the step falls under `SNAP_THRESHOLD`.
//! - **Still** otherwise: the force is pinned to exactly zero.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Width of a tile in source pixels.
pub const TILE_WIDTH: usize = 32;
/// Height of a tile in source pixels.
pub const TILE_HEIGHT: usize = 24;
/// Force at or below which a tile stops expanding.
pub const FORCE_EPSILON: f64 = 0.0001;
/// Geometric decay applied to the force every expanding tick.
pub const FORCE_DECAY: f64 = 0.9;
/// Fraction of the remaining distance closed per contracting tick.
pub const SETTLE_RATE: f64 = 0.2;
/// Settle steps smaller than this snap straight to the rest value.
pub const SNAP_THRESHOLD: f64 = 0.5;

/// Which branch the next [`Tile::advance`] call takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Expanding,
    Contracting,
    Still,
}

/// Everything the renderer needs to paint a tile after it has advanced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderInstruction {
    /// Top-left of the tile's block in the sampling buffer.
    pub sample_origin: (usize, usize),
    /// Centre of the tile on the surface when at rest.
    pub rest_position: DVec2,
    /// Current centre of the tile on the surface.
    pub position: DVec2,
    /// Current rotation in degrees.
    pub rotation: f64,
    /// False only when the tile ran the still branch this tick.
    pub moving: bool,
}

/// One cell of the source region mapped onto the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    sample_origin: (usize, usize),
    rest_position: DVec2,
    position: DVec2,
    rotation: f64,
    force: f64,
    velocity: DVec2,
    angular_velocity: f64,
}

impl Tile {
    /// Creates a resting tile sampling the block at `sample_origin`.
    ///
    /// `offset` is added to the sample origin to get the rest position; the
    /// field passes the tile centre plus the grid-centering margin.
    pub fn new(sample_origin: (usize, usize), offset: DVec2) -> Self {
        let rest = offset + DVec2::new(sample_origin.0 as f64, sample_origin.1 as f64);
        Self {
            sample_origin,
            rest_position: rest,
            position: rest,
            rotation: 0.0,
            force: 0.0,
            velocity: DVec2::ZERO,
            angular_velocity: 0.0,
        }
    }

    pub fn sample_origin(&self) -> (usize, usize) {
        self.sample_origin
    }

    pub fn rest_position(&self) -> DVec2 {
        self.rest_position
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Rotation in degrees, in (-360, 360).
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// The phase the next [`advance`](Self::advance) will run.
    pub fn phase(&self) -> Phase {
        if self.force > FORCE_EPSILON {
            Phase::Expanding
        } else if self.rotation != 0.0 || self.position != self.rest_position {
            Phase::Contracting
        } else {
            Phase::Still
        }
    }

    /// Replaces the tile's impulse: force, travel direction, and spin.
    pub fn kick(&mut self, force: f64, velocity: DVec2, angular_velocity: f64) {
        self.force = force;
        self.velocity = velocity;
        self.angular_velocity = angular_velocity;
    }

    /// Moves the tile without touching its impulse.
    pub fn displace(&mut self, position: DVec2, rotation: f64) {
        self.position = position;
        self.rotation = rotation;
    }

    /// Runs one tick of physics. `bounds` is the surface size used for the
    /// bounce test.
    pub fn advance(&mut self, bounds: DVec2) -> RenderInstruction {
        let moving = match self.phase() {
            Phase::Expanding => {
                self.expand(bounds);
                true
            }
            Phase::Contracting => {
                self.contract();
                true
            }
            Phase::Still => {
                self.force = 0.0;
                false
            }
        };
        RenderInstruction {
            sample_origin: self.sample_origin,
            rest_position: self.rest_position,
            position: self.position,
            rotation: self.rotation,
            moving,
        }
    }

    fn expand(&mut self, bounds: DVec2) {
        // The force multiplies the running velocity, so it compounds while
        // above 1 and damps once it falls below.
        self.velocity *= self.force;
        self.angular_velocity *= self.force;
        self.position += self.velocity;
        self.rotation = (self.rotation + self.angular_velocity) % 360.0;
        self.force *= FORCE_DECAY;

        if self.position.x <= 0.0 || self.position.x >= bounds.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y <= 0.0 || self.position.y >= bounds.y {
            self.velocity.y = -self.velocity.y;
        }
    }

    fn contract(&mut self) {
        self.position.x = settle(self.position.x, self.rest_position.x);
        self.position.y = settle(self.position.y, self.rest_position.y);
        self.rotation = settle(self.rotation, 0.0);
    }
}

/// Closes `SETTLE_RATE` of the gap to `rest`, snapping when the step is small.
fn settle(current: f64, rest: f64) -> f64 {
    let step = (rest - current) * SETTLE_RATE;
    if step.abs() < SNAP_THRESHOLD {
        rest
    } else {
        current + step
    }
}

/// Upper bound on expanding ticks before `force` drops to `FORCE_EPSILON`.
pub fn expansion_ticks(initial_force: f64) -> u32 {
    if initial_force <= FORCE_EPSILON {
        return 0;
    }
    ((FORCE_EPSILON / initial_force).ln() / FORCE_DECAY.ln()).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: DVec2 = DVec2::new(1000.0, 600.0);

    fn tile_at(rest: DVec2) -> Tile {
        Tile::new((0, 0), rest)
    }

    #[test]
    fn new_tile_rests_at_offset_plus_origin() {
        let t = Tile::new((32, 24), DVec2::new(16.0, 12.0));
        assert_eq!(t.rest_position(), DVec2::new(48.0, 36.0));
        assert_eq!(t.position(), t.rest_position());
        assert_eq!(t.force(), 0.0);
        assert_eq!(t.rotation(), 0.0);
        assert_eq!(t.phase(), Phase::Still);
    }

    #[test]
    fn one_expanding_tick_scales_velocity_and_decays_force() {
        let mut t = tile_at(DVec2::new(100.0, 100.0));
        t.kick(3.0, DVec2::new(1.0, 0.0), 0.0);
        let ins = t.advance(SURFACE);
        assert!(ins.moving);
        assert!((t.position().x - 103.0).abs() < 1e-9);
        assert_eq!(t.position().y, 100.0);
        assert!((t.force() - 2.7).abs() < 1e-9);
        assert!((t.velocity().x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn expanding_rotation_keeps_sign_and_stays_below_full_turn() {
        let mut t = tile_at(DVec2::new(500.0, 300.0));
        t.kick(2.0, DVec2::ZERO, -0.4);
        t.displace(t.position(), -359.5);
        t.advance(SURFACE);
        assert!((t.rotation() - (-0.3)).abs() < 1e-9, "{}", t.rotation());
    }

    #[test]
    fn bounce_flips_velocity_past_left_edge() {
        let mut t = tile_at(DVec2::new(2.0, 300.0));
        t.kick(1.0, DVec2::new(-5.0, 0.0), 0.0);
        t.advance(SURFACE);
        assert!(t.position().x <= 0.0);
        assert!(t.velocity().x > 0.0);
    }

    #[test]
    fn bounce_flips_velocity_past_bottom_edge() {
        let mut t = tile_at(DVec2::new(500.0, 598.0));
        t.kick(1.0, DVec2::new(0.0, 5.0), 0.0);
        t.advance(SURFACE);
        assert!(t.velocity().y < 0.0);
    }

    #[test]
    fn bounce_flips_velocity_past_right_edge() {
        let mut t = tile_at(DVec2::new(998.0, 300.0));
        t.kick(1.0, DVec2::new(5.0, 0.0), 0.0);
        t.advance(SURFACE);
        assert!(t.position().x >= 1000.0);
        assert_eq!(t.velocity(), DVec2::new(-5.0, 0.0));
    }

    #[test]
    fn bounce_flips_velocity_past_top_edge() {
        let mut t = tile_at(DVec2::new(500.0, 2.0));
        t.kick(1.0, DVec2::new(0.0, -5.0), 0.0);
        t.advance(SURFACE);
        assert!(t.position().y <= 0.0);
        assert_eq!(t.velocity(), DVec2::new(0.0, 5.0));
    }

    #[test]
    fn landing_exactly_on_an_edge_bounces() {
        let mut right = tile_at(DVec2::new(995.0, 300.0));
        right.kick(1.0, DVec2::new(5.0, 0.0), 0.0);
        right.advance(SURFACE);
        assert_eq!(right.position().x, 1000.0);
        assert!(right.velocity().x < 0.0);

        let mut top = tile_at(DVec2::new(500.0, 5.0));
        top.kick(1.0, DVec2::new(0.0, -5.0), 0.0);
        top.advance(SURFACE);
        assert_eq!(top.position().y, 0.0);
        assert!(top.velocity().y > 0.0);
    }

    #[test]
    fn no_bounce_inside_bounds() {
        let mut t = tile_at(DVec2::new(500.0, 300.0));
        t.kick(1.0, DVec2::new(5.0, -5.0), 0.0);
        t.advance(SURFACE);
        assert_eq!(t.velocity(), DVec2::new(5.0, -5.0));
    }

    #[test]
    fn contracting_closes_a_fifth_of_the_gap() {
        let mut t = tile_at(DVec2::new(100.0, 100.0));
        t.displace(DVec2::new(150.0, 100.0), 0.0);
        assert_eq!(t.phase(), Phase::Contracting);
        let ins = t.advance(SURFACE);
        assert!(ins.moving);
        assert!((t.position().x - 140.0).abs() < 1e-9);
    }

    #[test]
    fn contracting_snaps_small_steps() {
        let mut t = tile_at(DVec2::new(100.0, 100.0));
        t.displace(DVec2::new(102.0, 99.0), 2.0);
        t.advance(SURFACE);
        assert_eq!(t.position(), t.rest_position());
        assert_eq!(t.rotation(), 0.0);
        assert_eq!(t.phase(), Phase::Still);
    }

    #[test]
    fn still_tile_reports_not_moving_and_zero_force() {
        let mut t = tile_at(DVec2::new(10.0, 10.0));
        t.kick(FORCE_EPSILON / 2.0, DVec2::X, 0.0);
        assert_eq!(t.phase(), Phase::Still);
        let ins = t.advance(SURFACE);
        assert!(!ins.moving);
        assert_eq!(t.force(), 0.0);
        assert_eq!(ins.position, t.rest_position());
    }

    #[test]
    fn render_instruction_carries_sample_origin() {
        let mut t = Tile::new((64, 48), DVec2::ZERO);
        let ins = t.advance(SURFACE);
        assert_eq!(ins.sample_origin, (64, 48));
        assert_eq!(ins.rest_position, DVec2::new(64.0, 48.0));
    }

    #[test]
    fn expansion_ticks_matches_closed_form() {
        assert_eq!(expansion_ticks(0.0), 0);
        // 3 * 0.9^n <= 1e-4  =>  n >= ln(1e-4 / 3) / ln(0.9) ~= 97.8
        assert_eq!(expansion_ticks(3.0), 98);
    }

    #[test]
    fn full_cycle_returns_home() {
        let mut t = tile_at(DVec2::new(500.0, 300.0));
        t.kick(3.0, DVec2::new(0.6, -0.8), 0.3);
        let mut ticks = 0;
        while t.phase() != Phase::Still {
            t.advance(SURFACE);
            ticks += 1;
            assert!(ticks < 10_000, "tile never settled");
        }
        assert_eq!(t.position(), t.rest_position());
        assert_eq!(t.rotation(), 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn force_falls_below_epsilon_within_bound(force in 0.001_f64..10.0) {
                let mut t = tile_at(DVec2::new(500.0, 300.0));
                t.kick(force, DVec2::ZERO, 0.0);
                let bound = expansion_ticks(force);
                for _ in 0..bound {
                    t.advance(SURFACE);
                }
                prop_assert!(t.force() <= FORCE_EPSILON, "force {} after {bound} ticks", t.force());
            }

            #[test]
            fn contraction_converges_without_overshoot(
                dx in -2000.0_f64..2000.0,
                dy in -2000.0_f64..2000.0,
                rot in -359.0_f64..359.0,
            ) {
                let rest = DVec2::new(500.0, 300.0);
                let mut t = tile_at(rest);
                t.displace(rest + DVec2::new(dx, dy), rot);
                let distance = dx.abs().max(dy.abs()).max(rot.abs()).max(1.0);
                let bound = ((distance / SNAP_THRESHOLD).ln() / (1.0 / (1.0 - SETTLE_RATE)).ln()).ceil() as usize + 2;
                let mut prev = t.position() - rest;
                for _ in 0..bound {
                    t.advance(SURFACE);
                    let gap = t.position() - rest;
                    prop_assert!(gap.x * prev.x >= 0.0 && gap.y * prev.y >= 0.0, "overshoot");
                    prev = gap;
                }
                prop_assert_eq!(t.position(), rest);
                prop_assert_eq!(t.rotation(), 0.0);
            }
        }
    }
}
