//! Table geometry: rectangular cushions and six pockets

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Ball;
use crate::consts::{POCKET_RADIUS, TABLE_HEIGHT, TABLE_WIDTH, WALL_RESTITUTION};

/// Nearest-pocket diagnostic from a capture test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PocketProbe {
    /// Index into `Table::pockets`
    pub nearest: usize,
    /// Distance from the ball center to that pocket center
    pub distance: f32,
    /// Whether any pocket captured the ball
    pub captured: bool,
}

/// Static playing-field geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    width: f32,
    height: f32,
    pocket_radius: f32,
    wall_restitution: f32,
    /// Corners and rail midpoints, clockwise from top-left
    pockets: [Vec2; 6],
}

impl Default for Table {
    fn default() -> Self {
        Self::new(TABLE_WIDTH, TABLE_HEIGHT)
    }
}

impl Table {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_tuning(width, height, POCKET_RADIUS, WALL_RESTITUTION)
    }

    pub fn with_tuning(width: f32, height: f32, pocket_radius: f32, wall_restitution: f32) -> Self {
        let pockets = [
            Vec2::new(0.0, 0.0),
            Vec2::new(width / 2.0, 0.0),
            Vec2::new(width, 0.0),
            Vec2::new(width, height),
            Vec2::new(width / 2.0, height),
            Vec2::new(0.0, height),
        ];
        Self {
            width,
            height,
            pocket_radius,
            wall_restitution,
            pockets,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn pockets(&self) -> &[Vec2; 6] {
        &self.pockets
    }

    /// Clamp a ball crossing a cushion back inside and reflect that axis.
    ///
    /// Axes are handled independently so a corner hit reflects both.
    pub fn handle_wall_collision(&self, ball: &mut Ball) {
        let r = ball.radius;
        let e = self.wall_restitution;

        if ball.pos.x - r < 0.0 {
            ball.pos.x = r;
            ball.vel.x = -ball.vel.x * e;
        } else if ball.pos.x + r > self.width {
            ball.pos.x = self.width - r;
            ball.vel.x = -ball.vel.x * e;
        }

        if ball.pos.y - r < 0.0 {
            ball.pos.y = r;
            ball.vel.y = -ball.vel.y * e;
        } else if ball.pos.y + r > self.height {
            ball.pos.y = self.height - r;
            ball.vel.y = -ball.vel.y * e;
        }
    }

    /// Test every pocket against the ball and report the nearest one.
    pub fn probe_pockets(&self, ball: &Ball) -> PocketProbe {
        let capture = self.pocket_radius + ball.radius;
        let mut probe = PocketProbe {
            nearest: 0,
            distance: f32::INFINITY,
            captured: false,
        };

        for (i, pocket) in self.pockets.iter().enumerate() {
            let distance = ball.pos.distance(*pocket);
            if distance < probe.distance {
                probe.nearest = i;
                probe.distance = distance;
            }
            if distance < capture {
                probe.captured = true;
            }
        }

        probe
    }

    /// True iff the ball center is inside the capture radius of any pocket
    #[inline]
    pub fn check_pocket(&self, ball: &Ball) -> bool {
        self.probe_pockets(ball).captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        let mut ball = Ball::new(1, Vec2::new(x, y));
        ball.vel = Vec2::new(vx, vy);
        ball
    }

    #[test]
    fn test_pockets_derived_from_size() {
        let table = Table::new(800.0, 400.0);
        let pockets = table.pockets();
        assert!(pockets.contains(&Vec2::new(0.0, 0.0)));
        assert!(pockets.contains(&Vec2::new(400.0, 0.0)));
        assert!(pockets.contains(&Vec2::new(800.0, 0.0)));
        assert!(pockets.contains(&Vec2::new(0.0, 400.0)));
        assert!(pockets.contains(&Vec2::new(400.0, 400.0)));
        assert!(pockets.contains(&Vec2::new(800.0, 400.0)));
    }

    #[test]
    fn test_wall_reflects_with_restitution() {
        let table = Table::default();
        let mut ball = ball_at(790.0, 200.0, 100.0, 0.0);
        table.handle_wall_collision(&mut ball);
        assert_eq!(ball.pos.x, 785.0);
        assert!((ball.vel.x + 80.0).abs() < 1e-4);
        assert_eq!(ball.vel.y, 0.0);
    }

    #[test]
    fn test_corner_reflects_both_axes() {
        let table = Table::default();
        let mut ball = ball_at(5.0, 395.0, -50.0, 40.0);
        table.handle_wall_collision(&mut ball);
        assert_eq!(ball.pos, Vec2::new(15.0, 385.0));
        assert!((ball.vel.x - 40.0).abs() < 1e-4);
        assert!((ball.vel.y + 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_ball_inside_bounds_untouched() {
        let table = Table::default();
        let mut ball = ball_at(400.0, 200.0, 10.0, -10.0);
        let before = ball.clone();
        table.handle_wall_collision(&mut ball);
        assert_eq!(ball, before);
    }

    #[test]
    fn test_capture_radius_is_pocket_plus_ball() {
        // 20 + 15 = 35 around the top-middle pocket at (400, 0)
        let table = Table::default();
        assert!(table.check_pocket(&ball_at(400.0, 34.9, 0.0, 0.0)));
        assert!(!table.check_pocket(&ball_at(400.0, 35.1, 0.0, 0.0)));
        assert!(table.check_pocket(&ball_at(15.0, 15.0, 0.0, 0.0)));
        assert!(!table.check_pocket(&ball_at(400.0, 200.0, 0.0, 0.0)));
    }

    #[test]
    fn test_probe_reports_nearest_pocket() {
        let table = Table::default();
        let probe = table.probe_pockets(&ball_at(790.0, 390.0, 0.0, 0.0));
        assert!(probe.captured);
        assert_eq!(table.pockets()[probe.nearest], Vec2::new(800.0, 400.0));
        assert!((probe.distance - 200f32.sqrt()).abs() < 1e-3);
    }
}
