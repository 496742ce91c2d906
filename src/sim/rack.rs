//! Standard opening layout
//!
//! Cue ball on the break spot; fifteen object balls in a five-row triangle
//! whose apex faces the cue ball. Ids run row by row starting at 1.

use glam::Vec2;

use super::state::{BallState, CUE_BALL_ID};
use crate::consts::{BALL_RADIUS, CUE_BREAK_POSITION, RACK_APEX, RACK_GAP};

/// Number of rows in the triangle
pub const RACK_ROWS: u32 = 5;

/// Object-ball positions, apex first, `radius` sized with `gap` between balls
pub fn rack_positions(apex: Vec2, radius: f32, gap: f32) -> Vec<Vec2> {
    let spacing = radius * 2.0 + gap;
    // sqrt(3)/2 for an equilateral triangle
    let row_offset = spacing * 3f32.sqrt() / 2.0;

    let mut positions = Vec::with_capacity(15);
    for row in 0..RACK_ROWS {
        for col in 0..=row {
            let x = apex.x + row as f32 * row_offset;
            let y = apex.y + (col as f32 - row as f32 / 2.0) * spacing;
            positions.push(Vec2::new(x, y));
        }
    }
    positions
}

/// Full opening set: cue ball plus a racked triangle
pub fn rack_balls(cue: Vec2, apex: Vec2, radius: f32, gap: f32) -> Vec<BallState> {
    std::iter::once(BallState::new(CUE_BALL_ID, cue))
        .chain(
            rack_positions(apex, radius, gap)
                .into_iter()
                .zip(1..)
                .map(|(pos, id)| BallState::new(id, pos)),
        )
        .collect()
}

/// The canonical opening with default dimensions
pub fn standard_rack() -> Vec<BallState> {
    rack_balls(CUE_BREAK_POSITION, RACK_APEX, BALL_RADIUS, RACK_GAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rack_ids_and_cue() {
        let rack = standard_rack();
        assert_eq!(rack.len(), 16);
        let ids: Vec<u32> = rack.iter().map(|b| b.id).collect();
        assert_eq!(ids, (0..16).collect::<Vec<u32>>());
        assert_eq!(rack[0].position, Vec2::new(200.0, 200.0));
        assert_eq!(rack[1].position, RACK_APEX);
        assert!(rack.iter().all(|b| !b.is_pocketed));
    }

    #[test]
    fn test_rows_are_row_major() {
        let rack = standard_rack();
        // Ball 2 and 3 form the second row, 11..=15 the last
        assert_eq!(rack[2].position.x, rack[3].position.x);
        assert!(rack[2].position.y < rack[3].position.y);
        assert!(rack[11..].iter().all(|b| (b.position.x - rack[11].position.x).abs() < 1e-4));
        assert!(rack[10].position.x < rack[11].position.x);
    }

    #[test]
    fn test_racked_balls_do_not_overlap() {
        let rack = standard_rack();
        for (i, a) in rack.iter().enumerate() {
            for b in &rack[i + 1..] {
                let d = a.position.distance(b.position);
                assert!(d >= 2.0 * BALL_RADIUS + RACK_GAP - 1e-3, "{} / {}: {}", a.id, b.id, d);
            }
        }
    }

    #[test]
    fn test_rack_fits_on_table() {
        use crate::consts::{TABLE_HEIGHT, TABLE_WIDTH};
        for ball in standard_rack() {
            assert!(ball.position.x - BALL_RADIUS > 0.0 && ball.position.x + BALL_RADIUS < TABLE_WIDTH);
            assert!(ball.position.y - BALL_RADIUS > 0.0 && ball.position.y + BALL_RADIUS < TABLE_HEIGHT);
        }
    }
}
