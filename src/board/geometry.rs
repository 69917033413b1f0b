//! Dartboard geometry: classifies a calibrated point into a `Hit`.

use crate::board::calibration::{Calibration, Point};
use crate::engine::models::{Hit, BULL};

/// Segments clockwise from the top.
pub const SEGMENT_ORDER: [u8; 20] = [20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5];

pub const INNER_BULL_RADIUS_MM: f64 = 6.35;
pub const OUTER_BULL_RADIUS_MM: f64 = 15.9;
pub const TRIPLE_RING_INNER_MM: f64 = 99.0;
pub const TRIPLE_RING_OUTER_MM: f64 = 107.0;
pub const DOUBLE_RING_INNER_MM: f64 = 162.0;
pub const DOUBLE_RING_OUTER_MM: f64 = 170.0;

const SLICE_DEGREES: f64 = 18.0;

/// Classify a screen point. Total: anything off the board, or a non-finite
/// input, is a miss.
pub fn classify_hit(point: Point, calibration: &Calibration) -> Hit {
    classify_board_point(calibration.to_board(point))
}

/// Classify a point already in board millimetres (bullseye at origin, 20 up).
pub fn classify_board_point(board: Point) -> Hit {
    let r = board.x.hypot(board.y);
    if !r.is_finite() || r > DOUBLE_RING_OUTER_MM {
        return Hit::miss();
    }
    if r <= INNER_BULL_RADIUS_MM {
        return Hit { segment: BULL, multiplier: 2 };
    }
    if r <= OUTER_BULL_RADIUS_MM {
        return Hit { segment: BULL, multiplier: 1 };
    }

    let multiplier = if (TRIPLE_RING_INNER_MM..=TRIPLE_RING_OUTER_MM).contains(&r) {
        3
    } else if (DOUBLE_RING_INNER_MM..=DOUBLE_RING_OUTER_MM).contains(&r) {
        2
    } else {
        1
    };
    Hit {
        segment: segment_at_angle(clockwise_degrees(board)),
        multiplier,
    }
}

/// Angle clockwise from "up", in [0, 360).
fn clockwise_degrees(board: Point) -> f64 {
    board.x.atan2(-board.y).to_degrees().rem_euclid(360.0)
}

fn segment_at_angle(degrees: f64) -> u8 {
    let shifted = (degrees + SLICE_DEGREES / 2.0).rem_euclid(360.0);
    let slice = (shifted / SLICE_DEGREES).floor() as usize % SEGMENT_ORDER.len();
    SEGMENT_ORDER[slice]
}

/// Centre angle of a segment, clockwise from "up", in degrees.
pub fn segment_center_angle(segment: u8) -> Option<f64> {
    SEGMENT_ORDER
        .iter()
        .position(|&s| s == segment)
        .map(|i| i as f64 * SLICE_DEGREES)
}

/// Board point at `radius_mm` through the middle of `segment`, for overlays
/// and tests.
pub fn segment_point(segment: u8, radius_mm: f64) -> Option<Point> {
    let rad = segment_center_angle(segment)?.to_radians();
    Some(Point::new(radius_mm * rad.sin(), -radius_mm * rad.cos()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(segment: u8, multiplier: u8) -> Hit {
        Hit { segment, multiplier }
    }

    #[test]
    fn test_bulls() {
        assert_eq!(classify_board_point(Point::new(0.0, 0.0)), hit(25, 2));
        assert_eq!(classify_board_point(Point::new(6.35, 0.0)), hit(25, 2));
        assert_eq!(classify_board_point(Point::new(0.0, 10.0)), hit(25, 1));
        assert_eq!(classify_board_point(Point::new(15.9, 0.0)), hit(25, 1));
    }

    #[test]
    fn test_rings_on_twenty() {
        assert_eq!(classify_board_point(Point::new(0.0, -50.0)), hit(20, 1));
        assert_eq!(classify_board_point(Point::new(0.0, -103.0)), hit(20, 3));
        assert_eq!(classify_board_point(Point::new(0.0, -99.0)), hit(20, 3));
        assert_eq!(classify_board_point(Point::new(0.0, -166.0)), hit(20, 2));
        assert_eq!(classify_board_point(Point::new(0.0, -170.0)), hit(20, 2));
        assert_eq!(classify_board_point(Point::new(0.0, -170.5)), Hit::miss());
    }

    #[test]
    fn test_compass_points() {
        assert_eq!(classify_board_point(Point::new(60.0, 0.0)).segment, 6);
        assert_eq!(classify_board_point(Point::new(0.0, 60.0)).segment, 3);
        assert_eq!(classify_board_point(Point::new(-60.0, 0.0)).segment, 11);
    }

    #[test]
    fn test_every_segment_center() {
        for &segment in &SEGMENT_ORDER {
            let p = segment_point(segment, 130.0).unwrap();
            assert_eq!(classify_board_point(p), hit(segment, 1), "segment {segment}");
        }
    }

    #[test]
    fn test_slice_boundary() {
        // 20 spans [-9, 9) degrees; just past 9 degrees is 1.
        let inside = 8.9_f64.to_radians();
        let outside = 9.1_f64.to_radians();
        let at = |a: f64| Point::new(50.0 * a.sin(), -50.0 * a.cos());
        assert_eq!(classify_board_point(at(inside)).segment, 20);
        assert_eq!(classify_board_point(at(outside)).segment, 1);
        assert_eq!(classify_board_point(at(-inside)).segment, 20);
        assert_eq!(classify_board_point(at(-outside)).segment, 5);
    }

    #[test]
    fn test_non_finite_is_miss() {
        assert_eq!(classify_board_point(Point::new(f64::NAN, 0.0)), Hit::miss());
        assert_eq!(classify_board_point(Point::new(f64::INFINITY, 1.0)), Hit::miss());
    }

    #[test]
    fn test_classify_through_calibration() {
        let cal = Calibration {
            center_x: 200.0,
            center_y: 200.0,
            scale: 0.5,
            rotation: 0.0,
        };
        // 206 px up = 103 mm: triple 20.
        assert_eq!(classify_hit(Point::new(200.0, -6.0), &cal), hit(20, 3));
        let target = cal.to_screen(segment_point(17, 166.0).unwrap());
        assert_eq!(classify_hit(target, &cal), hit(17, 2));
    }
}
