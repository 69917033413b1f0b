//! Affine transform between input-device pixels and board millimetres.
//!
//! Screen space has y growing downwards. Board space keeps that orientation
//! with the bullseye at the origin, so "up" (towards 20) is negative y.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Bullseye position in pixels.
    pub center_x: f64,
    pub center_y: f64,
    /// Millimetres per pixel.
    pub scale: f64,
    /// Clockwise board rotation on screen, in radians.
    pub rotation: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            center_x: 0.0,
            center_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl Calibration {
    /// Screen pixels to board millimetres.
    pub fn to_board(&self, screen: Point) -> Point {
        let dx = screen.x - self.center_x;
        let dy = screen.y - self.center_y;
        let (sin, cos) = (-self.rotation).sin_cos();
        Point {
            x: (dx * cos - dy * sin) * self.scale,
            y: (dx * sin + dy * cos) * self.scale,
        }
    }

    /// Board millimetres to screen pixels; exact inverse of `to_board`.
    pub fn to_screen(&self, board: Point) -> Point {
        let x = board.x / self.scale;
        let y = board.y / self.scale;
        let (sin, cos) = self.rotation.sin_cos();
        Point {
            x: x * cos - y * sin + self.center_x,
            y: x * sin + y * cos + self.center_y,
        }
    }

    /// Calibrate from a touch on the bullseye and a touch on a known point
    /// straight above it (towards 20) at `reference_distance_mm`.
    pub fn from_two_touches(
        center_touch: Point,
        reference_touch: Point,
        reference_distance_mm: f64,
    ) -> Result<Self> {
        if !(reference_distance_mm.is_finite() && reference_distance_mm > 0.0) {
            return Err(EngineError::InvalidCalibration(format!(
                "reference distance must be positive, got {reference_distance_mm}"
            )));
        }
        let rx = reference_touch.x - center_touch.x;
        let ry = reference_touch.y - center_touch.y;
        let pixels = rx.hypot(ry);
        if !pixels.is_finite() || pixels < f64::EPSILON {
            return Err(EngineError::InvalidCalibration(
                "center and reference touches coincide".into(),
            ));
        }

        let calibration = Calibration {
            center_x: center_touch.x,
            center_y: center_touch.y,
            scale: reference_distance_mm / pixels,
            rotation: rx.atan2(-ry),
        };
        tracing::debug!(
            scale = calibration.scale,
            rotation = calibration.rotation,
            "calibrated from two touches"
        );
        Ok(calibration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_identity_calibration() {
        let cal = Calibration::default();
        let p = Point::new(12.5, -3.0);
        assert!(close(cal.to_board(p), p));
    }

    #[test]
    fn test_round_trip_is_exact_inverse() {
        let cal = Calibration {
            center_x: 412.0,
            center_y: 300.5,
            scale: 0.42,
            rotation: 0.3,
        };
        for p in [Point::new(0.0, 0.0), Point::new(500.0, 120.0), Point::new(-30.0, 900.0)] {
            assert!(close(cal.to_screen(cal.to_board(p)), p));
        }
    }

    #[test]
    fn test_two_touches_upright() {
        let cal = Calibration::from_two_touches(Point::new(100.0, 100.0), Point::new(100.0, 50.0), 170.0).unwrap();
        assert!((cal.scale - 3.4).abs() < 1e-12);
        assert!(cal.rotation.abs() < 1e-12);
        let top = cal.to_board(Point::new(100.0, 50.0));
        assert!(close(top, Point::new(0.0, -170.0)));
    }

    #[test]
    fn test_two_touches_rotated_board() {
        // Board turned a quarter clockwise: 20 now points right.
        let cal = Calibration::from_two_touches(Point::new(0.0, 0.0), Point::new(50.0, 0.0), 100.0).unwrap();
        assert!((cal.rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let up = cal.to_board(Point::new(50.0, 0.0));
        assert!(close(up, Point::new(0.0, -100.0)));
    }

    #[test]
    fn test_two_touches_rejects_degenerate_input() {
        let c = Point::new(10.0, 10.0);
        assert!(matches!(
            Calibration::from_two_touches(c, c, 170.0),
            Err(EngineError::InvalidCalibration(_))
        ));
        assert!(Calibration::from_two_touches(c, Point::new(10.0, 0.0), 0.0).is_err());
    }
}
