pub mod calibration;
pub mod geometry;
