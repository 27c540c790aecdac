use nalgebra as na;

pub type Point2 = na::Point2<f64>;
pub type Vector2 = na::Vector2<f64>;

pub const EPSILON: f64 = 1e-6;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Point2 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

impl ApproxEq for Vector2 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

pub mod intersection;
pub use intersection::*;

pub fn dist_sq(p1: &Point2, p2: &Point2) -> f64 {
    na::distance_squared(p1, p2)
}

/// Point at `length` from `center` along the direction `angle` (radians, CCW from +x).
pub fn polar_offset(center: &Point2, length: f64, angle: f64) -> Point2 {
    center + Vector2::new(angle.cos(), angle.sin()) * length
}
