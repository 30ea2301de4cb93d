// src/geometry.rs
use nalgebra::Vector2;

use crate::landmarks::Landmark;

/// Euclidean distance between two landmarks in the image (x, y) plane.
/// Depth is ignored; pinch detection works on the 2D projection.
pub fn distance(p1: &Landmark, p2: &Landmark) -> f64 {
    (planar(p1) - planar(p2)).norm()
}

fn planar(p: &Landmark) -> Vector2<f64> {
    Vector2::new(p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_3_4_5() {
        let a = Landmark::planar(0.0, 0.0);
        let b = Landmark::planar(0.3, 0.4);
        assert!((distance(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_distance_ignores_depth() {
        let a = Landmark::new(0.1, 0.1, -0.8);
        let b = Landmark::new(0.1, 0.1, 0.9);
        assert_eq!(distance(&a, &b), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Landmark::planar(0.12, 0.9);
        let b = Landmark::planar(0.7, 0.33);
        assert_eq!(distance(&a, &b), distance(&b, &a));
    }
}
