use cgmath::Vector3;

/// Convert equatorial coordinates (degrees) to a unit vector
///
/// Declination is treated as latitude and right ascension as longitude.
/// Any right ascension is accepted (the trigonometry wraps it). A declination
/// outside [-90, 90] still evaluates; the result lands on the opposite side of
/// the sphere from where a caller might expect, which is accepted behaviour.
pub fn project(ra_deg: f64, dec_deg: f64) -> Vector3<f64> {
    let ra = ra_deg.to_radians();
    let dec = dec_deg.to_radians();
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    const TOL: f64 = 1e-9;

    fn assert_vec(v: Vector3<f64>, x: f64, y: f64, z: f64) {
        assert!(
            (v.x - x).abs() < TOL && (v.y - y).abs() < TOL && (v.z - z).abs() < TOL,
            "{v:?} != ({x}, {y}, {z})"
        );
    }

    #[test]
    fn test_cardinal_points() {
        assert_vec(project(0.0, 0.0), 1.0, 0.0, 0.0);
        assert_vec(project(90.0, 0.0), 0.0, 1.0, 0.0);
        assert_vec(project(0.0, 90.0), 0.0, 0.0, 1.0);
        assert_vec(project(180.0, 0.0), -1.0, 0.0, 0.0);
        assert_vec(project(0.0, -90.0), 0.0, 0.0, -1.0);
    }

    #[test]
    fn test_unit_norm_over_grid() {
        for ra in (0..360).step_by(7) {
            for dec in (-90..=90).step_by(5) {
                let v = project(ra as f64 + 0.25, dec as f64);
                assert!((v.magnitude() - 1.0).abs() < TOL, "ra={ra} dec={dec}");
            }
        }
    }

    #[test]
    fn test_ra_wraps() {
        let a = project(370.0, 12.0);
        let b = project(10.0, 12.0);
        assert_vec(a, b.x, b.y, b.z);

        let c = project(-90.0, 0.0);
        assert_vec(c, 0.0, -1.0, 0.0);
    }

    #[test]
    fn test_out_of_range_dec_still_evaluates() {
        // dec = 100 is the same point as ra + 180, dec = 80
        let v = project(0.0, 100.0);
        let w = project(180.0, 80.0);
        assert_vec(v, w.x, w.y, w.z);
        assert!((v.magnitude() - 1.0).abs() < TOL);
    }
}
