//! Shared angle helpers (degrees)

/// Normalize angle to (-180, 180]
#[inline]
pub fn normalize_angle_deg(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a <= -180.0 {
        a + 360.0
    } else if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Wrap angle to [0, 360)
#[inline]
pub fn wrap_angle_deg(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}
