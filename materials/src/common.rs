//! Common shading helpers. Directions are in the local shading frame whose
//! z-axis is the shading normal.

use wavefront_core::geometry::*;

/// Returns cos(θ) of a local direction.
#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns |cos(θ)| of a local direction.
#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    w.z.abs()
}

/// Returns `true` if two local vectors are in the same hemisphere.
///
/// * `w`  - First vector.
/// * `wp` - Second vector.
#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

/// Reflects a local direction about the shading normal.
///
/// * `wo` - Vector to reflect.
#[inline]
pub fn reflect_local(wo: &Vector3f) -> Vector3f {
    Vector3f::new(-wo.x, -wo.y, wo.z)
}

/// Computes the refracted direction, given incident direction `wi`, surface normal
/// `n` in the same hemisphere as `wi` and `eta`. If there is total internal
/// reflection, `None` is returned.
///
/// * `wi`  - Incident direction.
/// * `n`   - Surface normal.
/// * `eta` - Ratio of indices of refraction in the incident and transmitted media.
pub fn refract(wi: &Vector3f, n: &Normal3f, eta: Float) -> Option<Vector3f> {
    // Compute cos(theta_t) using Snell's law
    let cos_theta_i = n.dot(wi);
    let sin_2_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i);
    let sin_2_theta_t = eta * eta * sin_2_theta_i;

    // Handle total internal reflection for transmission.
    if sin_2_theta_t >= 1.0 {
        None
    } else {
        let cos_theta_t = (1.0 - sin_2_theta_t).sqrt();
        Some(-(*wi) * eta + *n * (eta * cos_theta_i - cos_theta_t))
    }
}

/// Returns the Fresnel reflection at the boundary between two dielectric
/// media for unpolarized light.
///
/// * `cos_theta_i` - cos(θi) of the incident direction; negative when it
///                   arrives from the inside.
/// * `eta_i`       - Index of refraction on the outside.
/// * `eta_t`       - Index of refraction on the inside.
pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let (mut eta_i, mut eta_t) = (eta_i, eta_t);

    // Potentially swap indices of refraction.
    if cos_theta_i <= 0.0 {
        std::mem::swap(&mut eta_i, &mut eta_t);
        cos_theta_i = cos_theta_i.abs();
    }

    // Compute cos_theta_t using Snell's law.
    let sin_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i).sqrt();
    let sin_theta_t = eta_i / eta_t * sin_theta_i;

    // Handle total internal reflection.
    if sin_theta_t >= 1.0 {
        1.0
    } else {
        let cos_theta_t = max(0.0, 1.0 - sin_theta_t * sin_theta_t).sqrt();
        let r_parl = ((eta_t * cos_theta_i) - (eta_i * cos_theta_t))
            / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
        let r_perp = ((eta_i * cos_theta_i) - (eta_t * cos_theta_t))
            / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));
        (r_parl * r_parl + r_perp * r_perp) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn normal_incidence_reflectance() {
        // ((1 - 1.5) / (1 + 1.5))^2
        assert!(approx_eq!(f32, fr_dielectric(1.0, 1.0, 1.5), 0.04, epsilon = 1e-5));
        assert!(approx_eq!(f32, fr_dielectric(-1.0, 1.0, 1.5), 0.04, epsilon = 1e-5));
    }

    #[test]
    fn total_internal_reflection() {
        // Grazing angle from inside the denser medium.
        assert_eq!(fr_dielectric(-0.1, 1.0, 1.5), 1.0);
        let wi = Vector3f::new(0.99, 0.0, 0.1).normalize();
        assert!(refract(&wi, &Normal3f::new(0.0, 0.0, 1.0), 1.5).is_none());
    }

    proptest! {
        #[test]
        fn refraction_obeys_snell(x in -0.9..0.9f32, eta in 0.5..2.0f32) {
            let z = (1.0 - x * x).sqrt();
            let wi = Vector3f::new(x, 0.0, z);
            let n = Normal3f::new(0.0, 0.0, 1.0);
            if let Some(wt) = refract(&wi, &n, eta) {
                let sin_i = x.abs();
                let sin_t = (1.0 - wt.z * wt.z).max(0.0).sqrt();
                prop_assert!((sin_t - eta * sin_i).abs() < 1e-3);
                prop_assert!(wt.z < 0.0);
            }
        }

        #[test]
        fn fresnel_is_a_probability(c in -1.0..1.0f32, eta in 1.0..2.5f32) {
            let f = fr_dielectric(c, 1.0, eta);
            prop_assert!((0.0..=1.0).contains(&f));
        }
    }
}
