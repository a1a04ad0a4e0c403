//! Fresnel amplitude coefficients at a planar interface.

use crate::math::{Complex, Dir3, Float};

/// Complex s/p amplitude reflection and transmission coefficients.
#[derive(Copy, Clone, Debug)]
pub struct FresnelResult {
    pub rs: Complex,
    pub rp: Complex,
    pub ts: Complex,
    pub tp: Complex,
    /// Cosine of the transmitted angle; complex under total internal
    /// reflection or for absorbing media.
    pub cos_theta_t: Complex,
}

/// Evaluates the Fresnel amplitudes for an interface with relative IOR
/// `eta = η_incident / η_transmitted` and incident direction `wi` in the
/// local frame (interface normal along +z).
pub fn fresnel(eta: Complex, wi: &Dir3) -> FresnelResult {
    let cos_i = Complex::from_real(wi.z.abs());
    let sin2_i = Complex::from_real((1.0 - wi.z * wi.z).max(0.0));

    // Snell: sinθt = η sinθi
    let sin2_t = eta * eta * sin2_i;
    let cos_t = (Complex::ONE - sin2_t).sqrt();

    // amplitudes in terms of the IOR ratio r = η1/η2:
    //   rs = (r cosθi − cosθt) / (r cosθi + cosθt)
    //   rp = (cosθi − r cosθt) / (cosθi + r cosθt)
    let rci = eta * cos_i;
    let rct = eta * cos_t;
    let rs = (rci - cos_t) / (rci + cos_t);
    let rp = (cos_i - rct) / (cos_i + rct);
    let ts = rs + Complex::ONE;
    let tp = (rp + Complex::ONE) * eta;

    FresnelResult {
        rs,
        rp,
        ts,
        tp,
        cos_theta_t: cos_t,
    }
}

/// Unpolarised power reflectance, `(|rs|² + |rp|²)/2`.
pub fn fresnel_reflectance(eta: Complex, wi: &Dir3) -> Float {
    let f = fresnel(eta, wi);
    (f.rs.norm_sqr() + f.rp.norm_sqr()) / 2.0
}

/// Refracts `wi` about the +z interface normal with relative IOR
/// `eta = η_incident / η_transmitted`. Returns `None` under total internal
/// reflection. Directions follow the convention that `wi` points away from
/// the surface.
pub fn refract(wi: &Dir3, eta: Float) -> Option<Dir3> {
    let cos_i = wi.z;
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(Dir3::new(
        -eta * wi.x,
        -eta * wi.y,
        if cos_i >= 0.0 { -cos_t } else { cos_t },
    ))
}
