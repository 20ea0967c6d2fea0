//! Analytic diffusion coefficients of the variance exploding SDEs.
//!
//! Song et al., *Score-Based Generative Modeling through Stochastic Differential
//! Equations* (arXiv:2011.13456), appendix C, eq. (30), (32) and (33):
//!
//! ```text
//! sigma(t) = s_min * (s_max / s_min)^t
//! g(t)     = sigma(t) * sqrt(2 * ln(s_max / s_min))
//! ```
//!
//! The "two ways" schedule folds time around `t = 0.5` so that the noise level
//! peaks in the middle of the horizon and returns to `s_min` at both ends. It is
//! used to interpolate between two non-trivial distributions.

use crate::error::SdeError;

/// Exponential interpolation from `s_min` at `t = 0` to `s_max` at `t = 1`.
#[inline(always)]
pub fn compute_sigmas(t: f64, s_min: f64, s_max: f64) -> f64 {
    s_min * (s_max / s_min).powf(t)
}

/// Symmetric interpolation: `s_min` at `t = 0` and `t = 1`, `s_max` at `t = 0.5`.
#[inline(always)]
pub fn compute_sigmas_two_ways(t: f64, s_min: f64, s_max: f64) -> f64 {
    s_min * (s_max / s_min).powf(1.0 - 2.0 * (t - 0.5).abs())
}

/// Fixed multiplier `sqrt(2 ln(s_max / s_min))`.
///
/// Fails unless `0 < s_min < s_max`, where the logarithm would otherwise be
/// negative or undefined.
pub fn compute_ve_g_scale(s_min: f64, s_max: f64) -> Result<f64, SdeError> {
    check_bounds(s_min, s_max)?;
    Ok((2.0 * (s_max / s_min).ln()).sqrt())
}

pub fn compute_ve_diffusion(t: f64, s_min: f64, s_max: f64) -> Result<f64, SdeError> {
    Ok(compute_sigmas(t, s_min, s_max) * compute_ve_g_scale(s_min, s_max)?)
}

pub fn compute_ve2_diffusion(t: f64, s_min: f64, s_max: f64) -> Result<f64, SdeError> {
    Ok(compute_sigmas_two_ways(t, s_min, s_max) * compute_ve_g_scale(s_min, s_max)?)
}

fn check_bounds(s_min: f64, s_max: f64) -> Result<(), SdeError> {
    // NaN fails every comparison, so it lands here too
    if !(s_min > 0.0 && s_max > s_min && s_max.is_finite()) {
        return Err(SdeError::InvalidBounds { s_min, s_max });
    }
    Ok(())
}

/// Validated `(s_min, s_max)` pair with its precomputed g-scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VeSchedule {
    s_min: f64,
    s_max: f64,
    g_scale: f64,
}

impl VeSchedule {
    pub fn new(s_min: f64, s_max: f64) -> Result<Self, SdeError> {
        let g_scale = compute_ve_g_scale(s_min, s_max)?;
        Ok(Self {
            s_min,
            s_max,
            g_scale,
        })
    }

    pub fn s_min(&self) -> f64 {
        self.s_min
    }

    pub fn s_max(&self) -> f64 {
        self.s_max
    }

    pub fn g_scale(&self) -> f64 {
        self.g_scale
    }

    pub fn sigma(&self, t: f64) -> f64 {
        compute_sigmas(t, self.s_min, self.s_max)
    }

    pub fn sigma_two_ways(&self, t: f64) -> f64 {
        compute_sigmas_two_ways(t, self.s_min, self.s_max)
    }

    /// Same value as [`compute_ve_diffusion`] without re-validating the bounds
    pub fn diffusion(&self, t: f64) -> f64 {
        self.sigma(t) * self.g_scale
    }

    /// Same value as [`compute_ve2_diffusion`] without re-validating the bounds
    pub fn diffusion_two_ways(&self, t: f64) -> f64 {
        self.sigma_two_ways(t) * self.g_scale
    }
}
