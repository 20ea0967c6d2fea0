use ndarray::{ArrayD, IxDyn, Zip};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::SdeError;
use crate::simulator::Tensor;

/// Pieces of one Euler-Maruyama step supplied by the caller.
///
/// Anything left `None` is computed by [`super::Sde::propagate`]:
/// - `dt`: the configured step size `T / interval`
/// - `drift`: `f(x, t, direction)`
/// - `dw`: a fresh Gaussian increment with variance `dt`, drawn after `dt` is resolved
#[derive(Debug, Default, Clone, Copy)]
pub struct Step<'a> {
    pub drift: Option<&'a Tensor>,
    pub dw: Option<&'a Tensor>,
    pub dt: Option<f64>,
}

impl<'a> Step<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drift(mut self, drift: &'a Tensor) -> Self {
        self.drift = Some(drift);
        self
    }

    pub fn dw(mut self, dw: &'a Tensor) -> Self {
        self.dw = Some(dw);
        self
    }

    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }
}

/// Standard normal noise shaped like `dim`, scaled by `sqrt(dt)`.
pub(crate) fn gaussian_increment<R: Rng + ?Sized>(dim: IxDyn, dt: f64, rng: &mut R) -> Tensor {
    let sqrt_dt = dt.sqrt();
    ArrayD::from_shape_simple_fn(dim, || {
        let sample: f64 = StandardNormal.sample(rng);
        sample * sqrt_dt
    })
}

/// `x + (f + g z) dt + g dw`
pub(crate) fn euler_maruyama_step(
    x: &Tensor,
    f: &Tensor,
    z: &Tensor,
    g: f64,
    dw: &Tensor,
    dt: f64,
) -> Tensor {
    let mut next = x.clone();
    Zip::from(&mut next)
        .and(f)
        .and(z)
        .and(dw)
        .for_each(|x, &f, &z, &dw| {
            *x += (f + g * z) * dt + g * dw;
        });
    next
}

pub(crate) fn check_step(dt: f64) -> Result<f64, SdeError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SdeError::InvalidStep(dt));
    }
    Ok(dt)
}

pub(crate) fn check_shape(what: &'static str, x: &Tensor, value: &Tensor) -> Result<(), SdeError> {
    if x.shape() != value.shape() {
        return Err(SdeError::ShapeMismatch {
            what,
            expected: x.shape().to_vec(),
            actual: value.shape().to_vec(),
        });
    }
    Ok(())
}
