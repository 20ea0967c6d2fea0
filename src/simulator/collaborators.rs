//! Interfaces to the components the SDE does not own: the two endpoint
//! distributions, the policy producing the control `z`, and the corrector.
//!
//! A few stock implementations are provided for simulation without a trained
//! network and for tests.

use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::SdeError;
use crate::simulator::{Direction, Tensor};

/// A distribution that can be sampled in batches of shape `[batch, *dims]`.
pub trait Sampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Tensor;
}

impl<S: Sampler + ?Sized> Sampler for &S {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Tensor {
        (**self).sample(rng)
    }
}

/// The drift estimator driving a walk.
///
/// The direction is a property of the policy: a forward policy is sampled from
/// `p`, a backward policy from `q`.
pub trait Policy {
    fn direction(&self) -> Direction;

    /// Control `z` at state `x` and time `t`, same shape as `x`
    fn control(&self, x: &Tensor, t: f64) -> Tensor;
}

impl<P: Policy + ?Sized> Policy for &P {
    fn direction(&self) -> Direction {
        (**self).direction()
    }

    fn control(&self, x: &Tensor, t: f64) -> Tensor {
        (**self).control(x, t)
    }
}

/// Predictor-corrector refinement of a sampled state.
///
/// Accepted by [`crate::simulator::sde::SampleOptions`] but not applied by the
/// Euler-Maruyama sampler.
pub trait Corrector {
    fn correct(&self, x: &Tensor, t: f64, direction: Direction) -> Tensor;
}

/// Isotropic Gaussian `N(mean, std^2)` over a fixed batch shape.
#[derive(Debug, Clone)]
pub struct Gaussian {
    shape: Vec<usize>,
    normal: Normal<f64>,
}

impl Gaussian {
    /// `shape` is the full batch shape, batch axis first.
    pub fn new(shape: &[usize], mean: f64, std: f64) -> Result<Self, SdeError> {
        if shape.is_empty() {
            return Err(SdeError::ScalarSample);
        }
        if !std.is_finite() || std < 0.0 {
            return Err(SdeError::InvalidDistribution(format!(
                "standard deviation must be finite and non-negative, got {}",
                std
            )));
        }
        let normal =
            Normal::new(mean, std).map_err(|e| SdeError::InvalidDistribution(e.to_string()))?;
        Ok(Self {
            shape: shape.to_vec(),
            normal,
        })
    }

    pub fn standard(shape: &[usize]) -> Result<Self, SdeError> {
        Self::new(shape, 0.0, 1.0)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

impl Sampler for Gaussian {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Tensor {
        ArrayD::from_shape_simple_fn(IxDyn(&self.shape), || self.normal.sample(rng))
    }
}

/// Always returns the same batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMass(Tensor);

impl PointMass {
    pub fn new(batch: Tensor) -> Self {
        Self(batch)
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self(ArrayD::zeros(IxDyn(shape)))
    }
}

impl Sampler for PointMass {
    fn sample<R: Rng + ?Sized>(&self, _rng: &mut R) -> Tensor {
        self.0.clone()
    }
}

/// Policy with `z = 0` everywhere, reducing the walk to the bare SDE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroPolicy {
    direction: Direction,
}

impl ZeroPolicy {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl Policy for ZeroPolicy {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn control(&self, x: &Tensor, _t: f64) -> Tensor {
        ArrayD::zeros(x.raw_dim())
    }
}

/// Policy backed by a closure `(x, t) -> z`.
pub struct FnPolicy<F> {
    direction: Direction,
    f: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(&Tensor, f64) -> Tensor,
{
    pub fn new(direction: Direction, f: F) -> Self {
        Self { direction, f }
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&Tensor, f64) -> Tensor,
{
    fn direction(&self) -> Direction {
        self.direction
    }

    fn control(&self, x: &Tensor, t: f64) -> Tensor {
        (self.f)(x, t)
    }
}
