//! Zero-drift diffusion SDEs between a data distribution `p` and a prior `q`.
//!
//! ```text
//! dx = [f(x, t) + g(t) z(x, t)] dt + g(t) dw
//! ```
//!
//! Every variant has `f = 0`; they differ in the diffusion schedule `g(t)`.
//! The control `z` comes from a [`Policy`], which also fixes the direction of the
//! walk: forward walks start from `p`, backward walks start from `q` and visit
//! the time grid in reverse.

mod em;

pub use em::Step;

use ndarray::ArrayD;
use rand::{rng, Rng};

use crate::config::{SdeConfig, SdeType};
use crate::error::SdeError;
use crate::simulator::collaborators::{Corrector, Policy, Sampler};
use crate::simulator::kernel::VeSchedule;
use crate::simulator::progress::Progress;
use crate::simulator::trajectory::{Trajectory, TrajectoryRecorder};
use crate::simulator::{assert_increasing, Direction, Tensor};

use em::{check_shape, check_step, euler_maruyama_step, gaussian_increment};

/// The drift/diffusion pair of one SDE variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SdeKind {
    /// Constant diffusion `var`
    Simple { var: f64 },
    /// Diffusion `sigma(t) sqrt(2 ln(s_max / s_min))`, growing over the horizon
    VarianceExploding(VeSchedule),
    /// Like [`SdeKind::VarianceExploding`], with time folded around `t = 0.5`
    VarianceExplodingSymmetric(VeSchedule),
}

impl SdeKind {
    pub fn from_config(config: &SdeConfig) -> Result<Self, SdeError> {
        match config.sde_type {
            SdeType::Simple => Self::simple(config.var),
            SdeType::Ve => Ok(Self::VarianceExploding(VeSchedule::new(
                config.sigma_min,
                config.sigma_max,
            )?)),
            SdeType::Ve2 => Ok(Self::VarianceExplodingSymmetric(VeSchedule::new(
                config.sigma_min,
                config.sigma_max,
            )?)),
        }
    }

    pub fn simple(var: f64) -> Result<Self, SdeError> {
        if !var.is_finite() || var < 0.0 {
            return Err(SdeError::InvalidScale(var));
        }
        Ok(Self::Simple { var })
    }

    pub fn sde_type(&self) -> SdeType {
        match self {
            Self::Simple { .. } => SdeType::Simple,
            Self::VarianceExploding(_) => SdeType::Ve,
            Self::VarianceExplodingSymmetric(_) => SdeType::Ve2,
        }
    }

    /// Drift in the forward direction
    pub fn drift(&self, x: &Tensor, _t: f64) -> Tensor {
        match self {
            Self::Simple { .. }
            | Self::VarianceExploding(_)
            | Self::VarianceExplodingSymmetric(_) => ArrayD::zeros(x.raw_dim()),
        }
    }

    pub fn diffusion(&self, t: f64) -> f64 {
        match self {
            Self::Simple { var } => *var,
            Self::VarianceExploding(schedule) => schedule.diffusion(t),
            Self::VarianceExplodingSymmetric(schedule) => schedule.diffusion_two_ways(t),
        }
    }

    /// Noise scale of the schedule at `t`
    pub fn sigma(&self, t: f64) -> f64 {
        match self {
            Self::Simple { var } => *var,
            Self::VarianceExploding(schedule) => schedule.sigma(t),
            Self::VarianceExplodingSymmetric(schedule) => schedule.sigma_two_ways(t),
        }
    }
}

/// Options of [`Sde::sample_traj`].
pub struct SampleOptions<'a> {
    /// Accepted for interface compatibility, not applied
    pub corrector: Option<&'a dyn Corrector>,
    /// Accepted for interface compatibility, not applied
    pub apply_trick: bool,
    /// Record `xs` and `zs`
    pub save_traj: bool,
    pub progress: Option<&'a dyn Progress>,
}

impl Default for SampleOptions<'_> {
    fn default() -> Self {
        Self {
            corrector: None,
            apply_trick: true,
            save_traj: true,
            progress: None,
        }
    }
}

impl<'a> SampleOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn corrector(mut self, corrector: &'a dyn Corrector) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn apply_trick(mut self, apply_trick: bool) -> Self {
        self.apply_trick = apply_trick;
        self
    }

    pub fn save_traj(mut self, save_traj: bool) -> Self {
        self.save_traj = save_traj;
        self
    }

    pub fn progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// A configured SDE between the data distribution `p` and the prior `q`.
#[derive(Debug, Clone)]
pub struct Sde<P, Q> {
    config: SdeConfig,
    kind: SdeKind,
    dt: f64,
    p: P,
    q: Q,
}

/// Build the SDE named by `config.sde_type`.
pub fn build<P: Sampler, Q: Sampler>(
    config: &SdeConfig,
    p: P,
    q: Q,
) -> Result<Sde<P, Q>, SdeError> {
    Sde::new(config.clone(), p, q)
}

impl<P: Sampler, Q: Sampler> Sde<P, Q> {
    pub fn new(config: SdeConfig, p: P, q: Q) -> Result<Self, SdeError> {
        config.validate()?;
        let kind = SdeKind::from_config(&config)?;
        let dt = check_step(config.dt())?;
        Ok(Self {
            config,
            kind,
            dt,
            p,
            q,
        })
    }

    pub fn config(&self) -> &SdeConfig {
        &self.config
    }

    pub fn kind(&self) -> &SdeKind {
        &self.kind
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Data distribution
    pub fn p(&self) -> &P {
        &self.p
    }

    /// Prior distribution
    pub fn q(&self) -> &Q {
        &self.q
    }

    /// Drift, negated for backward walks.
    pub fn f(&self, x: &Tensor, t: f64, direction: Direction) -> Tensor {
        let mut drift = self.kind.drift(x, t);
        if direction == Direction::Backward {
            drift.mapv_inplace(|v| -v);
        }
        drift
    }

    /// Diffusion, independent of the direction.
    #[inline(always)]
    pub fn g(&self, t: f64) -> f64 {
        self.kind.diffusion(t)
    }

    /// Brownian increment shaped like `x` with variance `dt` (default: the configured step).
    pub fn dw<R: Rng + ?Sized>(
        &self,
        x: &Tensor,
        dt: Option<f64>,
        rng: &mut R,
    ) -> Result<Tensor, SdeError> {
        let dt = check_step(dt.unwrap_or(self.dt))?;
        Ok(gaussian_increment(x.raw_dim(), dt, rng))
    }

    /// One Euler-Maruyama step from `x` at time `t` with control `z`:
    ///
    /// ```text
    /// x_next = x + (f + g(t) z) dt + g(t) dw
    /// ```
    ///
    /// Missing pieces of `step` are filled in as documented on [`Step`]. The
    /// result is not clamped to any domain.
    pub fn propagate<R: Rng + ?Sized>(
        &self,
        t: f64,
        x: &Tensor,
        z: &Tensor,
        direction: Direction,
        step: Step<'_>,
        rng: &mut R,
    ) -> Result<Tensor, SdeError> {
        check_shape("control", x, z)?;
        let g = self.g(t);
        let dt = check_step(step.dt.unwrap_or(self.dt))?;

        let computed_drift;
        let f = match step.drift {
            Some(f) => {
                check_shape("drift", x, f)?;
                f
            }
            None => {
                computed_drift = self.f(x, t, direction);
                &computed_drift
            }
        };

        let drawn_dw;
        let dw = match step.dw {
            Some(dw) => {
                check_shape("noise increment", x, dw)?;
                dw
            }
            None => {
                drawn_dw = gaussian_increment(x.raw_dim(), dt, rng);
                &drawn_dw
            }
        };

        Ok(euler_maruyama_step(x, f, z, g, dw, dt))
    }

    /// Simulate one walk over `ts` using the thread-local random source.
    pub fn sample_traj<Pol: Policy>(
        &self,
        ts: &[f64],
        policy: &Pol,
        options: SampleOptions<'_>,
    ) -> Result<Trajectory, SdeError> {
        self.sample_traj_with_rng(ts, policy, options, &mut rng())
    }

    /// Simulate one walk over the strictly increasing grid `ts`.
    ///
    /// The initial batch is drawn from `p` for forward policies and from `q` for
    /// backward ones, in which case the grid is visited from its last point to its
    /// first. At every visited point the drift, the control and a fresh increment
    /// are computed, `(x, z)` is recorded under the point's index in `ts`, and `x`
    /// is propagated with the diffusion evaluated at the next visited point (the
    /// same point on the final step).
    pub fn sample_traj_with_rng<Pol: Policy, R: Rng + ?Sized>(
        &self,
        ts: &[f64],
        policy: &Pol,
        options: SampleOptions<'_>,
        rng: &mut R,
    ) -> Result<Trajectory, SdeError> {
        let direction = policy.direction();

        if ts.is_empty() {
            return Err(SdeError::EmptyTimeGrid("ts"));
        }
        assert_increasing("ts", ts)?;

        let mut x = match direction {
            Direction::Forward => self.p.sample(rng),
            Direction::Backward => self.q.sample(rng),
        };
        if x.ndim() == 0 {
            return Err(SdeError::ScalarSample);
        }

        let grid: Vec<f64> = match direction {
            Direction::Forward => ts.to_vec(),
            Direction::Backward => ts.iter().rev().copied().collect(),
        };

        let mut recorder = if options.save_traj {
            Some(TrajectoryRecorder::new(x.shape(), grid.len(), direction)?)
        } else {
            None
        };

        if options.corrector.is_some() {
            tracing::debug!("Corrector supplied but not applied by Euler-Maruyama sampling");
        }
        tracing::debug!(
            sde_type = %self.kind.sde_type(),
            %direction,
            steps = grid.len(),
            batch = x.shape()[0],
            "Propagating dynamics"
        );

        for (idx, &t) in grid.iter().enumerate() {
            let t_next = grid.get(idx + 1).copied().unwrap_or(t);

            let f = self.f(&x, t, direction);
            let z = policy.control(&x, t);
            check_shape("control", &x, &z)?;
            let dw = gaussian_increment(x.raw_dim(), self.dt, rng);

            if let Some(recorder) = recorder.as_mut() {
                recorder.record(idx, &x, &z)?;
            }

            x = self.propagate(
                t_next,
                &x,
                &z,
                direction,
                Step::new().drift(&f).dw(&dw),
                rng,
            )?;

            if let Some(progress) = options.progress {
                progress.inc();
            }
        }

        if let Some(progress) = options.progress {
            progress.finish();
        }
        tracing::debug!(%direction, "Trajectory complete");

        let (xs, zs) = match recorder {
            Some(recorder) => {
                let (xs, zs) = recorder.finish();
                (Some(xs), Some(zs))
            }
            None => (None, None),
        };

        Ok(Trajectory {
            xs,
            zs,
            x_term: x,
        })
    }
}
