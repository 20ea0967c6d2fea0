//! Drift/diffusion SDEs for score-based generative modelling.
//!
//! An [`Sde`] walks a batch of points between a data distribution `p` and a prior
//! `q` with Euler-Maruyama steps, steered by a [`Policy`]:
//!
//! ```ignore
//! use scoresde::prelude::*;
//!
//! let config = SdeConfig::new(SdeType::Ve).interval(100);
//! let p = Gaussian::new(&[512, 2], 0.0, 0.1)?;
//! let q = Gaussian::new(&[512, 2], 0.0, 50.0)?;
//! let sde = build(&config, p, q)?;
//!
//! let ts: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
//! let traj = sde.sample_traj(&ts, &ZeroPolicy::new(Direction::Forward), SampleOptions::default())?;
//! assert_eq!(traj.xs.unwrap().shape(), &[512, 100, 2]);
//! ```

pub mod config;
pub mod error;
pub mod simulator;

pub use crate::config::{SdeConfig, SdeType, TrainMethod};
pub use crate::simulator::collaborators::{
    Corrector, FnPolicy, Gaussian, PointMass, Policy, Sampler, ZeroPolicy,
};
pub use crate::simulator::kernel::{
    compute_sigmas, compute_sigmas_two_ways, compute_ve2_diffusion, compute_ve_diffusion,
    compute_ve_g_scale, VeSchedule,
};
pub use crate::simulator::progress::{Progress, ProgressTracker};
pub use crate::simulator::sde::{build, SampleOptions, Sde, SdeKind, Step};
pub use crate::simulator::trajectory::{Trajectory, TrajectoryRecorder};
pub use crate::simulator::{assert_increasing, Direction, Tensor};
pub use error::SdeError;

pub mod prelude {
    pub use crate::config::{SdeConfig, SdeType, TrainMethod};
    pub use crate::error::SdeError;
    pub use crate::simulator::collaborators::{
        Corrector, FnPolicy, Gaussian, PointMass, Policy, Sampler, ZeroPolicy,
    };
    pub use crate::simulator::progress::{Progress, ProgressTracker};
    pub use crate::simulator::sde::{build, SampleOptions, Sde, SdeKind, Step};
    pub use crate::simulator::trajectory::Trajectory;
    pub use crate::simulator::{Direction, Tensor};
}
