use ndarray::{ArrayD, Axis, IxDyn};

use crate::error::SdeError;
use crate::simulator::{Direction, Tensor};

/// Result of [`crate::simulator::sde::Sde::sample_traj`].
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// States, `[batch, len(ts), *dims]`, indexed in time order. `None` unless recorded.
    pub xs: Option<Tensor>,
    /// Controls, same layout as `xs`
    pub zs: Option<Tensor>,
    /// State after the last step
    pub x_term: Tensor,
}

/// Buffers for the states and controls of one walk.
///
/// Index `i` along axis 1 always holds the values at `ts[i]` of the increasing
/// grid, whichever way the grid is traversed.
#[derive(Debug)]
pub struct TrajectoryRecorder {
    direction: Direction,
    len: usize,
    xs: Tensor,
    zs: Tensor,
}

impl TrajectoryRecorder {
    /// Allocate buffers for `len` time points of batches shaped like `x_shape`.
    pub fn new(x_shape: &[usize], len: usize, direction: Direction) -> Result<Self, SdeError> {
        let (&batch, dims) = x_shape.split_first().ok_or(SdeError::ScalarSample)?;
        let mut shape = Vec::with_capacity(x_shape.len() + 1);
        shape.push(batch);
        shape.push(len);
        shape.extend_from_slice(dims);

        Ok(Self {
            direction,
            len,
            xs: ArrayD::zeros(IxDyn(&shape)),
            zs: ArrayD::zeros(IxDyn(&shape)),
        })
    }

    /// Buffer index of the `step`-th visited time point, `None` past the end of the grid.
    #[inline(always)]
    pub fn time_index(direction: Direction, step: usize, len: usize) -> Option<usize> {
        if step >= len {
            return None;
        }
        match direction {
            Direction::Forward => Some(step),
            Direction::Backward => Some(len - step - 1),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `x` and `z` of the `step`-th visited time point.
    pub fn record(&mut self, step: usize, x: &Tensor, z: &Tensor) -> Result<(), SdeError> {
        let t_idx = Self::time_index(self.direction, step, self.len).ok_or_else(|| {
            SdeError::ShapeMismatch {
                what: "trajectory step",
                expected: vec![self.len],
                actual: vec![step],
            }
        })?;
        write_slice(&mut self.xs, t_idx, x, "recorded state")?;
        write_slice(&mut self.zs, t_idx, z, "recorded control")?;
        Ok(())
    }

    pub fn finish(self) -> (Tensor, Tensor) {
        (self.xs, self.zs)
    }
}

fn write_slice(
    buffer: &mut Tensor,
    t_idx: usize,
    value: &Tensor,
    what: &'static str,
) -> Result<(), SdeError> {
    let mut slot = buffer.index_axis_mut(Axis(1), t_idx);
    if slot.shape() != value.shape() {
        return Err(SdeError::ShapeMismatch {
            what,
            expected: slot.shape().to_vec(),
            actual: value.shape().to_vec(),
        });
    }
    slot.assign(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s};

    #[test]
    fn test_buffer_shape_inserts_time_axis() {
        let recorder = TrajectoryRecorder::new(&[8, 3, 2], 5, Direction::Forward).unwrap();
        assert_eq!(recorder.len(), 5);
        let (xs, zs) = recorder.finish();
        assert_eq!(xs.shape(), &[8, 5, 3, 2]);
        assert_eq!(zs.shape(), &[8, 5, 3, 2]);

        let flat = TrajectoryRecorder::new(&[4], 2, Direction::Forward).unwrap();
        assert_eq!(flat.finish().0.shape(), &[4, 2]);
    }

    #[test]
    fn test_scalar_shape_is_rejected() {
        assert!(matches!(
            TrajectoryRecorder::new(&[], 3, Direction::Forward),
            Err(SdeError::ScalarSample)
        ));
    }

    #[test]
    fn test_time_index_mirrors_backward() {
        assert_eq!(TrajectoryRecorder::time_index(Direction::Forward, 0, 4), Some(0));
        assert_eq!(TrajectoryRecorder::time_index(Direction::Forward, 3, 4), Some(3));
        assert_eq!(TrajectoryRecorder::time_index(Direction::Backward, 0, 4), Some(3));
        assert_eq!(TrajectoryRecorder::time_index(Direction::Backward, 3, 4), Some(0));
    }

    #[test]
    fn test_time_index_past_the_grid_is_none() {
        for direction in [Direction::Forward, Direction::Backward] {
            assert_eq!(TrajectoryRecorder::time_index(direction, 4, 4), None);
            assert_eq!(TrajectoryRecorder::time_index(direction, 9, 4), None);
            assert_eq!(TrajectoryRecorder::time_index(direction, 0, 0), None);
        }
    }

    #[test]
    fn test_backward_record_lands_in_time_order() {
        let mut recorder = TrajectoryRecorder::new(&[2, 1], 3, Direction::Backward).unwrap();
        for step in 0..3 {
            let x = ArrayD::from_elem(IxDyn(&[2, 1]), step as f64);
            let z = ArrayD::from_elem(IxDyn(&[2, 1]), -(step as f64));
            recorder.record(step, &x, &z).unwrap();
        }
        let (xs, zs) = recorder.finish();
        // The first visited step is the latest time point
        assert_eq!(
            xs.slice(s![0, .., 0]).to_owned(),
            array![2.0, 1.0, 0.0]
        );
        assert_eq!(
            zs.slice(s![1, .., 0]).to_owned(),
            array![-2.0, -1.0, 0.0]
        );
    }

    #[test]
    fn test_record_checks_shapes_and_bounds() {
        let mut recorder = TrajectoryRecorder::new(&[2, 2], 2, Direction::Forward).unwrap();
        let good = ArrayD::zeros(IxDyn(&[2, 2]));
        let bad = ArrayD::zeros(IxDyn(&[2, 3]));
        assert!(matches!(
            recorder.record(0, &bad, &good),
            Err(SdeError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            recorder.record(0, &good, &bad),
            Err(SdeError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            recorder.record(2, &good, &good),
            Err(SdeError::ShapeMismatch { .. })
        ));
        assert!(recorder.record(1, &good, &good).is_ok());
    }
}
