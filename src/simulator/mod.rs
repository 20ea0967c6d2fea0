pub mod collaborators;
pub mod kernel;
pub mod progress;
pub mod sde;
pub mod trajectory;

use std::cmp::Ordering;
use std::str::FromStr;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::error::SdeError;

/// Batched state, control or noise values. Axis 0 is the batch axis.
pub type Tensor = ArrayD<f64>;

/// Direction of a walk between the data distribution `p` and the prior `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// From the data distribution towards the prior
    Forward,
    /// From the prior back towards the data distribution
    Backward,
}

impl Direction {
    /// `+1` going forward, `-1` going backward
    #[inline(always)]
    pub fn sign(&self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
        }
    }
}

impl FromStr for Direction {
    type Err = SdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            other => Err(SdeError::UnknownDirection(other.to_string())),
        }
    }
}

/// Fails unless every element of `ts` is strictly greater than the previous one.
pub fn assert_increasing(name: &'static str, ts: &[f64]) -> Result<(), SdeError> {
    for (index, pair) in ts.windows(2).enumerate() {
        // NaN compares as None and is rejected as well
        if pair[0].partial_cmp(&pair[1]) != Some(Ordering::Less) {
            return Err(SdeError::NonIncreasing {
                name,
                index,
                prev: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("forward".parse::<Direction>().unwrap(), Direction::Forward);
        assert_eq!("backward".parse::<Direction>().unwrap(), Direction::Backward);
        assert!(matches!(
            "Forward".parse::<Direction>(),
            Err(SdeError::UnknownDirection(_))
        ));
        assert!(matches!(
            "".parse::<Direction>(),
            Err(SdeError::UnknownDirection(_))
        ));
    }

    #[test]
    fn test_direction_sign_and_display() {
        assert_eq!(Direction::Forward.sign(), 1.0);
        assert_eq!(Direction::Backward.sign(), -1.0);
        assert_eq!(Direction::Backward.to_string(), "backward");
    }

    #[test]
    fn test_assert_increasing() {
        assert!(assert_increasing("ts", &[]).is_ok());
        assert!(assert_increasing("ts", &[0.3]).is_ok());
        assert!(assert_increasing("ts", &[0.0, 0.5, 1.0]).is_ok());

        match assert_increasing("ts", &[0.0, 0.5, 0.3]) {
            Err(SdeError::NonIncreasing {
                name,
                index,
                prev,
                next,
            }) => {
                assert_eq!(name, "ts");
                assert_eq!(index, 1);
                assert_eq!(prev, 0.5);
                assert_eq!(next, 0.3);
            }
            other => panic!("expected NonIncreasing, got {:?}", other),
        }

        // Repeated values are not strictly increasing
        assert!(assert_increasing("ts", &[0.0, 0.5, 0.5]).is_err());
        assert!(assert_increasing("ts", &[0.0, f64::NAN, 1.0]).is_err());
    }
}
