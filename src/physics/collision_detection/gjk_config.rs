//! Tolerances and iteration limits for the GJK queries.

use crate::error::{GjkError, GjkResult};

/// Smallest meaningful length; squared lengths below `EPSILON * EPSILON` are treated as zero.
pub const EPSILON: f32 = 1.192_092_9e-12;

/// Magnitude below which a tetrahedron face's reference dot product marks the tetrahedron as flat.
pub const DEGENERATE_THRESHOLD: f32 = 1e-4;

/// Hard cap on refinement iterations per query.
pub const MAX_ITERATIONS: usize = 15;

/// Convergence threshold on the squared closest distance for closest point queries.
pub const CLOSEST_POINTS_EPSILON: f32 = 1e-5;

/// Convergence threshold on the squared closest distance for point containment queries.
pub const POINTCAST_EPSILON: f32 = 1e-4;

/// Convergence threshold on the squared closest distance for ray casts.
pub const RAYCAST_EPSILON: f32 = 1e-6;

/// Tunable tolerances for [`GjkQuery`](super::gjk::GjkQuery).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GjkConfig {
    /// Maximum refinement iterations per query. Default: 15
    pub max_iterations: usize,

    /// Squared distance at which closest point queries stop refining. Default: 1e-5
    pub closest_points_epsilon: f32,

    /// Squared distance at which point containment queries report the point inside. Default: 1e-4
    pub pointcast_epsilon: f32,

    /// Squared distance at which ray casts accept the current hit. Default: 1e-6
    pub raycast_epsilon: f32,

    /// Base tolerance for the separating-axis exits and normal normalization. Default: ~1.19e-12
    ///
    /// Ray casts compare against `-epsilon` while point containment compares against
    /// `-epsilon²`.
    pub epsilon: f32,
}

impl Default for GjkConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            closest_points_epsilon: CLOSEST_POINTS_EPSILON,
            pointcast_epsilon: POINTCAST_EPSILON,
            raycast_epsilon: RAYCAST_EPSILON,
            epsilon: EPSILON,
        }
    }
}

impl GjkConfig {
    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the closest point convergence threshold.
    #[must_use]
    pub fn with_closest_points_epsilon(mut self, epsilon: f32) -> Self {
        self.closest_points_epsilon = epsilon;
        self
    }

    /// Sets the point containment convergence threshold.
    #[must_use]
    pub fn with_pointcast_epsilon(mut self, epsilon: f32) -> Self {
        self.pointcast_epsilon = epsilon;
        self
    }

    /// Sets the ray cast convergence threshold.
    #[must_use]
    pub fn with_raycast_epsilon(mut self, epsilon: f32) -> Self {
        self.raycast_epsilon = epsilon;
        self
    }

    /// Sets the base tolerance used by the separating-axis exits and normal normalization.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Checks that every tolerance is positive and finite and the iteration cap is nonzero.
    pub fn validate(&self) -> GjkResult<()> {
        if self.max_iterations == 0 {
            return Err(GjkError::InvalidConfig {
                field: "max_iterations",
                value: 0.0,
            });
        }
        let tolerances = [
            ("closest_points_epsilon", self.closest_points_epsilon),
            ("pointcast_epsilon", self.pointcast_epsilon),
            ("raycast_epsilon", self.raycast_epsilon),
            ("epsilon", self.epsilon),
        ];
        for (field, value) in tolerances {
            if !(value.is_finite() && value > 0.0) {
                return Err(GjkError::InvalidConfig {
                    field,
                    value: f64::from(value),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GjkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations, 15);
    }

    #[test]
    fn rejects_bad_values() {
        let zero_iterations = GjkConfig::default().with_max_iterations(0);
        assert!(matches!(
            zero_iterations.validate(),
            Err(GjkError::InvalidConfig {
                field: "max_iterations",
                ..
            })
        ));

        let negative = GjkConfig::default().with_raycast_epsilon(-1.0);
        assert!(matches!(
            negative.validate(),
            Err(GjkError::InvalidConfig {
                field: "raycast_epsilon",
                ..
            })
        ));

        let nan = GjkConfig::default().with_pointcast_epsilon(f32::NAN);
        assert!(nan.validate().is_err());

        let zero_epsilon = GjkConfig::default().with_epsilon(0.0);
        assert!(matches!(
            zero_epsilon.validate(),
            Err(GjkError::InvalidConfig { field: "epsilon", .. })
        ));
    }

    #[test]
    fn builders_set_every_tolerance() {
        let config = GjkConfig::default()
            .with_max_iterations(20)
            .with_closest_points_epsilon(1e-6)
            .with_pointcast_epsilon(1e-5)
            .with_raycast_epsilon(1e-7)
            .with_epsilon(1e-9);
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.closest_points_epsilon, 1e-6);
        assert_eq!(config.pointcast_epsilon, 1e-5);
        assert_eq!(config.raycast_epsilon, 1e-7);
        assert_eq!(config.epsilon, 1e-9);
        assert!(config.validate().is_ok());
    }
}
