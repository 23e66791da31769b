mod communicator;
mod particle;
pub mod traits;

pub use communicator::{constriction_coefficient, Communicator, UniformPosition, UniformVelocity};
pub use particle::Particle;
pub use traits::{PositionInitializer, UpdateRule, VelocityInitializer, VelocityWeighting};

use crate::core::{PsoConfig, PsoVariant};
use crate::error::PsoError;

/// Resolve the weighting used by the next position pass.
///
/// `inertia_factor` is the engine's current interpolated factor and is only
/// read for the INERTIA variant.
pub fn select_weighting(
    config: &PsoConfig,
    inertia_factor: Option<f64>,
) -> Result<VelocityWeighting, PsoError> {
    match config.variant {
        PsoVariant::Basic => Ok(VelocityWeighting::Basic),
        PsoVariant::Inertia => inertia_factor
            .map(VelocityWeighting::Inertia)
            .ok_or_else(|| {
                PsoError::config("INERTIA variant requires inertia start/end factors")
            }),
        PsoVariant::Constricted => Ok(VelocityWeighting::Constricted(constriction_coefficient(
            config.c1, config.c2,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_weighting_per_variant() {
        let config = PsoConfig::new(1);
        assert_eq!(select_weighting(&config, None).unwrap(), VelocityWeighting::Basic);

        let config = config.with_variant(PsoVariant::Inertia);
        assert_eq!(
            select_weighting(&config, Some(0.7)).unwrap(),
            VelocityWeighting::Inertia(0.7)
        );
        assert!(select_weighting(&config, None).is_err());

        let config = config.with_variant(PsoVariant::Constricted);
        let weighting = select_weighting(&config, None).unwrap();
        assert_eq!(weighting.variant(), PsoVariant::Constricted);

        let config = config.with_coefficients(1.0, 1.0);
        assert!(matches!(
            select_weighting(&config, None),
            Err(PsoError::NumericDomain { .. })
        ));
    }
}
