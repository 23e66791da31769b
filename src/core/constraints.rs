use super::config::PsoConfig;
use super::types::PsoVariant;
use crate::error::PsoError;
use crate::optimization::solvers::constriction_coefficient;

/// Check that a per-dimension sequence matches the configured dimensions.
fn check_length(name: &str, len: usize, dimensions: usize) -> Result<(), PsoError> {
    if len != dimensions {
        return Err(PsoError::config(format!(
            "{} has {} entries, expected one per dimension ({})",
            name, len, dimensions
        )));
    }
    Ok(())
}

/// Validate a full configuration
///
/// Sizes and step counts first, then every bound sequence, then the
/// variant-specific parameters. Returns the first problem found.
pub fn validate_config(config: &PsoConfig) -> Result<(), PsoError> {
    if config.dimensions < 1 {
        return Err(PsoError::config("dimensions must be >= 1"));
    }
    if config.swarm_size < 2 {
        return Err(PsoError::config(format!(
            "swarm size must be >= 2, got {}",
            config.swarm_size
        )));
    }
    if config.time_steps < 1 {
        return Err(PsoError::config("Number of steps must be >= 1"));
    }

    check_length("position_bounds", config.position_bounds.len(), config.dimensions)?;
    check_length("velocity_bounds", config.velocity_bounds.len(), config.dimensions)?;
    if let Some(initial) = &config.initial_position_bounds {
        check_length("initial_position_bounds", initial.len(), config.dimensions)?;
    }

    for (i, bound) in config.position_bounds.iter().enumerate() {
        if !bound.is_valid() {
            return Err(PsoError::config(format!(
                "position bound for dimension {} is invalid: [{}, {}]",
                i, bound.min, bound.max
            )));
        }
    }
    for (i, bound) in config.seeding_bounds().iter().enumerate() {
        if !bound.is_valid() {
            return Err(PsoError::config(format!(
                "initial position bound for dimension {} is invalid: [{}, {}]",
                i, bound.min, bound.max
            )));
        }
        let search = &config.position_bounds[i];
        if !search.encloses(bound) {
            return Err(PsoError::config(format!(
                "initial position bound for dimension {} ([{}, {}]) leaves the search space [{}, {}]",
                i, bound.min, bound.max, search.min, search.max
            )));
        }
    }
    for (i, bound) in config.velocity_bounds.iter().enumerate() {
        if !bound.is_valid() {
            return Err(PsoError::config(format!(
                "velocity bound for dimension {} is invalid: [{}, {}]",
                i, bound.min, bound.max
            )));
        }
    }

    if !config.c1.is_finite() || !config.c2.is_finite() {
        return Err(PsoError::config("c1 and c2 must be finite"));
    }

    match config.variant {
        PsoVariant::Basic => {}
        PsoVariant::Inertia => match &config.inertia {
            None => {
                return Err(PsoError::config(
                    "INERTIA variant requires inertia start/end factors",
                ));
            }
            Some(schedule) if !schedule.start.is_finite() || !schedule.end.is_finite() => {
                return Err(PsoError::config("inertia factors must be finite"));
            }
            Some(_) => {}
        },
        PsoVariant::Constricted => {
            constriction_coefficient(config.c1, config.c2)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Bound, VelocityBound};
    use test_case::test_case;

    fn base() -> PsoConfig {
        PsoConfig::new(2).with_time_steps(10)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&base()).is_ok());
    }

    #[test_case(1, false ; "single particle")]
    #[test_case(2, true ; "two particles")]
    #[test_case(0, false ; "empty swarm")]
    fn test_swarm_size_boundary(size: usize, ok: bool) {
        let result = validate_config(&base().with_swarm_size(size));
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert!(matches!(result, Err(PsoError::Configuration(_))));
        }
    }

    #[test]
    fn test_zero_dimensions_and_steps() {
        let mut config = base();
        config.dimensions = 0;
        config.position_bounds.clear();
        config.velocity_bounds.clear();
        assert!(matches!(validate_config(&config), Err(PsoError::Configuration(_))));

        assert!(matches!(
            validate_config(&base().with_time_steps(0)),
            Err(PsoError::Configuration(_))
        ));
    }

    #[test]
    fn test_bound_length_mismatch() {
        let config = base().with_position_bounds(vec![(-1.0, 1.0)]);
        assert!(matches!(validate_config(&config), Err(PsoError::Configuration(_))));

        let config = base().with_velocity_bounds(vec![1.0, 1.0, 1.0]);
        assert!(matches!(validate_config(&config), Err(PsoError::Configuration(_))));

        let config = base().with_initial_position_bounds(vec![(0.0, 1.0)]);
        assert!(matches!(validate_config(&config), Err(PsoError::Configuration(_))));
    }

    #[test]
    fn test_inverted_and_non_finite_bounds() {
        let mut config = base();
        config.position_bounds[1] = Bound::new(5.0, -5.0);
        assert!(validate_config(&config).is_err());

        let mut config = base();
        config.velocity_bounds[0] = VelocityBound::new(f64::NAN, 1.0);
        assert!(validate_config(&config).is_err());
    }

    #[test_case(Bound::new(-1e308, 1e308), false ; "width overflows")]
    #[test_case(Bound::new(-1e307, 1e307), true ; "wide but finite")]
    #[test_case(Bound::new(f64::NEG_INFINITY, 0.0), false ; "infinite end")]
    fn test_position_bound_width_must_be_finite(bound: Bound, ok: bool) {
        let config = PsoConfig::new(1)
            .with_position_bounds(vec![bound])
            .with_time_steps(10);
        let result = validate_config(&config);
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert!(matches!(result, Err(PsoError::Configuration(_))));
        }
    }

    #[test]
    fn test_velocity_bound_width_must_be_finite() {
        let config = base().with_velocity_bounds(vec![(-1e308, 1e308); 2]);
        assert!(matches!(validate_config(&config), Err(PsoError::Configuration(_))));
    }

    #[test]
    fn test_initial_bounds_must_stay_in_search_space() {
        let config = PsoConfig::new(1)
            .with_uniform_bounds(-10.0, 10.0)
            .with_initial_position_bounds(vec![(50.0, 100.0)])
            .with_time_steps(10);
        assert!(matches!(validate_config(&config), Err(PsoError::Configuration(_))));

        let config = config.with_initial_position_bounds(vec![(5.0, 10.0)]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_inertia_requires_schedule() {
        let config = base().with_variant(PsoVariant::Inertia);
        assert!(matches!(validate_config(&config), Err(PsoError::Configuration(_))));
        assert!(validate_config(&config.with_inertia(0.9, 0.4)).is_ok());
    }

    #[test]
    fn test_constricted_requires_phi_at_least_four() {
        let config = base().with_variant(PsoVariant::Constricted);
        assert!(validate_config(&config).is_ok());

        let config = config.with_coefficients(1.0, 1.0);
        assert!(matches!(
            validate_config(&config),
            Err(PsoError::NumericDomain { .. })
        ));
    }
}
