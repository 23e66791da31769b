use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use swarmopt::{
    Direction, EngineView, GlobalTopology, PsoConfig, PsoEngine, PsoVariant, Rosenbrock,
    Statistics,
};

fn variant() -> impl Strategy<Value = PsoVariant> {
    prop_oneof![
        Just(PsoVariant::Basic),
        Just(PsoVariant::Inertia),
        Just(PsoVariant::Constricted),
    ]
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Minimize), Just(Direction::Maximize)]
}

/// Personal bests of every particle, recorded after each step.
type Snapshots = Rc<RefCell<Vec<Vec<f64>>>>;

fn run(config: PsoConfig) -> (PsoEngine, Snapshots) {
    let snapshots: Snapshots = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::clone(&snapshots);

    let mut engine = PsoEngine::new();
    engine
        .configure(config)
        .set_topology(GlobalTopology::new())
        .set_evaluator(Rosenbrock)
        .add_observer(move |view: &EngineView<'_>| {
            let bests = view
                .topology
                .particles()
                .iter()
                .map(|p| p.best_fitness())
                .collect();
            recorder.borrow_mut().push(bests);
        });
    engine.execute(0).expect("run failed");
    (engine, snapshots)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn bests_never_regress_and_particles_stay_bounded(
        seed in any::<u64>(),
        dims in 1usize..5,
        swarm in 2usize..10,
        steps in 1usize..30,
        limit in 0.5f64..20.0,
        vmax in 0.1f64..10.0,
        variant in variant(),
        direction in direction(),
    ) {
        let config = PsoConfig::new(dims)
            .with_swarm_size(swarm)
            .with_time_steps(steps)
            .with_uniform_bounds(-limit, limit)
            .with_velocity_bounds(vec![vmax; dims])
            .with_variant(variant)
            .with_inertia(0.9, 0.4)
            .with_direction(direction)
            .with_seed(seed);

        let (engine, snapshots) = run(config);
        let snapshots = snapshots.borrow();
        prop_assert_eq!(snapshots.len(), steps);

        for pair in snapshots.windows(2) {
            for (before, after) in pair[0].iter().zip(pair[1].iter()) {
                prop_assert!(!direction.improves(*before, *after));
            }
        }

        let global: Vec<f64> = snapshots
            .iter()
            .map(|bests| {
                let idx = direction.best_index(bests.iter().copied()).unwrap();
                bests[idx]
            })
            .collect();
        for pair in global.windows(2) {
            prop_assert!(!direction.improves(pair[0], pair[1]));
        }

        let topology = engine.topology().unwrap();
        for particle in topology.particles() {
            prop_assert!(particle.is_consistent(dims));
            prop_assert!(particle.position().iter().all(|x| (-limit..=limit).contains(x)));
            prop_assert!(particle.best_position().iter().all(|x| (-limit..=limit).contains(x)));
            prop_assert!(particle.velocity().iter().all(|v| v.abs() <= vmax));
        }
    }

    #[test]
    fn statistics_are_idempotent(seed in any::<u64>(), swarm in 2usize..12) {
        let config = PsoConfig::new(3)
            .with_swarm_size(swarm)
            .with_time_steps(5)
            .with_seed(seed);
        let (engine, _) = run(config);

        let particles = engine.topology().unwrap().particles().to_vec();
        let best = engine.best_particle().unwrap().id();
        let first = Statistics::compute(&particles, best).unwrap();
        let second = Statistics::compute(&particles, best).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.swarm.best_fit_var.to_bits(), second.swarm.best_fit_var.to_bits());
        prop_assert_eq!(Some(&first), engine.last_statistics());
    }
}
