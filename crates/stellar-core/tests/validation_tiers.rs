//! # Validation Tier Tests (T0-T4)
//!
//! If ANY tier fails, the engine is INVALID.
//!
//! ## Tiers
//! - T0: Mass Classification
//! - T1: Stage Timing
//! - T2: Interpolation Boundaries
//! - T3: Playback Speed
//! - T4: Range Changes and Particles

use stellar_core::{
    Catalog, ParticleField, Simulation, SimulationConfig, SpeedControl, StageDuration,
    StageTimeline, StellarError, TimelineConfig, TimelinePhase, builtin_catalog,
};

fn catalog() -> &'static Catalog {
    builtin_catalog().expect("builtin catalog")
}

fn timeline(range: &str) -> StageTimeline<'static> {
    let (_, range) = catalog().find(range).expect("range");
    StageTimeline::new(range, TimelineConfig::default())
}

// =============================================================================
// TIER T0: MASS CLASSIFICATION
// =============================================================================

mod t0_classification {
    use super::*;

    /// T0.1: Every range's own bounds classify somewhere inside the catalog.
    #[test]
    fn range_bounds_classify() {
        for range in catalog().ranges() {
            assert!(catalog().classify(range.min()).is_ok());
            assert!(catalog().classify(range.max()).is_ok());
        }
    }

    /// T0.2: Midpoints classify to their own range.
    #[test]
    fn midpoints_classify_to_own_range() {
        for (i, range) in catalog().ranges().iter().enumerate() {
            let mid = (range.min() + range.max()) / 2.0;
            assert_eq!(catalog().classify(mid).expect("classify").0, i);
        }
    }

    /// T0.3: A miss is reported, not papered over.
    #[test]
    fn unclamped_mass_misses() {
        assert!(matches!(
            catalog().classify(51.0),
            Err(StellarError::NoMatchingRange { .. })
        ));
    }
}

// =============================================================================
// TIER T1: STAGE TIMING
// =============================================================================

mod t1_stage_timing {
    use super::*;

    /// T1.1: Low Mass nebula (5000 ms, transition 1000 ms) at dt = 1s.
    #[test]
    fn low_mass_nebula_scenario() {
        let mut tl = timeline("Low Mass");

        for tick in 1..=4 {
            tl.advance(1.0);
            assert_eq!(
                tl.phase(),
                TimelinePhase::Steady { index: 0 },
                "tick {}",
                tick
            );
        }

        tl.advance(1.0);
        assert_eq!(
            tl.phase(),
            TimelinePhase::Transitioning {
                from: 0,
                to: 1,
                elapsed: 0.0
            }
        );

        let snap = tl.advance(1.0);
        assert_eq!(snap.name, "Protostar");
        assert_eq!(snap.elapsed, 0.0);
        assert_eq!(tl.phase(), TimelinePhase::Steady { index: 1 });
        assert_eq!(tl.stage_elapsed(), 0.0);
    }

    /// T1.2: Once terminal, nothing changes for 10,000 more seconds.
    #[test]
    fn terminal_idempotence() {
        let mut tl = timeline("Low Mass");
        let lifetime = tl.range().lifetime();
        for _ in 0..(lifetime as usize + 5) {
            tl.advance(1.0);
        }
        assert!(tl.is_terminal());

        let reference = tl.snapshot();
        let (name, color, radius, emission, index) = (
            reference.name.clone(),
            reference.color,
            reference.radius,
            reference.emission,
            reference.stage_index,
        );
        assert_eq!(name, "White Dwarf");

        for _ in 0..10_000 {
            let snap = tl.advance(1.0);
            assert_eq!(snap.name, name);
            assert_eq!(snap.color, color);
            assert_eq!(snap.radius, radius);
            assert_eq!(snap.emission, emission);
            assert_eq!(snap.stage_index, index);
            assert_eq!(snap.duration, StageDuration::Unbounded);
        }
        assert!(tl.is_terminal());
    }

    /// T1.3: Every stage of every range is visited in order.
    #[test]
    fn every_stage_visited_in_order() {
        for range in catalog().ranges() {
            let mut tl = StageTimeline::new(range, TimelineConfig::default());
            let mut seen = vec![tl.stage_index()];

            for _ in 0..100_000 {
                if tl.is_terminal() {
                    break;
                }
                tl.advance(0.05);
                if seen.last() != Some(&tl.stage_index()) {
                    seen.push(tl.stage_index());
                }
            }

            let expected: Vec<usize> = (0..range.stages().len()).collect();
            assert_eq!(seen, expected, "{}", range.name());
        }
    }

    /// T1.4: Zero-length ticks never move the timeline.
    #[test]
    fn zero_dt_is_inert() {
        let mut tl = timeline("High Mass");
        for _ in 0..1000 {
            tl.advance(0.0);
        }
        assert_eq!(tl.phase(), TimelinePhase::Steady { index: 0 });
        assert_eq!(tl.total_elapsed(), 0.0);
    }
}

// =============================================================================
// TIER T2: INTERPOLATION BOUNDARIES
// =============================================================================

mod t2_interpolation_boundaries {
    use super::*;

    /// T2.1: The tick that starts a transition reports the source stage.
    #[test]
    fn progress_zero_equals_source() {
        let mut tl = timeline("Medium Mass");
        let source = tl.current_stage();
        let snap = tl.advance(4.0);
        assert!(snap.shows(source));
        assert!(snap.transition.is_none());
    }

    /// T2.2: A zero-progress peek blends to the source values.
    #[test]
    fn peek_at_progress_zero_matches_source_values() {
        let mut tl = timeline("Medium Mass");
        let source = tl.current_stage();
        tl.advance(4.0);

        let peek = tl.snapshot();
        assert_eq!(peek.transition.expect("blend").progress, 0.0);
        assert_eq!(peek.color, source.color);
        assert_eq!(peek.radius, source.radius);
        assert_eq!(peek.emission, source.emission);
    }

    /// T2.3: The commit tick reports the destination exactly, zero elapsed.
    #[test]
    fn commit_equals_destination() {
        let mut tl = timeline("Medium Mass");
        let destination = &tl.range().stages()[1];
        tl.advance(4.0);
        tl.advance(0.6);
        let snap = tl.advance(0.6);
        assert!(snap.shows(destination));
        assert_eq!(snap.elapsed, 0.0);
    }

    /// T2.4: Blended values stay between the two endpoints.
    #[test]
    fn blend_stays_between_endpoints() {
        let mut tl = timeline("High Mass");
        let stages = tl.range().stages();
        let (from, to) = (&stages[0], &stages[1]);
        tl.advance(3.0);

        for _ in 0..9 {
            let snap = tl.advance(0.1);
            if snap.transition.is_none() {
                break;
            }
            let (lo, hi) = (from.radius.min(to.radius), from.radius.max(to.radius));
            assert!(snap.radius >= lo && snap.radius <= hi);
        }
    }
}

// =============================================================================
// TIER T3: PLAYBACK SPEED
// =============================================================================

mod t3_playback_speed {
    use super::*;

    /// T3.1: Speed 2.0 with dt 0.5 matches speed 1.0 with dt 1.0.
    #[test]
    fn doubled_speed_halved_dt_is_equivalent() {
        let mut fast = timeline("Low Mass");
        let mut normal = timeline("Low Mass");
        let speed = SpeedControl::new(2.0);

        for _ in 0..40 {
            fast.advance(speed.scale(0.5));
            normal.advance(1.0);
            assert_eq!(fast.phase(), normal.phase());
            assert_eq!(fast.stage_elapsed(), normal.stage_elapsed());
        }
    }

    /// T3.2: Same equivalence through the session.
    #[test]
    fn session_speed_equivalence() {
        let start = |speed| {
            Simulation::new(
                catalog(),
                SimulationConfig {
                    speed,
                    ..SimulationConfig::default()
                },
            )
            .expect("simulation")
        };
        let mut fast = start(2.0);
        let mut normal = start(1.0);

        for _ in 0..40 {
            fast.tick(0.5);
            normal.tick(1.0);
            assert_eq!(fast.timeline().phase(), normal.timeline().phase());
        }
    }
}

// =============================================================================
// TIER T4: RANGE CHANGES AND PARTICLES
// =============================================================================

mod t4_range_changes {
    use super::*;

    /// T4.1: A range change resets timers and regenerates the field.
    #[test]
    fn range_change_resets_everything() {
        let mut sim = Simulation::new(
            catalog(),
            SimulationConfig {
                mass: 7.95,
                ..SimulationConfig::default()
            },
        )
        .expect("simulation");
        let before: Vec<[f64; 3]> = sim
            .timeline()
            .particles()
            .iter()
            .map(|p| p.position)
            .collect();
        assert!(!before.is_empty());

        for _ in 0..10 {
            sim.tick(1.0);
        }
        assert!(sim.timeline().stage_index() > 0);
        assert!(sim.timeline().particles().is_empty());

        assert!(sim.adjust_mass(0.1).expect("adjust"));
        let timeline = sim.timeline();
        assert_eq!(timeline.phase(), TimelinePhase::Steady { index: 0 });
        assert_eq!(timeline.stage_elapsed(), 0.0);
        assert_eq!(timeline.total_elapsed(), 0.0);

        let declared = sim.range().stages()[0].particles.expect("nebula emits");
        assert_eq!(timeline.particles().len(), declared.count);

        let after: Vec<[f64; 3]> = timeline.particles().iter().map(|p| p.position).collect();
        let shared = before.len().min(after.len());
        assert_ne!(&before[..shared], &after[..shared]);
    }

    /// T4.2: A range change while the old field is still live replaces it.
    #[test]
    fn range_change_replaces_live_field() {
        let mut sim = Simulation::new(
            catalog(),
            SimulationConfig {
                mass: 1.95,
                ..SimulationConfig::default()
            },
        )
        .expect("simulation");
        sim.tick(0.5);
        let before: Vec<[f64; 3]> = sim
            .timeline()
            .particles()
            .iter()
            .map(|p| p.position)
            .collect();
        assert!(!before.is_empty());

        assert!(sim.adjust_mass(0.1).expect("adjust"));
        let after: Vec<[f64; 3]> = sim
            .timeline()
            .particles()
            .iter()
            .map(|p| p.position)
            .collect();

        assert!(!after.is_empty());
        let shared = before.len().min(after.len());
        assert_ne!(&before[..shared], &after[..shared]);
    }

    /// T4.3: count = 100, spread = 2.0 stays inside the disk.
    #[test]
    fn particle_scenario_100_by_2() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaChaRng::seed_from_u64(2024);
        let particles = ParticleField::generate(100, 2.0, &mut rng);

        assert_eq!(particles.len(), 100);
        for p in &particles {
            assert!(p.radial_distance() <= 2.0 + 1e-9);
            assert!((-1.0..=1.0).contains(&p.position[2]));
        }
    }

    /// T4.4: Supernova particles are not spawned on entry (cleared on commit).
    #[test]
    fn supernova_entry_has_no_particles() {
        let mut tl = timeline("High Mass");
        let supernova = tl
            .range()
            .stages()
            .iter()
            .position(|s| s.name == "Supernova")
            .expect("supernova");

        while tl.stage_index() < supernova {
            tl.advance(0.1);
        }
        assert!(tl.current_stage().emits_particles());
        assert!(tl.particles().is_empty());
    }
}
