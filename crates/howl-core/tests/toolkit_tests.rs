// Integration tests for the wave, timer and smoothing toolkit.

use howl_core::random::{random_in_range, random_in_range_biased};
use howl_core::{
    CyclicalWave, GeneratorShape, Interpolation, SmoothedValue, SynthError, TimerManager,
    Transition, VarianceHandler, VarianceKind, WaveManager, WavePoint, WaveShape,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const EPS: f64 = 1e-9;

fn triangle() -> WaveShape {
    WaveShape::from_triples(
        "triangle",
        &[(0.0, 0.0, 0.0), (0.5, 1.0, 0.0)],
        Interpolation::Linear,
    )
    .unwrap()
}

#[test]
fn every_catalog_shape_passes_through_its_points() {
    for shape in GeneratorShape::ALL {
        let wave_shape = shape.wave_shape().unwrap();
        let wave = CyclicalWave::new(wave_shape.clone());
        for point in wave_shape.points() {
            let p = wave.position(point.time);
            assert!(
                (p - point.position).abs() < EPS,
                "{} at t={} gave {p}, expected {}",
                shape.name(),
                point.time,
                point.position
            );
        }
        let first = wave_shape.points()[0];
        if first.time == 0.0 {
            assert!(
                (wave.position(1.0) - first.position).abs() < EPS,
                "{} does not wrap back onto its first point",
                shape.name()
            );
        }
    }
}

#[test]
fn wave_wraps_between_last_and_first_point() {
    let shape = WaveShape::new(
        "offset",
        &[WavePoint::new(0.25, 1.0, 0.0), WavePoint::new(0.75, 0.0, 0.0)],
        Interpolation::Linear,
    )
    .unwrap();
    let wave = CyclicalWave::from(shape);
    // halfway through the wrapped segment 0.75 -> 1.25
    assert!((wave.position(1.0) - 0.5).abs() < EPS);
    assert!((wave.position(0.0) - 0.5).abs() < EPS);
    assert!((wave.position(-0.5) - wave.position(0.5)).abs() < EPS);
}

#[test]
fn invalid_shapes_are_rejected_at_construction() {
    let one_point = WaveShape::from_triples("one", &[(0.0, 0.0, 0.0)], Interpolation::Hermite);
    assert!(matches!(one_point, Err(SynthError::TooFewPoints { count: 1, .. })));

    let out_of_range = WaveShape::from_triples(
        "late",
        &[(0.0, 0.0, 0.0), (1.0, 1.0, 0.0)],
        Interpolation::Hermite,
    );
    assert!(matches!(out_of_range, Err(SynthError::PointOutOfRange { index: 1, .. })));

    let unordered = WaveShape::from_triples(
        "backwards",
        &[(0.5, 0.0, 0.0), (0.2, 1.0, 0.0)],
        Interpolation::Hermite,
    );
    assert!(matches!(unordered, Err(SynthError::NonIncreasingTime { index: 1, .. })));
}

#[test]
fn position_depends_only_on_phase() {
    let wave = CyclicalWave::new(GeneratorShape::Jelly.wave_shape().unwrap());
    for t in [0.0, 0.13, 0.5, 0.77, 0.999] {
        for k in 1..5 {
            let a = wave.position(t);
            let b = wave.position(t + k as f64);
            assert!((a - b).abs() < 1e-9, "t={t} k={k}: {a} vs {b}");
        }
    }
}

#[test]
fn manager_without_variance_repeats_every_cycle() {
    let mut near: WaveManager = WaveManager::new(1);
    let mut far: WaveManager = WaveManager::new(2);
    near.add_wave(triangle());
    far.add_wave(triangle());
    near.update(0.3).unwrap();
    far.update(3.3).unwrap();
    let a = near.position("triangle", true).unwrap();
    let b = far.position("triangle", true).unwrap();
    assert!((a - b).abs() < 1e-9, "{a} vs {b}");
}

#[test]
fn manager_reports_missing_wave() {
    let manager: WaveManager = WaveManager::new(0);
    assert_eq!(
        manager.position("nope", false),
        Err(SynthError::WaveNotFound("nope".into()))
    );
}

#[test]
fn negative_deltas_fail_fast() {
    let mut manager: WaveManager = WaveManager::new(0);
    let mut timers: TimerManager<u8> = TimerManager::new();
    let mut value: SmoothedValue = SmoothedValue::new(0.0);
    assert_eq!(manager.update(-0.1), Err(SynthError::NegativeDelta(-0.1)));
    assert_eq!(timers.update(-0.1), Err(SynthError::NegativeDelta(-0.1)));
    assert_eq!(value.update(-0.1), Err(SynthError::NegativeDelta(-0.1)));
}

#[test]
fn smoothed_value_converges_and_fires_once() {
    let mut value = SmoothedValue::new(0.0);
    assert_eq!(value.set_target_then(1.0, Transition::Rate(0.5), "done"), None);
    assert!(value.is_transitioning());
    assert_eq!(value.update(2.0).unwrap(), Some("done"));
    assert!((value.current() - 1.0).abs() < EPS);
    assert_eq!(value.update(1.0).unwrap(), None);
    assert!((value.current() - 1.0).abs() < EPS);
}

#[test]
fn smoothed_value_duration_transition_is_eased() {
    let mut value: SmoothedValue<u8> = SmoothedValue::new(2.0);
    value.set_target(4.0, Transition::Duration(0.75));
    value.update(0.25).unwrap();
    let first = value.current();
    assert!(first > 2.0 && first < 3.0, "smoothstep starts slowly, got {first}");
    value.update(0.25).unwrap();
    value.update(0.25).unwrap();
    assert!((value.current() - 4.0).abs() < EPS);
    assert!(!value.is_transitioning());
}

#[test]
fn smoothed_value_already_at_target_returns_event_immediately() {
    let mut value = SmoothedValue::new(0.5);
    assert_eq!(value.set_target_then(0.5, Transition::Duration(3.0), 7), Some(7));
    assert_eq!(value.update(5.0).unwrap(), None);
}

#[test]
fn stop_at_end_of_cycle_pins_clock_until_restart() {
    let mut manager = WaveManager::new(0);
    manager.add_wave(triangle());
    manager.update(0.4).unwrap();
    manager.stop_at_end_of_cycle("stop");
    assert!(manager.update(0.4).unwrap().is_empty());
    assert!((manager.current_time() - 0.8).abs() < EPS);

    let events = manager.update(0.5).unwrap();
    assert_eq!(events.as_slice(), &["stop"]);
    assert!((manager.current_time() - 1.0).abs() < EPS);
    assert!(manager.is_stopped());

    assert!(manager.update(1.0).unwrap().is_empty());
    assert!((manager.current_time() - 1.0).abs() < EPS);

    manager.restart();
    manager.update(0.25).unwrap();
    assert!((manager.current_time() - 0.25).abs() < EPS);
    assert!(!manager.is_stopped());
}

#[test]
fn stop_after_iterations_counts_boundaries() {
    let mut manager = WaveManager::new(0);
    manager.add_wave(triangle());
    manager.update(0.5).unwrap();
    manager.stop_after_iterations(3, 9u8);
    let mut fired = Vec::new();
    for _ in 0..40 {
        fired.extend(manager.update(0.1).unwrap());
    }
    assert_eq!(fired, vec![9]);
    assert!((manager.current_time() - 3.0).abs() < EPS);
}

#[test]
fn speed_ramp_reports_reaching_target() {
    let mut manager = WaveManager::new(0);
    manager.add_wave(triangle());
    assert_eq!(manager.set_target_speed_then(2.0, 0.5, 'r'), None);
    assert!(manager.update(1.0).unwrap().is_empty());
    assert_eq!(manager.update(1.0).unwrap().as_slice(), &['r']);
    assert!((manager.current_speed() - 2.0).abs() < EPS);
}

#[test]
fn stop_armed_on_speed_reached_targets_boundary_before_the_tick() {
    let mut manager = WaveManager::new(0);
    manager.add_wave(triangle());
    manager.update(0.95).unwrap();
    assert_eq!(manager.set_target_speed_then(1.0 + 1e-9, 1e6, "peak"), None);

    let mut reached = Vec::new();
    let events = manager
        .update_with(0.1, |manager, event| {
            reached.push(event);
            manager.stop_at_end_of_cycle("end");
        })
        .unwrap();
    assert_eq!(reached, vec!["peak"]);
    assert_eq!(events.as_slice(), &["end"]);
    assert!(manager.is_stopped());
    assert!(
        (manager.current_time() - 1.0).abs() < EPS,
        "stopped at {}",
        manager.current_time()
    );
}

#[test]
fn plain_update_reports_speed_event_before_stop() {
    let mut manager = WaveManager::new(0);
    manager.add_wave(triangle());
    manager.update(0.5).unwrap();
    manager.stop_at_end_of_cycle('s');
    assert_eq!(manager.set_target_speed_then(1.0 + 1e-9, 1e6, 'r'), None);
    assert_eq!(manager.update(0.6).unwrap().as_slice(), &['r', 's']);
}

#[test]
fn timers_fire_once_and_can_reschedule() {
    let mut timers = TimerManager::new();
    assert_eq!(timers.add_timer('a', 1.0), None);
    assert_eq!(timers.add_timer('b', 0.5), None);
    assert!((timers.proportion_elapsed(&'a').unwrap()).abs() < EPS);

    assert_eq!(timers.update(0.6).unwrap().as_slice(), &['b']);
    assert!((timers.proportion_elapsed(&'a').unwrap() - 0.6).abs() < EPS);
    assert!((timers.remaining_time(&'a').unwrap() - 0.4).abs() < EPS);
    assert!(!timers.has_timer(&'b'));

    assert_eq!(timers.add_timer('b', 2.0), None);
    assert_eq!(timers.update(0.5).unwrap().as_slice(), &['a']);
    assert!(timers.update(1.0).unwrap().is_empty());
    assert_eq!(timers.update(0.6).unwrap().as_slice(), &['b']);
    assert!(timers.is_empty());
}

#[test]
fn non_positive_timer_is_handed_back() {
    let mut timers = TimerManager::new();
    assert_eq!(timers.add_timer(3u32, 0.0), Some(3));
    assert_eq!(timers.add_timer(4u32, -1.0), Some(4));
    assert!(timers.is_empty());
}

#[test]
fn cancelled_timer_never_fires() {
    let mut timers = TimerManager::new();
    let _ = timers.add_timer(1u8, 0.1);
    timers.cancel_timer(&1);
    assert!(timers.update(1.0).unwrap().is_empty());
}

#[test]
fn biased_range_leans_toward_start() {
    let mut rng = StdRng::seed_from_u64(1234);
    let n = 100_000;
    let bias = 4.0;
    let mean: f64 = (0..n)
        .map(|_| random_in_range_biased(&mut rng, 0.0..=1.0, bias).unwrap())
        .sum::<f64>()
        / n as f64;
    assert!(mean < 1.0 / (bias + 1.0) + 0.01, "mean {mean}");

    let uniform: f64 = (0..n)
        .map(|_| random_in_range_biased(&mut rng, 0.0..=1.0, 1.0).unwrap())
        .sum::<f64>()
        / n as f64;
    assert!((uniform - 0.5).abs() < 0.01, "mean {uniform}");
}

#[test]
fn fractional_bias_leans_toward_end() {
    let mut rng = StdRng::seed_from_u64(99);
    let n = 20_000;
    let mean: f64 = (0..n)
        .map(|_| random_in_range_biased(&mut rng, 0.0..=1.0, 0.25).unwrap())
        .sum::<f64>()
        / n as f64;
    assert!(mean > 0.75, "mean {mean}");
}

#[test]
fn non_positive_bias_is_an_error() {
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        random_in_range_biased(&mut rng, 0.0..=1.0, 0.0),
        Err(SynthError::InvalidBias(0.0))
    );
    assert!(random_in_range_biased(&mut rng, 0.0..=1.0, -2.0).is_err());
}

#[test]
fn degenerate_range_returns_its_bound() {
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(random_in_range(&mut rng, 0.3..=0.3), 0.3);
}

#[test]
fn attenuating_variance_never_boosts() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut handler = VarianceHandler::new(VarianceKind::Attenuate);
    handler.set_variance(0.3);
    for _ in 0..1_000 {
        handler.apply_new_cycle(&mut rng);
        let factor = handler.factor(1.0);
        assert!(factor > 0.7 && factor <= 1.0, "factor {factor}");
    }
}

#[test]
fn jitter_variance_stays_within_band() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut handler = VarianceHandler::new(VarianceKind::Jitter);
    handler.set_variance(0.4);
    let (mut below, mut above) = (false, false);
    for _ in 0..1_000 {
        handler.apply_new_cycle(&mut rng);
        let factor = handler.factor(1.0);
        assert!((0.6..1.4).contains(&factor), "factor {factor}");
        below |= factor < 1.0;
        above |= factor > 1.0;
    }
    assert!(below && above, "jitter should land on both sides of 1");
}

#[test]
fn zero_variance_gives_unit_factor() {
    let mut rng = StdRng::seed_from_u64(13);
    for kind in [VarianceKind::Attenuate, VarianceKind::Jitter] {
        let mut handler = VarianceHandler::new(kind);
        handler.set_variance(0.5);
        handler.apply_new_cycle(&mut rng);
        handler.set_variance(0.0);
        handler.apply_new_cycle(&mut rng);
        handler.apply_new_cycle(&mut rng);
        for phase in [0.0, 0.3, 0.99] {
            assert_eq!(handler.factor(phase), 1.0, "{kind:?} at {phase}");
        }
    }
}

#[test]
fn variance_eases_in_from_previous_cycle() {
    let mut rng = StdRng::seed_from_u64(14);
    let mut handler = VarianceHandler::new(VarianceKind::Jitter);
    handler.set_variance(0.5);
    handler.set_ease_in(0.4);
    handler.apply_new_cycle(&mut rng);
    let previous = handler.factor(1.0);
    handler.apply_new_cycle(&mut rng);
    let current = handler.factor(1.0);
    assert!((previous - current).abs() > EPS, "draws should differ");

    assert!((handler.factor(0.0) - previous).abs() < EPS);
    let halfway = previous + (current - previous) * 0.5;
    assert!((handler.factor(0.2) - halfway).abs() < EPS);
    assert!((handler.factor(0.4) - current).abs() < EPS);
    assert!((handler.factor(0.9) - current).abs() < EPS);
}
