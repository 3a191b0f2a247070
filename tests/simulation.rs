use flurry::{
    preset::{EmitterPreset, PresetFile},
    render::SpriteBuffer,
    BlendMode, Color, Emitter, EmitterConfig, FloatRange, IntRange, ParticleSystem,
};
use glam::{vec2, Vec2};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn single_slot() -> Emitter {
    Emitter::with_seed(
        EmitterConfig {
            capacity: 1,
            burst: IntRange::splat(1),
            age: FloatRange::splat(1.),
            velocity: FloatRange::ZERO,
            ..Default::default()
        },
        42,
    )
    .unwrap()
}

#[test]
fn single_particle_dies_strictly_after_its_lifetime() {
    let mut emitter = single_slot();
    assert_eq!(emitter.burst(), 1);

    let mut alive = Vec::new();
    for _ in 0..5 {
        emitter.update(0.5);
        alive.push(emitter.particles()[0].is_active());
    }

    // ages 0.5, 1.0, 1.5, ...: still alive at exactly ttl, gone right after
    assert_eq!(alive, vec![true, true, false, false, false]);
}

#[test]
fn empty_system_updates_and_draws_nothing() {
    let mut system = ParticleSystem::new();
    assert_eq!(system.update(1. / 60.), 0);

    let mut canvas = SpriteBuffer::new();
    system.draw(&mut canvas, BlendMode::Alpha);
    assert_eq!(canvas.sprite_count(), 0);
}

#[test]
fn deregistered_emitter_is_never_touched_again() {
    let mut system = ParticleSystem::new();
    let removed = single_slot().shared();
    let kept = single_slot().shared();
    system.register(&removed).unwrap();
    system.register(&kept).unwrap();

    assert!(system.deregister(&removed));
    let unrelated = single_slot().shared();
    system.register(&unrelated).unwrap();

    system.start();
    assert_eq!(system.burst(), 2);
    system.update(0.1);

    let mut canvas = SpriteBuffer::new();
    system.draw(&mut canvas, BlendMode::Additive);
    assert_eq!(canvas.sprite_count(), 2);

    let removed = removed.borrow();
    assert!(!removed.is_emitting());
    assert_eq!(removed.active_count(), 0);
    assert_eq!(removed.particles()[0].age(), 0.);
}

#[test]
fn set_origin_only_moves_future_spawns() {
    let mut system = ParticleSystem::new();
    let emitter = single_slot().shared();
    system.register(&emitter).unwrap();

    system.burst();
    system.set_origin(vec2(50., 50.));
    system.update(0.1);
    assert_eq!(emitter.borrow().particles()[0].position(), Vec2::ZERO);

    system.update(1.);
    assert_eq!(emitter.borrow().active_count(), 0);
    system.burst();
    assert_eq!(emitter.borrow().particles()[0].position(), vec2(50., 50.));
}

#[test]
fn colors_fade_over_lifetime() {
    let mut emitter = Emitter::with_seed(
        EmitterConfig {
            capacity: 1,
            age: FloatRange::splat(4.),
            start_color: Color::rgba(255, 255, 255, 255),
            end_color: Color::rgba(255, 255, 255, 0),
            ..Default::default()
        },
        1,
    )
    .unwrap();
    emitter.burst();
    emitter.update(1.);

    let mut canvas = SpriteBuffer::new();
    emitter.draw(&mut canvas, BlendMode::Alpha);
    let instance = canvas.batches()[0].instances()[0];
    let expected_alpha = (0. - 255.) * 0.25 + 255.;
    assert_eq!(instance.color[3], (expected_alpha as u8) as f32 / 255.);
}

#[test]
fn preset_round_trip_preserves_fields_to_three_decimals() {
    let original = EmitterPreset {
        enabled: true,
        config: EmitterConfig {
            direction: vec2(0.7071, -0.7071),
            velocity: FloatRange::new(12.3456, 99.9994),
            direction_angle: FloatRange::new(-33.3333, 33.3333),
            velocity_angle: FloatRange::new(-5.5, 5.5),
            offset: FloatRange::new(0.125, 2.),
            origin_acceleration: FloatRange::new(-10., 10.),
            burst: IntRange::new(5, 17),
            capacity: 777,
            origin: vec2(123.4567, 765.4321),
            external_acceleration: vec2(0., 9.81),
            base_scale: vec2(0.5, 0.75),
            scale_increase: vec2(0.1, 0.2),
            start_color: Color::rgba(1, 2, 3, 4),
            end_color: Color::rgba(250, 251, 252, 253),
            age: FloatRange::new(0.333, 2.5),
            base_rotation: 12.5,
            rotation_speed: FloatRange::new(-180., 180.),
            texture_origin: vec2(8., 8.),
            ..Default::default()
        },
        texture_path: "textures/smoke.png".into(),
    };
    let file = PresetFile {
        emitters: vec![original.clone()],
    };

    let parsed = PresetFile::parse(&file.to_string()).unwrap();
    let back = &parsed.emitters[0];
    let (a, b) = (&original.config, &back.config);

    let close = |x: f32, y: f32| (x - y).abs() <= 5e-4;
    let close_range = |x: FloatRange, y: FloatRange| close(x.min, y.min) && close(x.max, y.max);
    let close_vec = |x: Vec2, y: Vec2| close(x.x, y.x) && close(x.y, y.y);

    assert!(back.enabled);
    assert_eq!(back.texture_path, original.texture_path);
    assert_eq!(b.burst, a.burst);
    assert_eq!(b.capacity, a.capacity);
    assert_eq!(b.start_color, a.start_color);
    assert_eq!(b.end_color, a.end_color);
    assert!(close(b.base_rotation, a.base_rotation));
    for (x, y) in [
        (a.velocity, b.velocity),
        (a.direction_angle, b.direction_angle),
        (a.velocity_angle, b.velocity_angle),
        (a.offset, b.offset),
        (a.origin_acceleration, b.origin_acceleration),
        (a.age, b.age),
        (a.rotation_speed, b.rotation_speed),
    ] {
        assert!(close_range(x, y), "{:?} != {:?}", x, y);
    }
    for (x, y) in [
        (a.direction, b.direction),
        (a.origin, b.origin),
        (a.external_acceleration, b.external_acceleration),
        (a.base_scale, b.base_scale),
        (a.scale_increase, b.scale_increase),
        (a.texture_origin, b.texture_origin),
    ] {
        assert!(close_vec(x, y), "{:?} != {:?}", x, y);
    }
}

#[test]
fn preset_files_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fire.particles");

    let mut emitter = single_slot();
    emitter.start();
    let file = PresetFile {
        emitters: vec![EmitterPreset::from_emitter(&emitter, "fire.png")],
    };
    file.save(&path).unwrap();

    let loaded = PresetFile::load(&path).unwrap();
    assert_eq!(loaded.emitters.len(), 1);
    assert_eq!(loaded.to_string(), file.to_string());

    let rebuilt = loaded.emitters[0].build_emitter().unwrap();
    assert!(rebuilt.is_emitting());
    assert_eq!(rebuilt.capacity(), 1);
}

#[test]
fn missing_preset_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PresetFile::load(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, flurry::Error::Io(_)));
}

fn arb_config() -> impl Strategy<Value = EmitterConfig> {
    (1usize..64, 0f32..500., -5i32..80, 0.01f32..3.).prop_map(
        |(capacity, emission_rate, burst_max, ttl)| EmitterConfig {
            capacity,
            emission_rate,
            burst: IntRange::new(0, burst_max),
            age: FloatRange::new(ttl * 0.5, ttl),
            direction: Vec2::X,
            velocity: FloatRange::new(0., 100.),
            ..Default::default()
        },
    )
}

proptest! {
    #[test]
    fn active_count_never_exceeds_capacity(
        config in arb_config(),
        seed in any::<u64>(),
        steps in prop::collection::vec((0f32..0.5, any::<bool>()), 1..40),
    ) {
        let capacity = config.capacity;
        let mut emitter = Emitter::with_seed(config, seed).unwrap();
        emitter.start();
        for (dt, burst) in steps {
            if burst {
                emitter.burst();
            }
            let count = emitter.update(dt);
            prop_assert!(count <= capacity);
            prop_assert!(emitter.active_count() <= count);
        }
    }

    #[test]
    fn burst_only_fills_free_slots(
        config in arb_config(),
        seed in any::<u64>(),
        warmup in 0f32..2.,
    ) {
        let mut emitter = Emitter::with_seed(config, seed).unwrap();
        emitter.start();
        emitter.update(warmup);
        emitter.stop();

        let before: Vec<_> = emitter.particles().iter().map(|p| (p.is_active(), p.age())).collect();
        let free = before.iter().filter(|(active, _)| !active).count();
        let emitted = emitter.burst();

        prop_assert!(emitted <= free);
        let burst_max = emitter.config().burst.max.max(0) as usize;
        prop_assert!(emitted <= burst_max);
        for ((was_active, age), particle) in before.iter().zip(emitter.particles()) {
            if *was_active {
                prop_assert!(particle.is_active());
                prop_assert_eq!(particle.age(), *age);
            }
        }
    }

    #[test]
    fn age_only_grows_until_respawn(
        seed in any::<u64>(),
        steps in prop::collection::vec(0f32..0.2, 1..60),
    ) {
        let mut emitter = Emitter::with_seed(
            EmitterConfig {
                capacity: 8,
                emission_rate: 30.,
                age: FloatRange::new(0.2, 1.),
                ..Default::default()
            },
            seed,
        )
        .unwrap();
        emitter.start();
        let mut previous: Vec<(bool, f32)> = vec![(false, 0.); 8];
        for dt in steps {
            emitter.update(dt);
            for (particle, (was_active, age)) in emitter.particles().iter().zip(previous.iter()) {
                if *was_active && particle.is_active() {
                    prop_assert!(particle.age() >= *age);
                }
                if particle.is_active() {
                    prop_assert!(particle.age() <= particle.time_to_live());
                }
            }
            previous = emitter.particles().iter().map(|p| (p.is_active(), p.age())).collect();
        }
    }
}
