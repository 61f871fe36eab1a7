#![allow(dead_code)]

use archetype_ecs::World;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Copy)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Copy)]
struct Health(u32);

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(world))]
fn profile_spawns(world: &mut World, count: usize) {
    let _span = tracing::info_span!("spawn_loop", count = count).entered();
    for i in 0..count {
        if i % 1_000 == 0 {
            tracing::info!("spawning entity {}/{}", i, count);
        }
        world.spawn_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0), Health(100)));
    }
}

#[cfg(feature = "profiling")]
fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut world = World::new();

    println!("warming up...");
    for _ in 0..1000 {
        world.spawn_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)));
    }

    println!("profiling spawn_with with 3 components...");
    let start = Instant::now();
    profile_spawns(&mut world, 10_000);
    println!("spawned 10k entities in: {:?}", start.elapsed());
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_spawn binary requires --features profiling");
}
