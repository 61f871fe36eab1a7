use archetype_ecs::World;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Debug, Clone, Copy)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Copy)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Copy)]
struct Health(u32);

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("spawn_with_2_components", |b| {
        let mut world = World::new();
        b.iter(|| {
            for _ in 0..1000 {
                black_box(world.spawn_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0))));
            }
        });
    });

    group.bench_function("spawn_with_3_components", |b| {
        let mut world = World::new();
        b.iter(|| {
            for _ in 0..1000 {
                black_box(world.spawn_with((
                    Position(1.0, 2.0, 3.0),
                    Velocity(1.0, 0.0, 0.0),
                    Health(100),
                )));
            }
        });
    });

    group.bench_function("incremental_set_3_components", |b| {
        let mut world = World::new();
        b.iter(|| {
            for _ in 0..1000 {
                let e = world.spawn();
                world.set(e, Position(1.0, 2.0, 3.0));
                world.set(e, Velocity(1.0, 0.0, 0.0));
                black_box(world.set(e, Health(100)));
            }
        });
    });

    group.finish();
}

fn dispatch_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    group.bench_function("for_each_over_10k_matching_entities", |b| {
        let mut world = World::new();
        for _ in 0..10_000 {
            world.spawn_with((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)));
        }

        b.iter(|| {
            world.for_each::<(Position, Velocity)>(|cols, _entities, rows| {
                if let (Some(pos), Some(vel)) = (cols.field::<Position>(), cols.field::<Velocity>()) {
                    for i in 0..rows {
                        black_box((pos[i].0 + vel[i].0, pos[i].1 + vel[i].1, pos[i].2 + vel[i].2));
                    }
                }
            });
        });
    });

    group.finish();
}

criterion_group!(benches, spawn_benchmark, dispatch_benchmark);
criterion_main!(benches);
