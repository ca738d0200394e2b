use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reverie::generation::utils::create_rng;
use reverie::{
    Catalog, GameConfig, GameState, GenerationConfig, Generator, GrowthMapGenerator, InputFrame, RoomLayoutGenerator,
    Vector2,
};
use std::rc::Rc;

fn bench_map_growth(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let generator = GrowthMapGenerator::new(&catalog);

    c.bench_function("grow_map_default", |b| {
        b.iter(|| {
            let config = GenerationConfig::new(black_box(42));
            let mut rng = create_rng(&config);
            generator.generate(&config, &mut rng)
        })
    });

    c.bench_function("grow_map_large", |b| {
        b.iter(|| {
            let config = GenerationConfig {
                seed: black_box(42),
                grid_size: 80,
                initial_growth: 60,
            };
            let mut rng = create_rng(&config);
            generator.generate(&config, &mut rng)
        })
    });
}

fn bench_room_layout(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let config = GenerationConfig::default();
    let Ok(archetype) = catalog.archetype("4_way_pillars") else {
        return;
    };
    let generator = RoomLayoutGenerator::new(&catalog, archetype, false);
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("room_layout_4_way_pillars", |b| {
        b.iter(|| generator.generate(black_box(&config), &mut rng))
    });
}

fn bench_simulation_tick(c: &mut Criterion) {
    let config = GameConfig::default();
    let Ok(mut game_state) = GameState::from_config(config, Rc::new(Catalog::builtin())) else {
        return;
    };
    let input = InputFrame::idle(Vector2::new(1200.0, 300.0)).firing_at(Vector2::new(1200.0, 300.0));

    c.bench_function("game_state_tick", |b| b.iter(|| game_state.tick(black_box(&input))));
}

criterion_group!(benches, bench_map_growth, bench_room_layout, bench_simulation_tick);
criterion_main!(benches);
