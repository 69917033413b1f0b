//! Criterion benchmarks for flat-log replay and undo.
//!
//! Run with:
//!     cargo bench --bench replay

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use dart_match_engine::engine::arena::{generate_match, make_players};
use dart_match_engine::engine::config::{CricketConfig, CricketMode, GameConfig, KillerConfig, X01Config};
use dart_match_engine::engine::models::StoredThrow;
use dart_match_engine::{replay_from_flat_throw_log, undo};

struct Fixture {
    label: &'static str,
    config: GameConfig,
    log: Vec<StoredThrow>,
}

fn fixtures() -> Vec<Fixture> {
    let players = make_players(4);
    let configs = [
        ("x01_501", GameConfig::X01(X01Config::default())),
        ("cricket", GameConfig::Cricket(CricketConfig::default())),
        (
            "cricket_cut_throat",
            GameConfig::Cricket(CricketConfig {
                mode: CricketMode::CutThroat,
                ..CricketConfig::default()
            }),
        ),
        ("killer", GameConfig::Killer(KillerConfig::default())),
    ];
    configs
        .into_iter()
        .map(|(label, config)| {
            let (log, _) = generate_match(&config, &players, 1234, 40)
                .unwrap_or_else(|e| panic!("failed to generate {label}: {e}"));
            Fixture { label, config, log }
        })
        .collect()
}

fn bench_replay(c: &mut Criterion) {
    let players = make_players(4);
    let mut group = c.benchmark_group("replay_from_flat_throw_log");
    for fixture in fixtures() {
        group.bench_with_input(
            BenchmarkId::new(fixture.label, fixture.log.len()),
            &fixture,
            |b, f| {
                b.iter(|| replay_from_flat_throw_log(&f.log, f.config.clone(), &players).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_undo_all(c: &mut Criterion) {
    let players = make_players(4);
    let mut group = c.benchmark_group("undo_all");
    for fixture in fixtures() {
        let replayed = replay_from_flat_throw_log(&fixture.log, fixture.config.clone(), &players).unwrap();
        group.bench_function(fixture.label, |b| {
            b.iter(|| {
                let mut state = replayed.clone();
                for _ in 0..fixture.log.len() {
                    state = undo(state).unwrap();
                }
                state
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_replay, bench_undo_all);
criterion_main!(benches);
