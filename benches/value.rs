use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use threes_ai::agent::ntuple::NTupleSlider;
use threes_ai::agent::random::RandomPlacer;
use threes_ai::agent::Agent;
use threes_ai::board::Board;

fn corpus() -> Vec<Board> {
    let mut placer = RandomPlacer::new("seed=1337").unwrap();
    let mut boards = Vec::new();
    let mut board = Board::EMPTY;
    for _ in 0..12 {
        let action = placer.take_action(&board);
        if action.apply(&mut board) == -1 {
            break;
        }
        boards.push(board);
    }
    boards
}

fn bench_value(c: &mut Criterion) {
    let slider = NTupleSlider::new("").unwrap();
    let boards = corpus();
    c.bench_function("ntuple/value", |bch| {
        bch.iter(|| {
            let mut acc = 0f32;
            for bd in &boards {
                acc += slider.value(bd);
            }
            black_box(acc)
        })
    });
}

fn bench_take_action(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("ntuple/take_action", |bch| {
        let mut slider = NTupleSlider::new("alpha=0.0025").unwrap();
        bch.iter(|| {
            slider.open_episode("");
            for bd in &boards {
                black_box(slider.take_action(bd));
            }
            slider.close_episode("");
        })
    });
}

criterion_group!(value, bench_value, bench_take_action);
criterion_main!(value);
