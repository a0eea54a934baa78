//! Benchmark for corpus aggregation, designed to mirror the Python workflow.
//!
//! `analyze_games()` in Python hands a list of PGN strings to `analyze_pgns`,
//! which loads, replays and aggregates every game on a rayon pool. This
//! benchmark times that call on a corpus read from `PIECE_HEATMAP_PGN`
//! (default `games.pgn`), falling back to a small built-in corpus, and then
//! runs criterion over single-game replay and threat classification.

use criterion::Criterion;
use std::fs;
use std::hint::black_box;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use piece_heatmap::{
    analyze_game, analyze_pgns, load_game, parse_selector, AnalysisConfig, GameFilter,
};

const DEFAULT_PATH: &str = "games.pgn";

const BUILTIN: &[&str] = &[
    "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 6. Re1 b5 7. Bb3 d6 8. c3 O-O *",
    "1. d4 Nf6 2. c4 e6 3. Nc3 Bb4 4. e3 O-O 5. Bd3 d5 6. Nf3 c5 7. O-O dxc4 8. Bxc4 *",
    "1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 a6 6. Be3 e5 7. Nb3 Be6 8. f3 *",
    "1. e4 d5 2. exd5 Qxd5 3. Nc3 Qa5 4. d4 Nf6 5. Nf3 Bf5 6. Bc4 e6 7. Bd2 c6 *",
    "1. e4 a6 2. e5 d5 3. exd6 cxd6 4. d4 Nf6 5. Nf3 g6 6. Bd3 Bg7 7. O-O O-O *",
];

/// Split a multi-game PGN file on its `[Event` tags.
fn read_corpus(path: &str) -> Vec<String> {
    let Ok(content) = fs::read_to_string(path) else {
        println!("{} not found, using built-in corpus.", path);
        return BUILTIN
            .iter()
            .cycle()
            .take(BUILTIN.len() * 2000)
            .map(|s| s.to_string())
            .collect();
    };
    content
        .split("\n[Event ")
        .filter(|game| !game.trim().is_empty())
        .map(|game| {
            if game.starts_with("[Event ") {
                game.to_string()
            } else {
                format!("[Event {}", game)
            }
        })
        .collect()
}

/// Time the whole corpus the way `analyze_games()` runs it.
pub fn bench_corpus(pgns: &[String]) {
    let filter = parse_selector("white knight").expect("Invalid selector");
    let config = AnalysisConfig::default();

    let start = Instant::now();
    let totals = analyze_pgns(pgns, &filter, &config).expect("Analysis failed");
    let duration = start.elapsed();

    println!("Analysis time: {:?}", duration);
    println!(
        "Analyzed {} games, skipped {}, {} visits.",
        totals.games,
        totals.skipped,
        totals.occupancy.total()
    );
}

/// Per-game cost of replay plus threat classification.
pub fn bench_single_game(c: &mut Criterion) {
    let record = load_game(BUILTIN[0], &GameFilter::default())
        .expect("Invalid PGN")
        .expect("Game filtered out");
    let knights = parse_selector("white knight").expect("Invalid selector");
    let pawns = parse_selector("white pawn").expect("Invalid selector");

    c.bench_function("analyze_game knights", |b| {
        b.iter(|| analyze_game(black_box(&record), black_box(&knights)))
    });
    c.bench_function("analyze_game pawns", |b| {
        b.iter(|| analyze_game(black_box(&record), black_box(&pawns)))
    });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let path = std::env::var("PIECE_HEATMAP_PGN").unwrap_or_else(|_| DEFAULT_PATH.to_string());
    let pgns = read_corpus(&path);
    println!("Read {} games.", pgns.len());

    println!("=== Corpus (analyze_pgns) ===\n");
    bench_corpus(&pgns);

    println!("\n=== Single game (criterion) ===\n");
    let mut criterion = Criterion::default().configure_from_args();
    bench_single_game(&mut criterion);
    criterion.final_summary();
}
