use std::time::Instant;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use threes_ai::agent::heuristic::MergeScanSlider;
use threes_ai::agent::ntuple::NTupleSlider;
use threes_ai::agent::random::{RandomPlacer, RandomSlider};
use threes_ai::agent::Agent;
use threes_ai::board::Board;
use threes_ai::episode::{self, EpisodeResult};

#[derive(Debug, Parser)]
#[command(name = "threes-ai", about = "Threes! episode runner and trainer")]
struct Args {
    /// Number of episodes to play
    #[arg(long, default_value_t = 1000)]
    total: u32,

    /// Print block statistics every this many episodes
    #[arg(long, default_value_t = 100)]
    block: u32,

    /// Which slider plays the episodes
    #[arg(long, value_enum, default_value_t = SliderKind::Ntuple)]
    slider: SliderKind,

    /// Slider agent arguments, e.g. "init=65536,65536 alpha=0.0025 save=w.bin"
    #[arg(long, default_value = "")]
    play: String,

    /// Placer agent arguments, e.g. "seed=42"
    #[arg(long, default_value = "")]
    evil: String,

    /// Suppress the progress spinner
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SliderKind {
    Ntuple,
    Heuristic,
    Random,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut placer = RandomPlacer::new(&args.evil)?;
    match args.slider {
        SliderKind::Ntuple => {
            let mut slider = NTupleSlider::new(&args.play)?;
            if slider.encoding_count() == 0 {
                eprintln!(
                    "warning: the line encodings do not fit the configured tables; \
                     the value function is constant zero"
                );
            }
            run_episodes(&mut placer, &mut slider, &args);
            slider.save_weights()?;
        }
        SliderKind::Heuristic => {
            let mut slider = MergeScanSlider::new(&args.play);
            run_episodes(&mut placer, &mut slider, &args);
        }
        SliderKind::Random => {
            let mut slider = RandomSlider::new(&args.play)?;
            run_episodes(&mut placer, &mut slider, &args);
        }
    }
    Ok(())
}

fn run_episodes(placer: &mut dyn Agent, slider: &mut dyn Agent, args: &Args) {
    let start = Instant::now();
    let pb = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(args.total as u64);
        let style = ProgressStyle::with_template(
            "{bar:32} {pos}/{len} episodes | {elapsed_precise} | {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    };

    let mut block = BlockStats::default();
    let mut total_moves = 0u64;

    for episode_idx in 1..=args.total {
        let result = episode::run(placer, slider);
        block.record(result);
        total_moves += result.moves as u64;

        if let Some(pb) = &pb {
            pb.inc(1);
            let elapsed = start.elapsed().as_secs_f64().max(1e-6);
            pb.set_message(format!(
                "moves/sec: {:.0} | avg score: {:.1}",
                total_moves as f64 / elapsed,
                block.mean_score()
            ));
        }

        if args.block > 0 && episode_idx % args.block == 0 {
            if let Some(pb) = &pb {
                pb.suspend(|| block.print(episode_idx));
            } else {
                block.print(episode_idx);
            }
            block = BlockStats::default();
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let elapsed = start.elapsed().as_secs_f64().max(1e-6);
    println!(
        "{} episodes | moves/sec: {:.0} | slider: {}",
        args.total,
        total_moves as f64 / elapsed,
        slider.name()
    );
}

/// Rolling statistics over one reporting block of episodes.
#[derive(Default)]
struct BlockStats {
    episodes: u32,
    score_sum: u64,
    score_max: u64,
    moves_sum: u64,
    highest_rank: u8,
}

impl BlockStats {
    fn record(&mut self, result: EpisodeResult) {
        self.episodes += 1;
        self.score_sum += result.score;
        self.score_max = self.score_max.max(result.score);
        self.moves_sum += result.moves as u64;
        self.highest_rank = self.highest_rank.max(result.highest_rank);
    }

    fn mean_score(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.score_sum as f64 / self.episodes as f64
        }
    }

    fn print(&self, through: u32) {
        println!(
            "{:6} | avg = {:.1} | max = {} | moves = {:.1} | best tile = {}",
            through,
            self.mean_score(),
            self.score_max,
            self.moves_sum as f64 / self.episodes.max(1) as f64,
            Board::tile_value(self.highest_rank)
        );
    }
}
