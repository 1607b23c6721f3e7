use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::{debug, info};

use error::Error;
use evolution::SlgaConfig;

mod agent;
mod decoding;
mod encoding;
mod error;
mod evolution;
mod files;
mod generate;
mod genetic;
mod instance;
mod parser;
mod render;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solves an .fjs instance with the self-learning genetic algorithm
    Solve {
        /// Input .fjs file describing the flexible job-shop instance
        #[arg(short, long)]
        instance: PathBuf,

        /// Directory the run writes its schedules and history into
        #[arg(short, long)]
        output: PathBuf,

        /// Random seed; drawn from OS entropy and logged when omitted
        #[arg(short, long)]
        seed: Option<u64>,

        /// Population size
        #[arg(long, default_value_t = 300)]
        pop_size: usize,

        /// Maximum number of generations
        #[arg(long, default_value_t = 200)]
        max_gen: usize,

        /// Open the rendered final schedule when the run completes
        #[arg(long)]
        open: bool,
    },
    /// Generates a random instance of the flexible job-shop problem
    Generate {
        /// Number of jobs to generate
        #[arg(short, long)]
        jobs: usize,

        /// Number of machines
        #[arg(short, long)]
        machines: usize,

        /// Minimum number of operations per job
        #[arg(long, default_value_t = 1)]
        min_ops: usize,

        /// Maximum number of operations per job
        #[arg(long, default_value_t = 5)]
        max_ops: usize,

        /// Maximum number of alternative machines per operation
        #[arg(long, default_value_t = 3)]
        max_options: usize,

        /// Minimum processing time
        #[arg(long, default_value_t = 1)]
        min_time: i32,

        /// Maximum processing time
        #[arg(long, default_value_t = 20)]
        max_time: i32,

        /// Output .fjs file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands) -> Result<(), Error> {
    match command {
        Commands::Solve {
            instance,
            output,
            seed,
            pop_size,
            max_gen,
            open,
        } => solve(instance, output, *seed, *pop_size, *max_gen, *open),
        Commands::Generate {
            jobs,
            machines,
            min_ops,
            max_ops,
            max_options,
            min_time,
            max_time,
            output,
        } => {
            assert!(*jobs >= 1, "jobs must be at least 1");
            assert!(*machines >= 1, "machines must be at least 1");
            assert!(*min_ops >= 1, "min_ops must be at least 1");
            assert!(*max_ops >= *min_ops, "max_ops must be at least min_ops");
            assert!(*max_options >= 1, "max_options must be at least 1");
            assert!(*min_time >= 0, "min_time must not be negative");
            assert!(*max_time >= *min_time, "max_time must be at least min_time");

            let generated = generate::instance(
                &mut rand::rng(),
                *jobs,
                *machines,
                *min_ops,
                *max_ops,
                *max_options,
                *min_time,
                *max_time,
            );
            parser::write_file(output, &generated)?;
            println!(
                "wrote {jobs} jobs on {machines} machines to {}",
                output.display()
            );
            Ok(())
        }
    }
}

fn solve(
    instance_path: &Path,
    output: &Path,
    seed: Option<u64>,
    pop_size: usize,
    max_gen: usize,
    open_chart: bool,
) -> Result<(), Error> {
    let instance = parser::parse_file(instance_path)?;
    instance.validate()?;
    info!(
        "loaded {} jobs with {} operations on {} machines",
        instance.jobs_count(),
        instance.total_operations(),
        instance.machines_count()
    );

    files::ensure_output_dir(output)?;

    let config = SlgaConfig {
        pop_size,
        max_gen,
        seed,
        ..SlgaConfig::default()
    };
    let stop = AtomicBool::new(false);
    let start = Instant::now();
    let outcome = evolution::run(&instance, &config, &stop);
    let total_seconds = start.elapsed().as_secs_f64();
    if let Some(peak) = outcome.q_table.iter().flatten().copied().reduce(f64::max) {
        debug!("largest learned Q-value: {peak:.4}");
    }

    let mut decoder = decoding::Decoder::new(&instance);
    let initial = decoding::translate_decoded(decoder.decode(&outcome.initial_best));
    files::write_svg(
        &output.join("initial_gantt.svg"),
        &render::render_schedule(&initial),
    )?;
    let final_gantt = decoding::translate_decoded(decoder.decode(&outcome.best));
    let final_path = output.join("final_gantt.svg");
    files::write_svg(&final_path, &render::render_schedule(&final_gantt))?;
    files::write_history(&output.join("results.csv"), &outcome.history, total_seconds)?;

    println!(
        "best makespan {} after {} generations in {total_seconds:.2}s (seed {})",
        outcome.best_time, outcome.generations, outcome.seed
    );
    if open_chart {
        open::that(final_path)?;
    }
    Ok(())
}
