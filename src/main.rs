
use torus_life::{
    config::{Config, BASE_INTERVAL, DEFAULT_COLS, DEFAULT_ROWS},
    draw::{self, App, Files},
    patterns,
    sim::Controller,
};

use clap::Parser;
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

/// Conway's Game of Life on a wrap-around grid
#[derive(Parser, Debug)]
#[command(name = "torus-life")]
#[command(about = "Conway's Game of Life on a wrap-around grid", long_about = None)]
struct Args {
    /// Number of rows
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Number of columns
    #[arg(long, default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Milliseconds between generations at speed 1
    #[arg(
        short,
        long,
        default_value_t = BASE_INTERVAL.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval_ms: u64,

    /// Initial speed (1-4)
    #[arg(short, long, default_value_t = 1)]
    speed: u8,

    /// Grid file to start from
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Where the save key writes (defaults to the load path, then life.txt)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Seed pattern when no file is loaded (gosper, glider, blinker, block, empty)
    #[arg(short, long, default_value = "gosper")]
    pattern: String,

    /// Write logs to this file (filtered by RUST_LOG, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let pattern = patterns::find(&args.pattern)
        .ok_or_else(|| format!("unknown pattern {:?}", args.pattern))?;

    let config = Config {
        rows: args.rows,
        cols: args.cols,
        base_interval: Duration::from_millis(args.interval_ms),
        speed: args.speed,
    };
    let mut c = Controller::new(config)?;

    let loaded = match &args.load {
        Some(path) => match c.load(path) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("could not load {}: {e}", path.display());
                false
            }
        },
        None => false,
    };
    if !loaded {
        patterns::apply(c.grid_mut(), pattern);
    }

    let save = args
        .save
        .or_else(|| args.load.clone())
        .unwrap_or_else(|| PathBuf::from("life.txt"));
    draw::run(App::new(c, Files { load: args.load, save }))?;
    Ok(())
}

fn init_logging(path: Option<&Path>) -> std::io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Args::try_parse_from(["torus-life", "--interval-ms", "0"]).is_err());
        let args = Args::try_parse_from(["torus-life", "--interval-ms", "1"]).unwrap();
        assert_eq!(args.interval_ms, 1);
    }

    #[test]
    fn defaults_match_config() {
        let args = Args::try_parse_from(["torus-life"]).unwrap();
        assert_eq!((args.rows, args.cols), (DEFAULT_ROWS, DEFAULT_COLS));
        assert_eq!(Duration::from_millis(args.interval_ms), BASE_INTERVAL);
    }
}
