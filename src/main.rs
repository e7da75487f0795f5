use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use aoc2020::seating::{self, Grid, Rules};

#[derive(Debug, Parser)]
#[command(about = "Advent of Code 2020")]
struct Args {
    /// Day number
    #[arg(value_parser = clap::value_parser!(u8).range(1..=25))]
    day: u8,

    /// Puzzle part, 1 or 2
    #[arg(value_parser = clap::value_parser!(u8).range(1..=2))]
    part: u8,

    /// Read day<DAY>test<N>.in instead of day<DAY>.in
    #[arg(short, long)]
    test: Option<u32>,

    /// Input file, overrides the default file name
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Give up if the seat layout is still changing after this many rounds
    #[arg(long, default_value_t = seating::DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// Print the final seat layout to stderr
    #[arg(long)]
    show: bool,
}

impl Args {
    fn input_path(&self) -> PathBuf {
        match (&self.input, self.test) {
            (Some(path), _) => path.clone(),
            (None, Some(test)) => format!("day{}test{}.in", self.day, test).into(),
            (None, None) => format!("day{}.in", self.day).into(),
        }
    }
}

type Solution = fn(&Args, &str) -> Result<String>;

fn day11(args: &Args, input: &str) -> Result<String> {
    let rules = if args.part == 1 {Rules::ADJACENT} else {Rules::LINE_OF_SIGHT};
    let layout: Grid = input.parse()?;
    let stable = seating::stabilize(layout, rules, args.max_rounds)?;
    if args.show {
        eprintln!("{}", stable.grid);
    }
    Ok(stable.grid.count_occupied().to_string())
}

fn solution(day: u8) -> Option<Solution> {
    match day {
        11 => Some(day11),
        _ => None,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let Some(solve) = solution(args.day) else {
        bail!("no solution available for day {}", args.day)
    };
    let path = args.input_path();
    let input = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read input file {}", path.display()))?;

    let time = Instant::now();
    let answer = solve(&args, &input)
        .with_context(|| format!("day {} part {} failed on {}", args.day, args.part, path.display()))?;
    println!("{}", answer);
    println!("{} seconds elapsed", time.elapsed().as_secs_f32());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const EXAMPLE: &str = include_str!("../day11test1.in");

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("aoc2020").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn input_file_names() {
        assert_eq!(args(&["11", "1"]).input_path(), PathBuf::from("day11.in"));
        assert_eq!(args(&["11", "2", "--test", "1"]).input_path(), PathBuf::from("day11test1.in"));
        assert_eq!(args(&["11", "1", "-t", "3", "-i", "seats.txt"]).input_path(), PathBuf::from("seats.txt"));
    }

    #[test]
    fn rejects_bad_parts_and_days() {
        assert!(Args::try_parse_from(["aoc2020", "11", "3"]).is_err());
        assert!(Args::try_parse_from(["aoc2020", "0", "1"]).is_err());
        assert!(Args::try_parse_from(["aoc2020", "26", "1"]).is_err());
    }

    #[test]
    fn only_day11_is_solved() {
        assert!(solution(11).is_some());
        assert!(solution(1).is_none());
        assert!(solution(12).is_none());
    }

    #[test]
    fn day11_example() {
        assert_eq!(day11(&args(&["11", "1"]), EXAMPLE).unwrap(), "37");
        assert_eq!(day11(&args(&["11", "2"]), EXAMPLE).unwrap(), "26");
    }

    #[test]
    fn day11_reports_bad_input_and_round_cap() {
        let err = day11(&args(&["11", "1"]), "L.L\nL?L\n").unwrap_err();
        assert_eq!(err.to_string(), "unexpected character '?' at line 2, column 2");

        let err = day11(&args(&["11", "1", "--max-rounds", "2"]), EXAMPLE).unwrap_err();
        assert_eq!(err.to_string(), "seat layout did not stabilize within 2 rounds");
    }
}
