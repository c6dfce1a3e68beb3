use std::{fs::File, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use watchsat::{
    config::{Heuristic, Phase, Restart, SolverConfig},
    io::{self, drat},
    parallel, Solution, Solver,
};

#[derive(Clone, Copy, ValueEnum)]
enum HeuristicArg {
    Evsids,
    Ordered,
}

#[derive(Clone, Copy, ValueEnum)]
enum PhaseArg {
    Negative,
    Positive,
    Saved,
}

/// CDCL solver for DIMACS CNF formulas.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input formula in DIMACS CNF
    input: PathBuf,

    /// Write a DRAT proof here (single-threaded only)
    #[arg(long, conflicts_with = "threads")]
    proof: Option<PathBuf>,

    /// Use the binary DRAT encoding
    #[arg(long, requires = "proof")]
    binary_proof: bool,

    /// Split the formula into cubes solved on this many threads
    #[arg(long)]
    threads: Option<usize>,

    /// Give up after this many conflicts
    #[arg(long)]
    conflict_limit: Option<u64>,

    #[arg(long, value_enum, default_value = "evsids")]
    heuristic: HeuristicArg,

    #[arg(long, value_enum, default_value = "saved")]
    phase: PhaseArg,

    /// Conflicts per unit of the Luby restart sequence
    #[arg(long, default_value_t = 16)]
    restart_base: usize,

    #[arg(long)]
    no_restarts: bool,

    /// Keep learned clauses as derived
    #[arg(long)]
    no_minimize: bool,
}

impl Args {
    fn config(&self) -> SolverConfig {
        SolverConfig {
            heuristic: match self.heuristic {
                HeuristicArg::Evsids => Heuristic::Evsids,
                HeuristicArg::Ordered => Heuristic::Ordered,
            },
            phase: match self.phase {
                PhaseArg::Negative => Phase::Negative,
                PhaseArg::Positive => Phase::Positive,
                PhaseArg::Saved => Phase::Saved,
            },
            restart: if self.no_restarts {
                Restart::Never
            } else {
                Restart::Luby {
                    base: self.restart_base,
                }
            },
            conflict_limit: self.conflict_limit,
            minimize: !self.no_minimize,
        }
    }
}

fn run(args: &Args) -> Result<Solution> {
    let mut input = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let formula = io::read_formula(&mut input)
        .with_context(|| format!("cannot parse {}", args.input.display()))?;
    info!(
        "read {} clauses over {} variables",
        formula.clauses.len(),
        formula.variables.len()
    );

    let config = args.config();

    if let Some(threads) = args.threads {
        return Ok(parallel::solve(formula, Some(threads), &config)?);
    }

    let Some(path) = &args.proof else {
        return Ok(Solver::with_config(formula, config).solve()?);
    };

    let mut solver = Solver::with_proof(formula, config);
    let solution = solver.solve()?;
    if let Some(proof) = solver.proof() {
        let format = if args.binary_proof {
            drat::Format::Binary
        } else {
            drat::Format::Plain
        };
        let mut file =
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        drat::write_proof(&mut file, format, proof)?;
    }
    Ok(solution)
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let solution = run(&args)?;
    io::write_solution(&mut std::io::stdout(), &solution)?;

    // SAT competition exit codes
    let code = match solution {
        Solution::Sat { .. } => 10,
        Solution::Unsat => 20,
        Solution::Unknown => 0,
    };
    Ok(ExitCode::from(code))
}
