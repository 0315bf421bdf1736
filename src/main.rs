use std::{env::args, path::Path, time::Duration, time::Instant};

use log::{debug, info};
use pretty_env_logger::formatted_builder;
use rand::{rngs::StdRng, SeedableRng};
use satornot::{
    codec,
    formula::{Assignment, Formula},
    generator::{self, GeneratorParams},
    parser::{self, parse_file},
    prelude::*,
    puzzle::{self, Guess, Puzzle},
    render::{self, render, render_assignment, AND_SYMBOL, OR_SYMBOL},
    report::Report,
    solver::Backend,
};

fn usage_string() -> String {
    format!(
        "Usage: {} <solver_name> <command>

solver_name: {}

command:
    check <file_name> - solve a DIMACS CNF file
    play [seed] - generate a puzzle and print it with its encoding
    verify <encoded_formula> <sat|unsat> - grade a guess for an encoded puzzle
    stats <n> <m> <k> [iterations] [seed] - time generation, rendering and solving",
        args().next().unwrap_or_else(|| "satornot".to_owned()),
        Backend::NAMES.join(", ")
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown solver '{}'\n\n{}", name, usage_string()))]
    UnknownSolver { name: String },
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Failed to decode puzzle"))]
    DecodeError { source: codec::Error },
    #[snafu(display("Failed to generate a puzzle"))]
    GenerateError { source: generator::GenerateError },
    #[snafu(display("Failed to render formula"))]
    RenderError { source: render::RenderError },
    #[snafu(display("Invalid guess"))]
    GuessError { source: puzzle::GuessParseError },
    #[snafu(display("Argument '{}' is not a non-negative integer", argument))]
    InvalidNumber {
        argument: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
}

fn parse_number<T>(argument: &str) -> Result<T, Error>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    argument.parse().context(InvalidNumber {
        argument: argument.to_owned(),
    })
}

fn make_rng(seed: Option<&String>) -> Result<StdRng, Error> {
    Ok(match seed {
        Some(seed) => StdRng::seed_from_u64(parse_number(seed)?),
        None => StdRng::from_entropy(),
    })
}

fn solve_path(backend: Backend, path: &Path) -> Result<Option<Assignment>, Error> {
    let formula = parse_file(path).context(ParserError)?;
    info!("Loaded {}", formula);
    Ok(backend.solve(&formula))
}

fn print_puzzle(formula: &Formula) -> Result<(), Error> {
    println!(
        "{}",
        render(formula, OR_SYMBOL, AND_SYMBOL).context(RenderError)?
    );
    println!("encoded: {}", codec::encode_formula(formula));
    Ok(())
}

#[derive(Default)]
struct Stats {
    generation: Duration,
    rendering: Duration,
    solving: Duration,
    sat_count: usize,
    example_sat: Option<Formula>,
    example_unsat: Option<Formula>,
}

fn collect_stats(
    backend: Backend,
    params: &GeneratorParams,
    iterations: usize,
    rng: &mut StdRng,
) -> Result<Stats, Error> {
    let mut stats = Stats::default();

    for _ in 0..iterations {
        let start = Instant::now();
        let formula = params.generate(rng).context(GenerateError)?;
        stats.generation += start.elapsed();

        let start = Instant::now();
        // Formulas over more than 26 variables have no display names.
        if let Err(e) = render(&formula, OR_SYMBOL, AND_SYMBOL) {
            debug!("Skipped rendering: {}", e);
        }
        stats.rendering += start.elapsed();

        let start = Instant::now();
        let model = backend.solve(&formula);
        stats.solving += start.elapsed();

        if model.is_some() {
            stats.sat_count += 1;
            stats.example_sat.get_or_insert(formula);
        } else {
            stats.example_unsat.get_or_insert(formula);
        }
    }

    Ok(stats)
}

fn print_example(label: &str, example: &Option<Formula>) {
    match example {
        Some(formula) => println!("Example {} instance: {}", label, codec::encode_formula(formula)),
        None => println!("Example {} instance: none", label),
    }
}

fn dispatch_command(backend: Backend, args: Vec<String>) -> Result<(), Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some("check") => {
            let path = args.get(1).context(MissingArgument)?;
            let result = solve_path(backend, path.as_ref())?;
            if let Some(model) = result {
                println!("SAT {}", model);
            } else {
                println!("UNSAT");
            }
        }
        Some("play") => {
            let mut rng = make_rng(args.get(1))?;
            let puzzle =
                Puzzle::generate(&GeneratorParams::default(), &mut rng).context(GenerateError)?;
            print_puzzle(puzzle.formula())?;
        }
        Some("verify") => {
            let encoded = args.get(1).context(MissingArgument)?;
            let guess = args
                .get(2)
                .context(MissingArgument)?
                .parse::<Guess>()
                .context(GuessError)?;

            let formula = codec::parse_formula(encoded).context(DecodeError)?;
            let verdict = Puzzle::from_formula(formula).check_with(backend, guess);

            println!("{}", if verdict.correct { "Correct!" } else { "WRONG" });
            match &verdict.witness {
                Some(model) => println!(
                    "is SAT with model {}",
                    render_assignment(model).context(RenderError)?
                ),
                None => println!("is UNSAT"),
            }
        }
        Some("stats") => {
            let num_variables = parse_number(args.get(1).context(MissingArgument)?)?;
            let clause_arity = parse_number(args.get(2).context(MissingArgument)?)?;
            let num_clauses = parse_number(args.get(3).context(MissingArgument)?)?;
            let iterations = match args.get(4) {
                Some(s) => parse_number(s)?,
                None => 1000,
            };
            let mut rng = make_rng(args.get(5))?;
            let params = GeneratorParams::new(num_variables, clause_arity, num_clauses);

            println!(
                "Stats for {} variables, {} variables per clause, {} clauses",
                num_variables, clause_arity, num_clauses
            );
            let stats = collect_stats(backend, &params, iterations, &mut rng)?;

            println!("Total generation time: {:.2?}", stats.generation);
            println!("Total rendering time: {:.2?}", stats.rendering);
            println!("Total solving time: {:.2?}", stats.solving);
            if iterations > 0 {
                println!(
                    "Percentage of SAT instances: {:.2}%",
                    stats.sat_count as f64 / iterations as f64 * 100.0
                );
            }
            print_example("SAT", &stats.example_sat);
            print_example("UNSAT", &stats.example_unsat);
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail()?,
        None => MissingArgument.fail()?,
    }

    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else if cfg!(debug_assertions) {
        builder.parse_filters("satornot=debug");
    } else {
        builder.parse_filters("satornot=warn");
    }

    if let Err(e) = builder.try_init() {
        eprintln!("Failed to initialize the logger: {}", e);
    }
}

fn main() -> Result<(), Report> {
    init_logger();

    let mut args = args();

    // drop arg[0]
    args.next();

    // solver name
    let solver_name = args.next();
    let remaining: Vec<_> = args.collect();

    match solver_name.as_deref() {
        Some(name) => {
            let backend = Backend::from_name(name).context(UnknownSolver { name })?;
            dispatch_command(backend, remaining)?;
        }
        None => {
            println!("{}", usage_string());
        }
    }

    Ok(())
}
