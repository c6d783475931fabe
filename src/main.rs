#[macro_use]
extern crate log;

use std::{env::args, path::Path, time::Duration};

use pretty_env_logger::formatted_builder;
use satire_dpll::{
    parser::{self, parse_file},
    prelude::*,
    report::Report,
    solver::{BruteForceSolver, DpllSolver, Limits, Outcome, Solver},
};

fn usage_string() -> String {
    format!(
        "Usage: {} <solver_name> <command> [options]
       {0} -h | --help

solver_name: dpll, brute

command:
    check <file_name> - solve the given DIMACS CNF file

options:
    -v                  - print the variables assigned true
    --max-decisions <n> - give up after <n> decisions
    --timeout-ms <n>    - give up after <n> milliseconds",
        args().next().unwrap_or_else(|| "satire-dpll".to_owned())
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown solver '{}'\n\n{}", name, usage_string()))]
    UnknownSolver { name: String },
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Unknown option '{}'\n\n{}", name, usage_string()))]
    UnknownOption { name: String },
    #[snafu(display("Option '{}' expects a number\n\n{}", name, usage_string()))]
    InvalidOptionValue { name: String },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
}

#[derive(Debug, Default)]
struct Options {
    help: bool,
    verbose: bool,
    limits: Limits,
}

fn parse_options(args: &[String]) -> Result<Options, Error> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" => options.verbose = true,
            "-h" | "--help" => options.help = true,
            name @ "--max-decisions" | name @ "--timeout-ms" => {
                let value = iter
                    .next()
                    .and_then(|value| value.parse::<u64>().ok())
                    .context(InvalidOptionValue { name })?;
                if name == "--max-decisions" {
                    options.limits.max_decisions = Some(value);
                } else {
                    options.limits.timeout = Some(Duration::from_millis(value));
                }
            }
            name => UnknownOption { name }.fail()?,
        }
    }

    Ok(options)
}

fn solve_path<T: Solver>(path: &Path, limits: Limits) -> Result<Outcome, Error> {
    let formula = parse_file(path).context(ParserError)?;
    info!(
        "Loaded {} clauses over {} variables",
        formula.clauses().len(),
        formula.num_variables()
    );
    let solver = T::new(formula, limits);
    Ok(solver.solve())
}

fn dispatch_command<T: Solver>(args: Vec<String>) -> Result<(), Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some("-h") | Some("--help") => println!("{}", usage_string()),
        Some("check") => {
            let path = args.get(1).context(MissingArgument)?;
            let options = parse_options(&args[2..])?;
            if options.help {
                println!("{}", usage_string());
                return Ok(());
            }
            match solve_path::<T>(path.as_ref(), options.limits)? {
                Outcome::Satisfiable(model) => {
                    println!("SAT");
                    if options.verbose {
                        let ids = model
                            .true_variables()
                            .iter()
                            .map(|variable| variable.id())
                            .collect::<Vec<_>>();
                        println!("{:?}", ids);
                    }
                }
                Outcome::Unsatisfiable => println!("UNSAT"),
                Outcome::Unknown(abort) => println!("UNKNOWN ({})", abort),
            }
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
        builder.parse_filters("satire_dpll=debug");
    } else {
        builder.parse_filters("satire_dpll=warn");
    }

    if builder.try_init().is_err() {
        eprintln!("Logger is already initialized");
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
        Some("-h") | Some("--help") | None => {
            println!("{}", usage_string());
        }
        Some("dpll") => dispatch_command::<DpllSolver>(remaining)?,
        Some("brute") => dispatch_command::<BruteForceSolver>(remaining)?,
        Some(name) => UnknownSolver {
            name: name.to_owned(),
        }
        .fail()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn help_flag() {
        assert!(parse_options(&strings(&["-h"])).unwrap().help);
        assert!(parse_options(&strings(&["-v", "--help"])).unwrap().help);
        assert!(!parse_options(&strings(&["-v"])).unwrap().help);
    }

    #[test]
    fn help_needs_no_file() {
        assert!(dispatch_command::<DpllSolver>(strings(&["--help"])).is_ok());
        assert!(dispatch_command::<BruteForceSolver>(strings(&["-h"])).is_ok());
    }

    #[test]
    fn limits_from_options() {
        let options =
            parse_options(&strings(&["--max-decisions", "10", "--timeout-ms", "250"])).unwrap();
        assert_eq!(options.limits.max_decisions, Some(10));
        assert_eq!(options.limits.timeout, Some(Duration::from_millis(250)));
        assert!(matches!(
            parse_options(&strings(&["--timeout-ms"])),
            Err(Error::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            parse_options(&strings(&["-x"])),
            Err(Error::UnknownOption { .. })
        ));
    }
}
