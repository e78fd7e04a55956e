use clap::{Arg, ArgMatches, Command};
use color_eyre::eyre::Result;
use std::path::PathBuf;

mod dfa;
mod fa;
mod io;
mod minimize;
mod nfa;
mod simulate;
mod visualizer;

use fa::Fa;

fn dot_arg() -> Arg {
    Arg::new("save-dot")
        .long("save-dot")
        .value_name("DOT FILE")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Save the resulting automaton as a Graphviz dot file")
}

fn save_dot_if_requested(args: &ArgMatches, fa: &dyn Fa) -> Result<()> {
    if let Some(dot_path) = args.get_one::<PathBuf>("save-dot") {
        visualizer::save_dot(fa, dot_path)?;
    }
    Ok(())
}

fn convert(args: &ArgMatches) -> Result<()> {
    let nfa_path = args
        .get_one::<PathBuf>("nfa")
        .ok_or_else(|| color_eyre::eyre::eyre!("Error: NFA description file not provided!"))?;
    let out_path = args
        .get_one::<PathBuf>("output")
        .ok_or_else(|| color_eyre::eyre::eyre!("Error: Output DFA file not provided!"))?;

    let nfa = io::read_nfa(nfa_path)?;
    println!("{}", nfa);

    let subset_dfa = dfa::construct_dfa(&nfa);
    println!("{}", subset_dfa);

    let canonical_dfa = dfa::canonicalize(&subset_dfa);
    println!("{}", canonical_dfa);

    io::write_dfa(&canonical_dfa, out_path)?;
    save_dot_if_requested(args, &canonical_dfa)?;
    Ok(())
}

fn minimize(args: &ArgMatches) -> Result<()> {
    let dfa_path = args
        .get_one::<PathBuf>("dfa")
        .ok_or_else(|| color_eyre::eyre::eyre!("Error: DFA description file not provided!"))?;
    let out_path = args
        .get_one::<PathBuf>("output")
        .ok_or_else(|| color_eyre::eyre::eyre!("Error: Output DFA file not provided!"))?;

    let dfa = io::read_dfa(dfa_path)?;
    println!("{}", dfa);

    let minimal_dfa = minimize::construct_minimal_dfa(&dfa);
    println!("{}", minimal_dfa);

    io::write_dfa(&minimal_dfa, out_path)?;
    save_dot_if_requested(args, &minimal_dfa)?;
    Ok(())
}

fn simulate(args: &ArgMatches) -> Result<()> {
    let dfa_path = args
        .get_one::<PathBuf>("dfa")
        .ok_or_else(|| color_eyre::eyre::eyre!("Error: DFA description file not provided!"))?;
    let words_path = args
        .get_one::<PathBuf>("words")
        .ok_or_else(|| color_eyre::eyre::eyre!("Error: Words file not provided!"))?;
    let out_path = args
        .get_one::<PathBuf>("output")
        .ok_or_else(|| color_eyre::eyre::eyre!("Error: Output verdicts file not provided!"))?;

    let dfa = io::read_dfa(dfa_path)?;
    println!("{}", dfa);

    let words = io::read_words(words_path)?;
    let verdicts = simulate::simulate(&dfa, &words);
    io::write_verdicts(&verdicts, out_path)?;

    save_dot_if_requested(args, &dfa)?;
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Command::new("finaut")
        .version("1.0")
        .about("A finite automata toolkit: NFA determinization, DFA minimization and word simulation")
        .subcommand_required(true)
        .subcommand(
            Command::new("convert")
                .about("Convert an NFA description into an equivalent DFA via Subset Construction")
                .arg(
                    Arg::new("nfa")
                        .value_name("NFA FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .help("The NFA description file to determinize"),
                )
                .arg(
                    Arg::new("output")
                        .value_name("OUTPUT DFA FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .help("Where to write the resulting DFA description"),
                )
                .arg(dot_arg()),
        )
        .subcommand(
            Command::new("minimize")
                .about("Minimize a DFA description with the table-filling algorithm")
                .arg(
                    Arg::new("dfa")
                        .value_name("DFA FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .help("The DFA description file to minimize"),
                )
                .arg(
                    Arg::new("output")
                        .value_name("OUTPUT DFA FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .help("Where to write the minimal DFA description"),
                )
                .arg(dot_arg()),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run a batch of words through a DFA and record accept/reject verdicts")
                .arg(
                    Arg::new("dfa")
                        .value_name("DFA FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .help("The DFA description file to simulate"),
                )
                .arg(
                    Arg::new("words")
                        .value_name("WORDS FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .help("File with one word per line; '_' truncates a word"),
                )
                .arg(
                    Arg::new("output")
                        .value_name("OUTPUT VERDICTS FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(true)
                        .help("Where to write one verdict per word, in input order"),
                )
                .arg(dot_arg()),
        )
        .get_matches();

    match args.subcommand() {
        Some(("convert", sub_args)) => convert(sub_args),
        Some(("minimize", sub_args)) => minimize(sub_args),
        Some(("simulate", sub_args)) => simulate(sub_args),
        _ => unreachable!("subcommand is required"),
    }
}
