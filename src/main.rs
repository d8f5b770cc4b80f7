use std::{fs, io::Read, process};

use clap::{App, Arg};
use ll1_helper::Grammar;
use log::{error, LevelFilter};

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Builds LL(1) parsing tables and runs a predictive parser.")
        .arg(
            Arg::with_name("outputs")
                .help("What to print")
                .multiple(true)
                .possible_values(&["prod", "ff", "ll1", "conflicts"]),
        )
        .arg(
            Arg::with_name("grammar")
                .short("g")
                .long("grammar")
                .value_name("FILE")
                .help("Grammar file, one rule per line (reads stdin if absent)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("parse")
                .short("p")
                .long("parse")
                .value_name("INPUT")
                .help("Parse a string with the generated table")
                .multiple(true)
                .takes_value(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("latex")
                .short("l")
                .help("Print in LaTeX format")
                .conflicts_with("json"),
        )
        .arg(Arg::with_name("json").short("j").help("Print in JSON format"))
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .get_matches();

    // Configure the logger.
    let level = match matches.occurrences_of("verbosity") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_default())
        .init();

    let output_format = if matches.is_present("latex") {
        OutputFormat::LaTeX
    } else if matches.is_present("json") {
        OutputFormat::JSON
    } else {
        OutputFormat::Plain
    };

    let input = match matches.value_of("grammar") {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input).map(|_| input)
        }
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => {
            error!("failed to read grammar: {}", e);
            process::exit(1);
        }
    };

    let analysis = match Grammar::parse(&input) {
        Ok(g) => g.analyze(),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    for output in matches.values_of("outputs").into_iter().flatten() {
        let text = match output {
            "prod" => {
                let t = analysis.grammar.to_production_output_vec();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json(),
                }
            }
            "ff" => {
                let t = analysis.to_non_terminal_output_vec();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json(),
                }
            }
            "ll1" => {
                let t = analysis.table.to_output();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json(),
                }
            }
            _ => analysis
                .conflicts()
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        println!("{}", text);
    }

    let mut rejected = false;
    for input in matches.values_of("parse").into_iter().flatten() {
        let input = input.trim();
        let result = analysis.table.parse(input);
        rejected |= !result.is_success();
        let t = result.to_output(input);
        println!(
            "{}",
            match output_format {
                OutputFormat::JSON => t.to_json(),
                OutputFormat::Plain | OutputFormat::LaTeX => t.to_plaintext(),
            }
        );
    }

    if rejected {
        process::exit(1);
    }
}
