use clap::{App, Arg};
use std::path::Path;
use wordhord::build::build_site;
use wordhord::config::Config;

fn main() {
    env_logger::init();

    let matches = App::new("wordhord")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a localized portfolio-and-blog static site")
        .arg(
            Arg::with_name("source")
                .help("The project directory (searched upward for wordhord.yaml)")
                .default_value("."),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .required(true)
                .help("The output directory"),
        )
        .arg(
            Arg::with_name("threads")
                .short("j")
                .long("threads")
                .takes_value(true)
                .help("Content-parse worker count (defaults to the CPU count)"),
        )
        .get_matches();

    // both arguments have defaults or are required, so the values are
    // always present
    let source = matches.value_of("source").unwrap();
    let output = matches.value_of("output").unwrap();
    let threads = match matches.value_of("threads").map(str::parse) {
        None => None,
        Some(Ok(threads)) => Some(threads),
        Some(Err(e)) => {
            eprintln!("wordhord: invalid --threads value: {}", e);
            std::process::exit(2);
        }
    };

    let config =
        match Config::from_directory(Path::new(source), Path::new(output), threads) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("wordhord: {}", e);
                std::process::exit(1);
            }
        };

    if let Err(e) = build_site(&config) {
        eprintln!("wordhord: {}", e);
        std::process::exit(1);
    }
}
