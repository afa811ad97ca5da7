use chromatile::{GenerationDriver, GeneratorConfig, Supervisor};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn config_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("root")
            .long("root")
            .default_value("tiles")
            .value_parser(value_parser!(PathBuf))
            .help("Output directory for live subtrees, archives and the checkpoint"),
    )
    .arg(
        Arg::new("base")
            .long("base")
            .default_value("256")
            .value_parser(value_parser!(u32).range(1..=256))
            .help("Per-channel cardinality"),
    )
    .arg(
        Arg::new("tile-size")
            .long("tile-size")
            .default_value("256")
            .value_parser(value_parser!(u32).range(1..))
            .help("Tile edge length in pixels"),
    )
    .arg(
        Arg::new("batch-size")
            .long("batch-size")
            .default_value("2048")
            .value_parser(value_parser!(usize))
            .help("Tiles buffered in memory before a flush"),
    )
}

fn config_from(args: &ArgMatches) -> GeneratorConfig {
    GeneratorConfig::new()
        .with_output_root(args.get_one::<PathBuf>("root").unwrap().clone())
        .with_base(*args.get_one::<u32>("base").unwrap())
        .with_tile_size(*args.get_one::<u32>("tile-size").unwrap())
        .with_batch_size(*args.get_one::<usize>("batch-size").unwrap())
}

fn driver_argv(config: &GeneratorConfig) -> Vec<String> {
    let exe = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "chromatile".to_string());
    vec![
        exe,
        "generate".to_string(),
        "--root".to_string(),
        config.output_root.display().to_string(),
        "--base".to_string(),
        config.base.to_string(),
        "--tile-size".to_string(),
        config.tile_size.to_string(),
        "--batch-size".to_string(),
        config.batch_size.to_string(),
    ]
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Command::new("chromatile")
        .version(chromatile::VERSION)
        .about("Generates a PNG tile for every RGB color, in resumable batches")
        .subcommand_required(true)
        .subcommand(config_args(
            Command::new("generate").about("Run one batched generation pass and exit"),
        ))
        .subcommand(
            config_args(
                Command::new("run")
                    .about("Supervise generation passes until the space is complete"),
            )
            .arg(
                Arg::new("delay-ms")
                    .long("delay-ms")
                    .default_value("1000")
                    .value_parser(value_parser!(u64))
                    .help("Pause between generation passes in milliseconds"),
            ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("generate", args)) => {
            let config = config_from(args);
            let driver = GenerationDriver::new(config);
            match driver.run() {
                Ok(outcome) => std::process::exit(outcome.exit_code()),
                Err(e) => {
                    tracing::error!("generation pass failed: {e}");
                    std::process::exit(e.exit_code());
                }
            }
        }
        Some(("run", args)) => {
            let delay = Duration::from_millis(*args.get_one::<u64>("delay-ms").unwrap());
            let config = config_from(args).with_restart_delay(delay);
            let driver = driver_argv(&config);
            let supervisor = Supervisor::new(config, driver);
            if let Err(e) = supervisor.run() {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        }
        _ => {}
    }
}
