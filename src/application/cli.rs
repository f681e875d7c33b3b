use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::application::terminal::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::infrastructure::archive::ArchiveExtractor;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn log_path() -> path::PathBuf {
    if let Ok(log_dir) = std::env::var("CODEVA_LOG_DIR") {
        return path::PathBuf::from(log_dir).join("debug.log");
    }

    return dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("codeva/debug.log");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn print_archive_files() -> Result<()> {
    let archive = Config::get(ConfigKey::Archive);
    let files = ArchiveExtractor::default()
        .extract_file(path::Path::new(&archive))
        .await?;

    if files.is_empty() {
        println!("The archive has no files that would be submitted.");
        return Ok(());
    }

    for file in files {
        println!("{} {}", file.path, Paint::new(format!("({} bytes)", file.content.len())).dimmed());
    }

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    let mut cmd = Command::new("debug");
    cmd = cmd.about("Debug helpers for CodEva")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running CodEva with environment variable RUST_LOG=codeva")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );

    return cmd;
}

fn arg_archive() -> Arg {
    return Arg::new(ConfigKey::Archive.to_string())
        .short('a')
        .long(ConfigKey::Archive.to_string())
        .env("CODEVA_ARCHIVE")
        .num_args(1)
        .help("Path to the ZIP archive of the code to be quizzed on.");
}

fn arg_backend() -> Arg {
    return Arg::new(ConfigKey::Backend.to_string())
        .short('b')
        .long(ConfigKey::Backend.to_string())
        .env("CODEVA_BACKEND")
        .num_args(1)
        .help(format!(
            "The backend hosting the model that writes the questions. [default: {}]",
            Config::default(ConfigKey::Backend)
        ))
        .value_parser(PossibleValuesParser::new(BackendName::VARIANTS));
}

fn arg_backend_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
        .long(ConfigKey::BackendHealthCheckTimeout.to_string())
        .env("CODEVA_BACKEND_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)),
        );
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("CODEVA_MODEL")
        .num_args(1)
        .help(format!(
            "The model on the backend to generate questions with. Must support structured outputs. Defaults to {} for OpenAI and {} for Ollama.",
            BackendName::OpenAI.default_model(),
            BackendName::Ollama.default_model()
        ));
}

fn arg_number(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(format!("{help} [default: {}]", Config::default(key)))
        .global(true);
}

fn subcommand_quiz() -> Command {
    return Command::new("quiz")
        .about("Start a quiz on the code in an archive. Runs by default when an archive is passed.")
        .arg(arg_archive().required(true))
        .arg(arg_backend())
        .arg(arg_backend_health_check_timeout())
        .arg(arg_model());
}

fn subcommand_files() -> Command {
    return Command::new("files")
        .about("List the files in an archive that would be submitted for a quiz.")
        .arg(arg_archive().required(true));
}

pub fn build() -> Command {
    let controls_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("CONTROLS:") {
                return Paint::new(format!("QUIZ {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("codeva")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(controls_text)
        .arg_required_else_help(true)
        .subcommand(subcommand_quiz())
        .subcommand(subcommand_files())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(arg_archive())
        .arg(arg_backend())
        .arg(arg_backend_health_check_timeout())
        .arg(arg_model())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CODEVA_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::OllamaURL.to_string())
                .long(ConfigKey::OllamaURL.to_string())
                .env("CODEVA_OLLAMA_URL")
                .num_args(1)
                .help(format!("Ollama API URL when using the Ollama backend. [default: {}]", Config::default(ConfigKey::OllamaURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiURL.to_string())
                .long(ConfigKey::OpenAiURL.to_string())
                .env("CODEVA_OPENAI_URL")
                .num_args(1)
                .help(format!("OpenAI API URL when using the OpenAI backend. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::OpenAiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiToken.to_string())
                .long(ConfigKey::OpenAiToken.to_string())
                .env("CODEVA_OPENAI_TOKEN")
                .num_args(1)
                .help("OpenAI API token when using the OpenAI backend.")
                .global(true),
        )
        .arg(arg_number(
            ConfigKey::Rounds,
            "CODEVA_ROUNDS",
            "Number of questions in a quiz.",
        ))
        .arg(arg_number(
            ConfigKey::RoundsEasy,
            "CODEVA_ROUNDS_EASY",
            "How many of the questions are easy. Easy, medium and hard must add up to rounds.",
        ))
        .arg(arg_number(
            ConfigKey::RoundsMedium,
            "CODEVA_ROUNDS_MEDIUM",
            "How many of the questions are medium difficulty.",
        ))
        .arg(arg_number(
            ConfigKey::RoundsHard,
            "CODEVA_ROUNDS_HARD",
            "How many of the questions are hard.",
        ))
        .arg(arg_number(
            ConfigKey::QuestionTimeout,
            "CODEVA_QUESTION_TIMEOUT",
            "Seconds to answer each question before it is submitted without an answer.",
        ))
        .arg(arg_number(
            ConfigKey::MaxArchiveSize,
            "CODEVA_MAX_ARCHIVE_SIZE",
            "Largest archive in bytes, compressed or extracted, that will be read.",
        ));
}

async fn load_archive_config(matches: &ArgMatches, subcmd_matches: &ArgMatches) -> Result<()> {
    Config::load(build(), vec![matches, subcmd_matches]).await?;
    if Config::get(ConfigKey::Archive).is_empty() {
        bail!("An archive is required, pass one with --archive");
    }

    return Ok(());
}

/// Parses arguments and loads config. Returns true when a quiz should be run.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_path().to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("quiz", subcmd_matches)) => {
            load_archive_config(&matches, subcmd_matches).await?;
        }
        Some(("files", subcmd_matches)) => {
            load_archive_config(&matches, subcmd_matches).await?;
            print_archive_files().await?;
            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        _ => {
            load_archive_config(&matches, &matches).await?;
        }
    }

    return Ok(true);
}
