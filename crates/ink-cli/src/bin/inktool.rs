use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ink_cli::commands::{config_ops, dict_ops, replay_ops};

#[derive(Parser)]
#[command(name = "inktool", about = "Trace input engine tools")]
struct Cli {
    /// Write a JSON-lines trace log into this directory (requires --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Word dictionary tools
    Dict {
        #[command(subcommand)]
        action: DictAction,
    },
    /// Replay a JSON session script and print host events as JSON lines
    Replay {
        /// Script file
        script_file: String,
        /// Settings TOML to use instead of the defaults
        #[arg(long)]
        settings: Option<String>,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

#[derive(Subcommand)]
enum DictAction {
    /// Compile a word list (word<TAB>frequency per line) into a binary dictionary
    Build {
        /// Input word list
        input_txt: String,
        /// Output file
        output_file: String,
    },
    /// Show word count and most frequent words
    Info {
        /// Dictionary file (binary or word list)
        file: String,
    },
    /// List completions for a prefix
    Predict {
        /// Dictionary file (binary or word list)
        file: String,
        /// Word prefix
        prefix: String,
        /// Number of completions
        #[arg(short, long, default_value = "10")]
        n: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Some(dir) = &cli.trace_dir {
        ink_engine::trace_init::init_tracing(dir);
    }

    match cli.command {
        Command::Dict { action } => match action {
            DictAction::Build {
                input_txt,
                output_file,
            } => dict_ops::build(&input_txt, &output_file),
            DictAction::Info { file } => dict_ops::info(&file),
            DictAction::Predict { file, prefix, n } => dict_ops::predict(&file, &prefix, n),
        },
        Command::Replay {
            script_file,
            settings,
        } => replay_ops::replay_cmd(&script_file, settings.as_deref()),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
