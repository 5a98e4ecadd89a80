//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::Settings;

/// Generate a random demo phylogenetic tree (Newick) and matching sample metadata (CSV)
#[derive(Parser, Debug)]
#[command(name = "phylodemo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Log verbosity on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file (default: ./.phylodemo.toml if present)
    #[arg(short = 'c', long = "config", global = true, value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub generate: GenerateArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Generation options; unset options fall back to config, then defaults.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Number of samples, at least 2 (default: 24)
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub samples: Option<i64>,

    /// Force an ultrametric tree (all leaves equidistant from the root)
    #[arg(short, long, visible_alias = "ultrameric")]
    pub ultrametric: bool,

    /// Random seed for reproducible output (any integer)
    #[arg(short, long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Output Newick file (default: demo_tree.nwk)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub tree_out: Option<PathBuf>,

    /// Output metadata CSV file (default: demo_metadata.csv)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub metadata_out: Option<PathBuf>,

    /// Also print the generated tree to stdout
    #[arg(long)]
    pub print_tree: bool,
}

impl GenerateArgs {
    /// Apply flags given on the command line on top of loaded settings.
    pub fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(samples) = self.samples {
            settings.samples = samples;
        }
        if self.ultrametric {
            settings.ultrametric = true;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(path) = &self.tree_out {
            settings.tree_out = path.clone();
        }
        if let Some(path) = &self.metadata_out {
            settings.metadata_out = path.clone();
        }
        settings
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show,

    /// Show config paths
    Path,

    /// Print config template
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_no_args_when_parsing_then_generates_with_defaults() {
        let cli = Cli::try_parse_from(["phylodemo"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.generate, GenerateArgs::default());
        assert_eq!(cli.generate.apply_to(Settings::default()), Settings::default());
    }

    #[test]
    fn given_all_flags_when_parsing_then_override_settings() {
        let cli = Cli::try_parse_from([
            "phylodemo",
            "--samples",
            "5",
            "--ultrametric",
            "--seed",
            "42",
            "--tree-out",
            "t.nwk",
            "--metadata-out",
            "m.csv",
            "-dd",
        ])
        .unwrap();
        let settings = cli.generate.apply_to(Settings::default());

        assert_eq!(cli.debug, 2);
        assert_eq!(settings.samples, 5);
        assert!(settings.ultrametric);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.tree_out, PathBuf::from("t.nwk"));
        assert_eq!(settings.metadata_out, PathBuf::from("m.csv"));
    }

    #[test]
    fn given_legacy_spelling_when_parsing_then_sets_ultrametric() {
        let cli = Cli::try_parse_from(["phylodemo", "--ultrameric"]).unwrap();
        assert!(cli.generate.ultrametric);
    }

    #[test]
    fn given_negative_values_when_parsing_then_accepted_as_numbers() {
        let cli = Cli::try_parse_from(["phylodemo", "--samples", "-3", "--seed", "-5"]).unwrap();
        assert_eq!(cli.generate.samples, Some(-3));
        assert_eq!(cli.generate.seed, Some(-5));

        let cli = Cli::try_parse_from(["phylodemo", "--samples=-3", "-s", "-5"]).unwrap();
        assert_eq!(cli.generate.samples, Some(-3));
        assert_eq!(cli.generate.seed, Some(-5));
    }

    #[test]
    fn given_config_subcommand_when_parsing_then_dispatches() {
        let cli = Cli::try_parse_from(["phylodemo", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommands::Show
            })
        ));
    }
}
