//! Command dispatch: generation (default), config and completion

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::render::tree_preview;
use crate::application::services::{GenerationRequest, GeneratorService};
use crate::cli::args::{Cli, Commands, ConfigCommands, GenerateArgs};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::traits::RealFileSystem;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        None => cmd_generate(cli.config_file.as_deref(), &cli.generate),
        Some(Commands::Config { command }) => cmd_config(cli.config_file.as_deref(), command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

#[instrument(skip(args))]
fn cmd_generate(config_file: Option<&Path>, args: &GenerateArgs) -> CliResult<()> {
    let settings = args.apply_to(Settings::load(config_file)?);
    debug!("effective settings: {:?}", settings);

    let service = GeneratorService::new(Arc::new(RealFileSystem));
    let report = service.generate(&GenerationRequest::from(&settings))?;

    if args.print_tree {
        output::info(&tree_preview(&report.dataset.tree));
    }
    output::success(&format!(
        "Wrote {} and {}",
        report.tree_out.display(),
        report.metadata_out.display()
    ));
    Ok(())
}

fn cmd_config(config_file: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config_file)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence):");
            let local = config_file
                .map(Path::to_path_buf)
                .unwrap_or_else(|| local_config_path(Path::new(".")));
            let candidates = global_config_path().into_iter().chain(std::iter::once(local));
            for path in candidates {
                if path.exists() {
                    output::success_detail(&path.display());
                } else {
                    output::failure(&format!("{} (not found)", path.display()));
                }
            }
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
