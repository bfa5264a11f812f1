//! `riftwatch config`: inspect and initialize the config file.

use std::path::PathBuf;

use riftwatch_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

fn target_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(riftwatch_config::config_path)
}

pub fn handle(cfg: &Config, args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => cfg.to_toml()?,
                ref format => output::render_single(format, cfg, |_| String::new(), |_| String::new()),
            };
            output::print_output(out.trim_end(), global.quiet);
        }

        ConfigCommand::Path => {
            output::print_output(&target_path(global).display().to_string(), global.quiet);
        }

        ConfigCommand::Init { force } => {
            let path = target_path(global);
            riftwatch_config::init_config(&path, force)?;
            output::print_done(&format!("Wrote {}", path.display()), global.quiet);
        }
    }
    Ok(())
}
