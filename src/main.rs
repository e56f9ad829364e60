use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use modtelemetry::cli::{Cli, Commands};
use modtelemetry::config::StaticConfig;
use modtelemetry::runtime::modes;
use modtelemetry::system::init_logging;

/// Default output of `generate-config`.
const SAMPLE_CONFIG_PATH: &str = "config.example.toml";

fn generate_config(output: Option<String>, force: bool) -> ExitCode {
    let output = output.unwrap_or_else(|| SAMPLE_CONFIG_PATH.to_string());
    if Path::new(&output).exists() && !force {
        eprintln!("{} already exists; pass --force to overwrite", output);
        return ExitCode::FAILURE;
    }

    match StaticConfig::default().save_to_file(&output) {
        Ok(()) => {
            println!("Sample configuration written to {}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write {}: {}", output, e);
            ExitCode::FAILURE
        }
    }
}

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 不需要数据库和日志的命令先处理
    let command = match cli.command.unwrap_or(Commands::Serve) {
        Commands::GenerateConfig { output, force } => return generate_config(output, force),
        command => command,
    };

    let config = StaticConfig::load(cli.config.as_deref());

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Commands::ExportCsv { path } => modes::run_export(&config, Path::new(&path))
            .await
            .map(|rows| println!("Exported {} records to {}", rows, path)),
        Commands::Serve => modes::run_server(&config).await,
        Commands::GenerateConfig { .. } => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
