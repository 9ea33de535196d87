use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use ptch::{
    app::{
        ConfigError, ScanMode, ScanWorkflow, ScanWorkflowError,
        component_factory::{ComponentFactory, ComponentFactoryError},
    },
    domain::ImageReference,
    infra::{ConcreteComponentFactory, ConfigLoader, EngineKind, logging},
};
use thiserror::Error;
use tracing::error;

const CONFIG_HELP: &str = r#"In order to use ptch create config.yaml with keys: "group", "token" and "apiEndpoint".
It is looked up in ~/.config/ptch/ and then ~/.ptch/ unless --config is given.
The token can also be provided with the PTCH_TOKEN environment variable."#;

/// Send a container image to the vulnerability scanning service and print the report URL.
#[derive(Parser, Debug)]
#[command(version, about, after_help = CONFIG_HELP)]
struct Args {
    /// Name of image in repo:tag format
    #[arg(short, long, value_name = "REPO:TAG")]
    image: ImageReference,

    /// Use image from remote registry like GCR, if not set uses local image
    #[arg(short, long)]
    remote: bool,

    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How to reach the local container engine
    #[arg(long, value_enum, default_value_t = EngineKind::Cli)]
    engine: EngineKind,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ComponentFactory(#[from] ComponentFactoryError),

    #[error(transparent)]
    Scan(#[from] ScanWorkflowError),
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    match run(args).await {
        Ok(report_url) => {
            println!("{report_url}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<String, CliError> {
    let config = ConfigLoader::new(args.config).load()?;

    let factory = ConcreteComponentFactory::new(args.engine);
    let engine = factory.create_container_engine()?;
    let scan_service = factory.create_scan_service(&config)?;

    let mode = if args.remote {
        ScanMode::Remote
    } else {
        ScanMode::Local
    };

    Ok(ScanWorkflow::new(engine.as_ref(), scan_service.as_ref())
        .run(&args.image, mode)
        .await?)
}
