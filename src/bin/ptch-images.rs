use std::process::ExitCode;

use clap::Parser;
use ptch::{
    app::{ImageLister, component_factory::ComponentFactory},
    infra::{ConcreteComponentFactory, EngineKind, logging},
};
use tracing::error;

/// List local, non-dangling container images, one per line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// How to reach the local container engine
    #[arg(long, value_enum, default_value_t = EngineKind::Cli)]
    engine: EngineKind,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let engine = match ConcreteComponentFactory::new(args.engine).create_container_engine() {
        Ok(engine) => engine,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match ImageLister::new(engine.as_ref()).list().await {
        Ok(images) => {
            for image in images {
                println!("{image}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
