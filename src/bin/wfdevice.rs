//! Wavefleet device agent.

use clap::Parser;
use std::process::ExitCode;

use wavefleet::cli::{parse_error_exit_code, DeviceArgs};
use wavefleet::config::Role;
use wavefleet::lifecycle::{Coordinator, LifecycleError};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match DeviceArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_error_exit_code(&e));
        }
    };

    let result = match args.into_builder() {
        Ok(builder) => Coordinator::new(Role::Device).run(builder).await,
        Err(e) => Err(LifecycleError::from(e)),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wfdevice: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
