use clap::Parser;
use httpcheck::{
    cli::{self, Cli},
    error::{Error, ErrorKind},
    response::Response,
};
use log::{error, info};
use std::{io, process::ExitCode};

fn run(cli: &Cli) -> Result<Response, Error> {
    let request = cli.to_request()?;
    info!(
        "{} http://{}{}",
        request.method(),
        request.host_header(),
        request.path()
    );

    request.send()
}

fn main() -> ExitCode {
    // exits with 0 for --version/--help and 2 for usage errors
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_env("RUST_LOG")
        .init();

    let response = match run(&cli) {
        Ok(res) => res,
        Err(e) => {
            match e.kind() {
                ErrorKind::InvalidArgument => eprintln!("httpcheck: {}", e),
                _ => eprintln!("httpcheck: {}:{}: {}", cli.host, cli.port, e),
            }
            return ExitCode::from(cli::exit_code(e.kind()));
        }
    };

    info!("received {} bytes", response.len());

    if let Err(e) = response.write_to(&mut io::stdout().lock()) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            error!("cannot write response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
