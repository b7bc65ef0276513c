mod cli;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "tactile_syntax=warn",
        1 => "tactile_syntax=debug",
        _ => "tactile_syntax=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    init_tracing(command_line_interface.verbose);
    match command_line_interface.run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
