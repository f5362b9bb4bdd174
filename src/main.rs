mod app;

use std::process::ExitCode;

use app::error::CheckError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    match app::run(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
        // clap renders its own "error:" prefix and usage block
        let _ = clap_err.print();
        return;
    }

    eprintln!("error: {:#}", err);
    if let Some(CheckError::Usage(_)) = err.downcast_ref::<CheckError>() {
        eprintln!();
        eprintln!("{}", app::cli::command().render_usage());
        eprintln!();
        eprintln!("For more information, try '--help'.");
    }
}
