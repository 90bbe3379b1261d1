// src/main.rs

use orgtangle::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.verbose, args.logfile.as_deref()) {
        eprintln!("orgtangle error: {err:?}");
        std::process::exit(1);
    }

    // `run` renders its own failures; here the error only sets the status.
    if run(args).await.is_err() {
        std::process::exit(1);
    }
}
