mod cli;
mod codec;
mod command;
mod error;
mod exec;
mod request;
mod timecode;

use chrono::Local;
use clap::Parser;
use cli::Args;
use error::Result;
use request::ClipRequest;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(&args) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("trimshare: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(debug: bool) {
    tracing_subscriber::fmt()
        .with_max_level(if debug { Level::DEBUG } else { Level::ERROR })
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<PathBuf> {
    let request = ClipRequest::from_args(args, Local::now().naive_local())?;
    debug!(
        input = %request.input.display(),
        start = %request.start,
        end = %request.end,
        output = %request.output.display(),
        quality = request.quality,
        vresolution = ?request.height,
        two_pass = request.two_pass,
        "given args"
    );

    let plan = command::build(&request);
    for command in &plan.commands {
        debug!(pass = %command.pass, "{}", command);
    }

    let result = exec::run_plan(&plan, &mut io::stderr());
    plan.cleanup();
    result.map(|()| request.output)
}
