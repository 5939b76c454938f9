use gitshim::{AppResult, Config, UsageError, logging};
use std::io::Write;
use std::process;

fn main() {
    logging::init();

    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("gitshim: {}", e);
            if e.is_usage() {
                eprintln!("Try 'gitshim --help' for more information.");
            }
            e.exit_code()
        }
    };

    // process::exit does not flush Rust's stdout buffer
    let _ = std::io::stdout().flush();
    process::exit(code);
}

fn run() -> AppResult<i32> {
    let args = collect_args()?;
    gitshim::run(args, Config::load_or_default)
}

fn collect_args() -> Result<Vec<String>, UsageError> {
    std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| UsageError::InvalidUnicode(arg.to_string_lossy().into_owned()))
        })
        .collect()
}
