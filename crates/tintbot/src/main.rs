#![forbid(unsafe_code)]

use tintbot::CliError;

fn main() {
    let json = std::env::args().any(|arg| arg == "--json");
    if let Err(error) = tintbot::run_from_env() {
        match &error {
            _ if json => eprintln!("{}", error.to_json()),
            CliError::Usage(usage) => {
                let _ = usage.print();
            }
            _ => eprintln!("tintbot: {error}"),
        }
        std::process::exit(error.exit_code());
    }
}
