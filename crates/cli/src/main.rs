use std::process::ExitCode;

fn main() -> ExitCode {
    churnguard_cli::run()
}
