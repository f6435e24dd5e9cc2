use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    brrtgen::cli::run_cli()
}
