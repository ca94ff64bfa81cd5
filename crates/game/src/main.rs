use std::process::ExitCode;

fn main() -> ExitCode {
    pounce::app::run()
}
