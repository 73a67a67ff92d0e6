use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = env_logger::try_init();

    match icoglow::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
