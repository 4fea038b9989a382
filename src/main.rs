use std::process::ExitCode;

use checkin_control::CheckinError;
use checkin_control::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = checkin_control::cli::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            let code = e.downcast_ref::<CheckinError>().map_or(1, CheckinError::code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
