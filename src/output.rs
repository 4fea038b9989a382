//! User-facing console messages for the binary.
//!
//! Prefixes are colored only when stdout is a TTY, so piped output stays plain.
//! Structured diagnostics go through `tracing`; this module is for short lines a
//! person reads at the end of a run.

use owo_colors::OwoColorize;

#[derive(Clone, Copy)]
enum Tone {
    Info,
    Warn,
    Error,
    Success,
}

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn prefix(tone: Tone) -> String {
    let label = match tone {
        Tone::Info => "info:",
        Tone::Warn => "warn:",
        Tone::Error => "error:",
        Tone::Success => "ok:",
    };
    if !is_tty() {
        return label.to_string();
    }
    match tone {
        Tone::Info => label.cyan().bold().to_string(),
        Tone::Warn => label.yellow().bold().to_string(),
        Tone::Error => label.red().bold().to_string(),
        Tone::Success => label.green().bold().to_string(),
    }
}

fn emit(tone: Tone, msg: &str) {
    match tone {
        Tone::Warn | Tone::Error => eprintln!("{} {}", prefix(tone), msg),
        Tone::Info | Tone::Success => println!("{} {}", prefix(tone), msg),
    }
}

pub fn print_info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tone::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tone::Error, msg);
}

pub fn print_success(msg: &str) {
    emit(Tone::Success, msg);
}

/// Print a plain line (no prefix), e.g. the final destination path that
/// scripts capture.
pub fn print_user(msg: &str) {
    println!("{msg}");
}
