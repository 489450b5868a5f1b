use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ntl_core::scanner::SweepProgress;

use crate::terminal::colors;

static SPINNER: OnceLock<ProgressBar> = OnceLock::new();

/// The shared spinner. Hidden until [`start`] is called.
pub fn get_spinner() -> &'static ProgressBar {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);
    pb.set_style(style);
    pb
}

pub fn start(message: String) {
    let pb = get_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
}

pub fn stop() {
    let pb = get_spinner();
    pb.disable_steady_tick();
    pb.finish_and_clear();
    pb.set_draw_target(ProgressDrawTarget::hidden());
}

pub fn report_sweep_progress(progress: SweepProgress) {
    get_spinner().set_message(
        format!(
            "Scanned {}/{} addresses, {} so far...",
            progress.scanned,
            progress.total,
            format!("{} hosts", progress.found).green().bold()
        )
        .color(colors::TEXT_DEFAULT)
        .to_string(),
    );
}

/// Log sink that keeps the spinner line intact while writing.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        get_spinner().suspend(|| io::stdout().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
