//! Terminal notifier.

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use fitmerge_model::Notifier;

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

/// Prints events to the terminal and asks questions on stdin.
///
/// With `assume_yes` every question is answered yes. When stdin is not a
/// terminal questions get their default answer.
pub struct ConsoleNotifier {
    assume_yes: bool,
    interactive: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            interactive: io::stdin().is_terminal(),
            bar: Mutex::new(None),
        }
    }

    /// Prints a line without tearing an active progress bar.
    fn emit(&self, line: &str) {
        let active = self.bar.lock().ok().and_then(|bar| bar.clone());
        match active {
            Some(bar) => bar.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

/// Reads a yes/no answer; anything unrecognised yields `default`.
pub fn parse_answer(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

impl Notifier for ConsoleNotifier {
    fn message(&self, text: &str) {
        self.emit(&format!("  {text}"));
    }

    fn success(&self, text: &str) {
        self.emit(&format!("✓ {text}"));
    }

    fn warning(&self, text: &str) {
        self.emit(&format!("! {text}"));
    }

    fn error(&self, text: &str) {
        self.emit(&format!("✗ {text}"));
    }

    fn header(&self, text: &str) {
        self.emit(&format!("\n== {text} =="));
    }

    fn confirm(&self, question: &str, default: bool) -> bool {
        if self.assume_yes {
            info!(question, "answered yes (--yes)");
            return true;
        }
        if !self.interactive {
            debug!(question, default, "not a terminal, using default answer");
            return default;
        }

        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("? {question} {hint} ");
        if io::stdout().flush().is_err() {
            return default;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => parse_answer(&answer, default),
            Err(_) => default,
        }
    }

    fn progress(&self, current: usize, total: usize, label: &str) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        });
        bar.set_length(total as u64);
        bar.set_position(current as u64);
        bar.set_message(label.to_string());
        if current >= total {
            bar.finish_and_clear();
            *slot = None;
        }
    }
}
