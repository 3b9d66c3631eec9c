// Console layer: a progress bar over the frame range plus styled status
// lines that print above it. Everything here is stateless apart from the
// bar itself; callers describe the meaning of a line with a `Tone` and
// the color mapping lives in one place.

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

/// Semantic flavor of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Info,
    Notice,
    Heading,
}

/// Style `text` for the terminal according to `tone`.
pub fn paint(tone: Tone, text: &str) -> String {
    match tone {
        Tone::Success => text.green().to_string(),
        Tone::Failure => text.red().to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Notice => text.yellow().to_string(),
        Tone::Heading => text.bold().to_string(),
    }
}

/// Progress display shared by the upload loop and the API client.
///
/// Status lines go through the bar so they appear above it instead of
/// tearing it mid-draw. Cloning is cheap; the bar is reference counted.
#[derive(Clone)]
pub struct Console {
    bar: ProgressBar,
}

impl Console {
    /// Console for a real run: a bar sized to the frame count.
    pub fn for_run(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(ProgressStyle::with_template("{msg} {bar:40.cyan/blue} {pos}/{len}").unwrap());
        bar.set_message("Uploading frames");
        Console { bar }
    }

    /// Console that draws nothing. Used by tests.
    pub fn sink() -> Self {
        Console {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn say(&self, tone: Tone, text: &str) {
        self.bar.println(paint(tone, text));
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_keeps_the_text() {
        for tone in [Tone::Success, Tone::Failure, Tone::Info, Tone::Notice, Tone::Heading] {
            assert!(paint(tone, "frame 0001").contains("frame 0001"));
        }
    }
}
