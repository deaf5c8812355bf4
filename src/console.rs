//! Console sink collaborator.
//!
//! The client never writes to the display directly; it hands formatted,
//! optionally markup-tagged lines to a [`Console`] implementation. The
//! display's markup delimiters are `[` and `]` (emphasized spans look like
//! `[u]...[/u]`), so raw text received from the wire must be escaped with
//! [`escape_markup`] before it is forwarded.

/// Rendering hint for a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    Normal,
    Bold,
}

/// Destination for client log output.
pub trait Console: Send + Sync {
    fn print(&self, style: LogStyle, text: &str);
}

/// Rewrites the two reserved markup delimiters so received text cannot open
/// or close a markup tag: `[` becomes `<` and `]` becomes `>`. Every other
/// character passes through unchanged.
pub fn escape_markup(text: &str) -> String {
    text.replace('[', "<").replace(']', ">")
}

/// Console that writes to stdout, rendering bold lines with ANSI SGR codes.
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&self, style: LogStyle, text: &str) {
        match style {
            LogStyle::Normal => println!("{text}"),
            LogStyle::Bold => println!("\x1b[1m{text}\x1b[0m"),
        }
    }
}

/// Console that routes lines into `tracing` instead of a display. Useful
/// when the client runs headless under a subscriber configured by
/// [`crate::telemetry::init_tracing`].
pub struct TracingConsole;

impl Console for TracingConsole {
    fn print(&self, style: LogStyle, text: &str) {
        tracing::info!(
            target: "mudlink::console",
            bold = matches!(style, LogStyle::Bold),
            "{text}"
        );
    }
}
