use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

/// Symbol-prefixed single-line event format. Verbose levels (trace,
/// debug) also carry the event target so engine internals can be told
/// apart from command output.
pub struct CircFormatter;

impl CircFormatter {
    fn symbol(level: Level) -> ColoredString {
        match level {
            Level::TRACE => "[.]".dimmed(),
            Level::DEBUG => "[?]".cyan(),
            Level::INFO => "[+]".green().bold(),
            Level::WARN => "[!]".yellow().bold(),
            Level::ERROR => "[x]".red().bold(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for CircFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = *meta.level();

        write!(writer, "{} ", Self::symbol(level))?;
        if matches!(level, Level::TRACE | Level::DEBUG) {
            write!(writer, "{} ", meta.target().dimmed())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

pub fn init(quiet: u8) {
    let level = match quiet {
        0 => Level::INFO,
        1 => Level::WARN,
        _ => Level::ERROR,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .event_format(CircFormatter)
        .init();
}
