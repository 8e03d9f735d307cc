//! Console echo of accepted records

use colored::Colorize;

use crate::record::LogRecord;

/// Renders records for the terminal
pub struct LogPrinter;

impl LogPrinter {
    /// `"{timestamp} {signature} {tag} | {text}"`
    pub fn format(record: &LogRecord) -> String {
        format!(
            "{} {} {} | {}",
            record.header.timestamp, record.header.signature, record.header.tag, record.text
        )
    }

    /// Print to stdout in the record's 24-bit color
    pub fn print(record: &LogRecord) {
        let (r, g, b) = record.header.rgb();
        println!("{}", Self::format(record).truecolor(r, g, b));
    }
}
