//! CLI output formatting utilities.

use crate::factcheck::{FactCheckRecord, Verdict};
use crate::trusted::TRUST_MARKER;
use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one fact-check record with its verdict and sources.
    pub fn record(record: &FactCheckRecord) {
        let verdict = record.verdict.to_string();
        let styled = match record.verdict {
            Verdict::True => style(verdict).green(),
            Verdict::False => style(verdict).red(),
            Verdict::Misleading => style(verdict).yellow(),
            Verdict::Unverifiable => style(verdict).dim(),
        };
        println!(
            "\n{} {} [{}]",
            style(format!("{}.", record.claim.num)).bold(),
            record.claim.text,
            styled
        );
        for source in &record.sources {
            match source.strip_prefix(TRUST_MARKER) {
                Some(url) => println!("   {} {}", style("*").green().bold(), url),
                None => println!("     {}", style(source).dim()),
            }
        }
    }
}
