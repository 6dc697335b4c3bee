//! Output formatting utilities

use console::{style, Style};
use serde::Serialize;

use tandem_core::monorepo::UpdateSet;
use tandem_core::types::ReleaseInfo;
use tandem_core::workflow::PrepareReport;

use crate::cli::OutputFormat;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for version numbers
pub fn version_style() -> Style {
    Style::new().green().bold()
}

/// Style for package names
pub fn package_style() -> Style {
    Style::new().cyan()
}

/// Print `value` as pretty JSON
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the package set of the next release
pub fn update_set(format: OutputFormat, version: &str, updates: &UpdateSet) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return json(updates);
    }

    println!("{}", header(&format!("Release {}", version_style().apply_to(version))));
    println!("{}", key_value("reason", &updates.reason.to_string()));
    if updates.packages.is_empty() {
        info("No packages changed, only the root package is bumped");
    }
    for name in &updates.packages {
        println!("  {} {}", style("•").dim(), package_style().apply_to(name));
    }
    Ok(())
}

/// Print what prepare wrote
pub fn prepare_report(format: OutputFormat, report: &PrepareReport) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return json(report);
    }

    success(&format!(
        "Prepared version {}",
        version_style().apply_to(&report.version)
    ));
    for name in &report.bumped {
        println!("{}", key_value(name, &report.version));
    }
    for (holder, change) in &report.range_changes {
        println!(
            "  {} {} {} -> {} ({})",
            style(holder).dim(),
            package_style().apply_to(&change.name),
            change.from,
            change.to,
            change.kind.as_str()
        );
    }
    if report.lerna_updated {
        println!("{}", key_value("lerna.json", &report.version));
    }
    if report.root_bumped {
        println!("{}", key_value("root package.json", &report.version));
    }
    Ok(())
}

/// Print the outcome of publishing
pub fn release_info(format: OutputFormat, info: Option<&ReleaseInfo>) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return json(&info);
    }

    match info {
        Some(info) => {
            success(&format!("Published {}", info.name));
            if let Some(url) = &info.url {
                println!("{}", key_value("url", url));
            }
        }
        None => warning("Publishing disabled, nothing was published"),
    }
    Ok(())
}
