use anyhow::Result;

use crate::reporter::Verdict;
use crate::types::{Outcome, OutputFormat, RunReport};

pub fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Simple => print!("{}", format_simple(report)),
    }
    Ok(())
}

/// Human-readable report, one line per card or hint
pub fn format_simple(report: &RunReport) -> String {
    let mut out = String::new();

    let headline = match report.outcome {
        Outcome::Animated => "animated",
        Outcome::PartiallyAnimated => "partially animated",
        Outcome::NotObserved => "animation not observed",
        Outcome::NotFound => "no cards found",
    };
    out.push_str(&format!("{}: {}\n", report.target, headline));

    match &report.matched_by {
        Some(matched) => out.push_str(&format!(
            "  Matched by {} after {}ms ({} probe(s))\n",
            matched.description, report.waited_ms, report.probes
        )),
        None => out.push_str(&format!(
            "  Waited {}ms ({} probe(s))\n",
            report.waited_ms, report.probes
        )),
    }

    for card in &report.cards {
        let status = match &card.verdict {
            Verdict::Running => "running".to_string(),
            Verdict::Missing { observed } => format!("missing (animation-name: {})", observed),
            Verdict::Detached => "detached".to_string(),
        };
        match &card.element {
            Some(el) => out.push_str(&format!(
                "  [{}] <{} class=\"{}\"> {}: {}\n",
                card.index, el.tag, el.class_name, el.text, status
            )),
            None => out.push_str(&format!("  [{}] {}\n", card.index, status)),
        }
    }

    if !report.hints.is_empty() {
        out.push_str("  Near misses:\n");
        for hint in &report.hints {
            out.push_str(&format!(
                "    <{} class=\"{}\"> {}\n",
                hint.tag, hint.class_name, hint.text
            ));
        }
    }

    out
}
