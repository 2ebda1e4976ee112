//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::DateTime;
use colored::*;
use custodian_domain::traits::{MarkOutcome, StoreStats};
use custodian_domain::{PolicyRule, ProvenanceRecord, QuarantineEntry, TrustDecision, Verdict};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a mark-source operation.
    pub fn format_mark(&self, outcome: &MarkOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "id": outcome.record.id,
                    "created": outcome.created,
                    "source": outcome.record.source,
                    "requested_trust_level": outcome.requested_level.as_str(),
                    "effective_trust_level": outcome.record.trust_level.as_str(),
                    "policy": outcome.policy.as_ref().map(|r| r.pattern.clone()),
                    "chain_length": outcome.record.custody_chain.len(),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(outcome.record.trust_level.as_str().to_string()),
            OutputFormat::Table => {
                let verb = if outcome.created { "recorded" } else { "updated" };
                let mut out = self.success(&format!(
                    "{} '{}' from source '{}' ({}, chain length {})",
                    verb,
                    outcome.record.id,
                    outcome.record.source,
                    outcome.record.trust_level,
                    outcome.record.custody_chain.len()
                ));
                if let Some(rule) = &outcome.policy {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "policy '{}' overrode requested level '{}' with '{}'",
                        rule.pattern, outcome.requested_level, rule.trust_level
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format a record with its full custody chain and quarantine status.
    pub fn format_record(
        &self,
        record: &ProvenanceRecord,
        quarantine: Option<&QuarantineEntry>,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let chain: Vec<serde_json::Value> = record
                    .custody_chain
                    .iter()
                    .map(|entry| {
                        serde_json::json!({
                            "source": entry.source,
                            "trust_level": entry.trust.as_str(),
                            "at": entry.at,
                        })
                    })
                    .collect();
                let value = serde_json::json!({
                    "id": record.id,
                    "source": record.source,
                    "trust_level": record.trust_level.as_str(),
                    "marked_at": record.marked_at,
                    "custody_chain": chain,
                    "quarantine": quarantine.map(|q| {
                        serde_json::json!({
                            "reason": q.reason,
                            "quarantined_at": q.quarantined_at,
                        })
                    }),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(record.trust_level.as_str().to_string()),
            OutputFormat::Table => {
                let mut out = format!(
                    "id:          {}\nsource:      {}\ntrust level: {}\nmarked at:   {}\n",
                    record.id,
                    record.source,
                    self.trust_colored(record.trust_level.as_str()),
                    format_timestamp(record.marked_at),
                );

                let mut builder = Builder::default();
                builder.push_record(["#", "Source", "Trust", "At"]);
                for (i, entry) in record.custody_chain.iter().enumerate() {
                    let seq = (i + 1).to_string();
                    let at = format_timestamp(entry.at);
                    builder.push_record([
                        seq.as_str(),
                        entry.source.as_str(),
                        entry.trust.as_str(),
                        at.as_str(),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                out.push_str(&table.to_string());

                if let Some(entry) = quarantine {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "QUARANTINED since {}: {}",
                        format_timestamp(entry.quarantined_at),
                        entry.reason
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format the policy rule list in display order.
    pub fn format_policies(&self, rules: &[PolicyRule]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<serde_json::Value> = rules
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "pattern": r.pattern,
                            "trust_level": r.trust_level.as_str(),
                            "created_at": r.created_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => {
                Ok(rules.iter().map(|r| r.pattern.clone()).collect::<Vec<_>>().join("\n"))
            }
            OutputFormat::Table => {
                if rules.is_empty() {
                    return Ok(self.colorize("No policies defined.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Pattern", "Trust", "Created"]);
                for rule in rules {
                    let created = format_timestamp(rule.created_at);
                    builder.push_record([
                        rule.pattern.as_str(),
                        rule.trust_level.as_str(),
                        created.as_str(),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format the quarantine list.
    pub fn format_quarantine_list(&self, entries: &[QuarantineEntry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "content_id": e.content_id,
                            "reason": e.reason,
                            "quarantined_at": e.quarantined_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => Ok(entries
                .iter()
                .map(|e| e.content_id.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if entries.is_empty() {
                    return Ok(self.colorize("No content in quarantine.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Content Id", "Reason", "Since"]);
                for entry in entries {
                    let since = format_timestamp(entry.quarantined_at);
                    builder.push_record([
                        entry.content_id.as_str(),
                        entry.reason.as_str(),
                        since.as_str(),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a trust verdict.
    pub fn format_decision(&self, id: &str, decision: &TrustDecision) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "id": id,
                    "verdict": decision.verdict.as_str(),
                    "reason": decision.reason.to_string(),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(decision.verdict.as_str().to_string()),
            OutputFormat::Table => {
                let line = format!("{}: {} ({})", id, decision.verdict, decision.reason);
                Ok(match decision.verdict {
                    Verdict::Pass => self.colorize(&line, "green"),
                    Verdict::Fail => self.colorize(&line, "red"),
                    Verdict::Unknown => self.colorize(&line, "yellow"),
                })
            }
        }
    }

    /// Format aggregate statistics.
    pub fn format_stats(&self, stats: &StoreStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let recent: Vec<serde_json::Value> = stats
                    .recent
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "id": e.id.to_string(),
                            "action": e.action.as_str(),
                            "content_id": e.content_id,
                            "details": e.details,
                            "timestamp": e.timestamp,
                        })
                    })
                    .collect();
                let value = serde_json::json!({
                    "records": {
                        "trusted": stats.trusted,
                        "untrusted": stats.untrusted,
                        "unknown": stats.unknown,
                    },
                    "quarantined": stats.quarantined,
                    "policies": stats.policies,
                    "recent_audit_events": recent,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(format!(
                "{} {} {} {} {}",
                stats.trusted, stats.untrusted, stats.unknown, stats.quarantined, stats.policies
            )),
            OutputFormat::Table => {
                let mut out = format!(
                    "records:     {} trusted, {} untrusted, {} unknown\nquarantined: {}\npolicies:    {}\n",
                    stats.trusted, stats.untrusted, stats.unknown, stats.quarantined, stats.policies
                );
                if stats.recent.is_empty() {
                    out.push_str(&self.colorize("No audit events yet.", "yellow"));
                    return Ok(out);
                }
                let mut builder = Builder::default();
                builder.push_record(["When", "Action", "Content Id", "Details"]);
                for event in &stats.recent {
                    let when = format_timestamp(event.timestamp);
                    builder.push_record([
                        when.as_str(),
                        event.action.as_str(),
                        event.content_id.as_deref().unwrap_or("-"),
                        event.details.as_str(),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                out.push_str(&table.to_string());
                Ok(out)
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn trust_colored(&self, level: &str) -> String {
        match level {
            "trusted" => self.colorize(level, "green"),
            "untrusted" => self.colorize(level, "red"),
            _ => self.colorize(level, "yellow"),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render an epoch-seconds timestamp for humans.
fn format_timestamp(secs: u64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}
