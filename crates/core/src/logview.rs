//! State-log aggregation.
//!
//! Turns an active model's raw transition log into display-ready rows with
//! computed elapsed times: `total` since the first entry, `last` since the
//! previous one. Rows from multiple models can be merged into one sequence.

use serde::Serialize;
use time::OffsetDateTime;
use whetstone_store::ActiveModel;

/// One rendered log row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogRow {
    /// Transition label, `old_state => state`.
    pub state: String,
    pub action: String,
    pub result: String,
    /// Absolute wall-clock time, `YYYY-MM-DD HH:MM:SS UTC`.
    pub time: String,
    /// Elapsed time since the previous entry of the same model.
    pub last: String,
    /// Elapsed time since the first entry of the same model.
    pub total: String,
    /// Owning record, attached only when aggregating across models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_model_uuid: Option<String>,
}

/// Render one model's log, in stored order.
pub fn log_rows(model: &ActiveModel, with_uuid: bool) -> Vec<LogRow> {
    let mut rows = Vec::with_capacity(model.state_log.len());
    let mut first_time = None;
    let mut last_time = None;
    for entry in &model.state_log {
        let first = *first_time.get_or_insert(entry.timestamp);
        let last = *last_time.get_or_insert(entry.timestamp);
        rows.push(LogRow {
            state: format!("{} => {}", entry.old_state, entry.state),
            action: entry.action.clone(),
            result: entry.result.clone(),
            time: format_timestamp(entry.timestamp),
            last: pretty_duration(entry.timestamp - last),
            total: pretty_duration(entry.timestamp - first),
            active_model_uuid: with_uuid.then(|| model.uuid.clone()),
        });
        last_time = Some(entry.timestamp);
    }
    rows
}

/// Render and merge the logs of several models into one sequence.
///
/// Each row is tagged with its owning model's uuid. The combined sequence is
/// ordered by the rendered `time` string, ascending. Sorting on the string
/// rather than the instant is long-standing observable behavior; it is
/// chronological here because the rendered format is fixed-width UTC.
pub fn merged_log_rows(models: &[ActiveModel]) -> Vec<LogRow> {
    let mut rows: Vec<LogRow> = models.iter().flat_map(|m| log_rows(m, true)).collect();
    rows.sort_by(|a, b| a.time.cmp(&b.time));
    rows
}

/// `YYYY-MM-DD HH:MM:SS UTC` from epoch seconds.
fn format_timestamp(epoch_secs: i64) -> String {
    match OffsetDateTime::from_unix_timestamp(epoch_secs) {
        Ok(t) => format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            t.year(),
            t.month() as u8,
            t.day(),
            t.hour(),
            t.minute(),
            t.second()
        ),
        // Out-of-range timestamps cannot be rendered as a date; show raw.
        Err(_) => format!("@{epoch_secs}"),
    }
}

/// Compact human-readable duration: `0s`, `45s`, `2m30s`, `1h2m3s`, `3d4h`.
pub fn pretty_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs == 0 {
        return "0s".to_string();
    }
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let mins = (secs % 3_600) / 60;
    let rem = secs % 60;
    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d"));
    }
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if mins > 0 {
        out.push_str(&format!("{mins}m"));
    }
    if rem > 0 {
        out.push_str(&format!("{rem}s"));
    }
    out
}
