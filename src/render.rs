//! Plain-text rendering of merged snapshots.

use chrono::DateTime;
use tailview_core::LogRecord;

const HEADERS: [&str; 5] = ["TIME", "SOURCE", "IP", "USER", "MESSAGE"];

/// Format a unix timestamp for display; `0` means the line carried no
/// parseable timestamp and renders blank.
pub fn format_timestamp(timestamp: i64) -> String {
    if timestamp == 0 {
        return String::new();
    }
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%-d %b %Y %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Render the merged view as an aligned text table, one row per record in
/// merge order.
pub fn render_table(records: &[LogRecord]) -> String {
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|record| {
            [
                format_timestamp(record.timestamp),
                record.source.to_string(),
                record.source_ip.clone(),
                if record.user_id == 0 { String::new() } else { record.user_id.to_string() },
                record.content.clone(),
            ]
        })
        .collect();

    // The message column is last and unpadded, so only the first four
    // columns need widths.
    let mut widths = [0usize; 4];
    for (i, width) in widths.iter_mut().enumerate() {
        *width = HEADERS[i].len();
        for row in &rows {
            *width = (*width).max(row[i].len());
        }
    }

    let mut out = String::new();
    render_row(&mut out, &widths, &HEADERS.map(String::from));
    for row in &rows {
        render_row(&mut out, &widths, row);
    }
    out
}

fn render_row(out: &mut String, widths: &[usize; 4], row: &[String; 5]) {
    for (i, &width) in widths.iter().enumerate() {
        out.push_str(&format!("{:<width$}  ", row[i], width = width));
    }
    out.push_str(&row[4]);
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tailview_core::SourceKind;

    fn record(ts: i64, ip: &str, user: u64, content: &str) -> LogRecord {
        LogRecord {
            timestamp: ts,
            source_ip: ip.to_string(),
            user_id: user,
            content: content.to_string(),
            sequence_id: None,
            source: SourceKind::Access,
        }
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(1615384536), "10 Mar 2021 13:55:36");
    }

    #[test]
    fn zero_timestamp_renders_blank() {
        assert_eq!(format_timestamp(0), "");
    }

    #[test]
    fn table_has_header_and_one_line_per_record() {
        let records = vec![
            record(1615384536, "192.168.1.1", 0, "GET / HTTP/1.1 200"),
            record(0, "", 0, "garbage line"),
        ];
        let table = render_table(&records);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TIME"));
        assert!(lines[1].contains("192.168.1.1"));
        assert!(lines[2].ends_with("garbage line"));
    }

    #[test]
    fn anonymous_user_column_is_blank() {
        let table = render_table(&[record(1615384536, "1.2.3.4", 7, "x")]);
        assert!(table.contains(" 7 "));
        let table = render_table(&[record(1615384536, "1.2.3.4", 0, "x")]);
        assert!(!table.contains(" 0 "));
    }
}
