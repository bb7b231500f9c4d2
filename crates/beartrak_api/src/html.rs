//! HTML fragments for markup-driven search clients.
//!
//! # Invariants
//! - Every interpolated value is HTML-escaped.
//! - Zero results render a `no-results` placeholder, never an empty table.

use beartrak_core::RecordView;
use chrono::SecondsFormat;
use std::fmt::Write;

/// Renders search results, or the matching placeholder when there are none.
///
/// Input that is blank after trimming means nothing was typed yet; any
/// other input with no hits means nothing matched.
pub fn render_search_results(records: &[RecordView], raw_query: &str) -> String {
    if records.is_empty() {
        if raw_query.trim().is_empty() {
            return r#"<div class="no-results">Start typing to search...</div>"#.to_string();
        }
        return format!(
            r#"<div class="no-results">No RFPs found matching "{}"</div>"#,
            escape_html(raw_query)
        );
    }

    let mut html = String::from(
        "<table>\n<thead>\n<tr>\n<th>RFP Name</th>\n<th>More Information</th>\n<th>Last Updated</th>\n</tr>\n</thead>\n<tbody>\n",
    );
    for record in records {
        let link = match record.url.as_deref() {
            Some(url) => format!(
                r#"<a href="{0}" target="_blank" rel="noopener noreferrer">{0}</a>"#,
                escape_html(url)
            ),
            None => "N/A".to_string(),
        };
        // Writing into a String cannot fail.
        let _ = write!(
            html,
            "<tr>\n<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n</tr>\n",
            escape_html(&record.name),
            link,
            record.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
