//! HTML table for the mail body.

use html_escape::{encode_double_quoted_attribute, encode_safe};

use super::format_timestamp;
use crate::ingest::types::NewsItem;

pub fn html_table(items: &[NewsItem]) -> String {
    let mut rows = vec![
        r#"<table border="0" cellpadding="6" cellspacing="0">"#.to_string(),
        concat!(
            r#"<thead><tr><th align="left">Region</th><th align="left">Zeit</th>"#,
            r#"<th align="left">Titel</th><th align="left">Quelle</th><th align="left">Score</th></tr></thead><tbody>"#
        )
        .to_string(),
    ];
    for it in items {
        rows.push(format!(
            r#"<tr><td>{}</td><td>{}</td><td><a href="{}">{}</a><br><small>{}</small></td><td>{}</td><td>{}</td></tr>"#,
            it.region,
            format_timestamp(&it.published),
            encode_double_quoted_attribute(&it.url),
            encode_safe(&it.title),
            encode_safe(&it.summary),
            encode_safe(&format!("{} / {}", it.source, it.host)),
            it.score
        ));
    }
    rows.push("</tbody></table>".to_string());
    rows.join("\n")
}

/// Full HTML mail body: greeting, table, sign-off.
pub fn html_body(items: &[NewsItem]) -> String {
    format!(
        "<p>Hallo,</p><p>hier ist dein täglicher Digest (DACH &amp; MENA).</p>{}<p>Viele Grüße</p>",
        html_table(items)
    )
}
