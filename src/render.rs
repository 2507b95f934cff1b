// Server-rendered HTML for GET /

use crate::aggregator::StatusView;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;
use std::time::Duration;

/// `m:ss`, seconds rounded up.
pub fn format_countdown(remaining: Duration) -> String {
    let total_secs = remaining.as_millis().div_ceil(1000);
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

pub fn render_page(view: &StatusView) -> String {
    let mut html = String::with_capacity(1024 + view.statuses.len() * 256);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Status Check</title>\n</head>\n<body>\n<main>\n<header>\n");
    html.push_str("<h1>Status Check</h1>\n");
    let _ = writeln!(
        html,
        "<div class=\"countdown\">Next refresh: {}&nbsp;&mdash;&nbsp;<form method=\"post\" action=\"/refresh\" style=\"display:inline\"><button type=\"submit\">Refresh Now</button></form></div>",
        format_countdown(Duration::from_secs(view.next_refresh_secs))
    );
    html.push_str("</header>\n");
    if view.loading {
        html.push_str("<p>Loading...</p>\n");
    }
    html.push_str("<ul>\n");
    for status in &view.statuses {
        let name = encode_text(&status.name);
        let name = if status.indicator.is_emphasized() {
            format!("<strong>{}</strong>", name)
        } else {
            name.into_owned()
        };
        let _ = writeln!(
            html,
            "<li class=\"statuspage {}\"><a class=\"link\" href=\"{}\" rel=\"noreferrer\" target=\"_blank\"><span class=\"indicator\"></span><span class=\"name\">{}</span> <span class=\"description\">{}</span></a></li>",
            status.indicator.css_class(),
            encode_double_quoted_attribute(&status.url),
            name,
            encode_text(&status.description),
        );
    }
    html.push_str("</ul>\n</main>\n</body>\n</html>\n");
    html
}
