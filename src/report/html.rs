use super::{Entry, Status, Summary, TIMESTAMP_FORMAT};
use crate::expiry::Tier;
use std::fmt::Write;

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style type="text/css">
a:link, a:visited { text-decoration: none; color: black; }
a:hover, a:active { text-decoration: underline; color: black; }
table { border-collapse: collapse; }
th, td { padding: 4px 8px; text-align: left; }
.error { background-color: red; color: black; }
.warning { background-color: orange; color: black; }
.info { background-color: yellow; color: black; }
.unknown { background-color: lightgray; color: black; }
</style>
</head>
<body>
"#;

const TAIL: &str = "</table>\n</body>\n</html>\n";

/// Row class for a tier, `None` when the row needs no highlight
#[must_use]
pub const fn tier_class(tier: Tier) -> Option<&'static str> {
    match tier {
        Tier::Expired => Some("error"),
        Tier::Critical => Some("warning"),
        Tier::Warning => Some("info"),
        Tier::Ok => None,
    }
}

/// Render the HTML body, one table row per site
#[must_use]
pub fn render_html(title: &str, entries: &[Entry]) -> String {
    let mut out = HEAD.replace("{{title}}", &escape(title));

    let _ = writeln!(out, "<p>{}</p>", escape(&Summary::from_entries(entries).line()));
    out.push_str(
        "<table>\n<tr><th>Site</th><th>Subject</th><th>Issuer</th><th>Valid from</th><th>Valid to</th><th>Expires in (days)</th></tr>\n",
    );

    for entry in entries {
        let url = escape(&entry.site.url);

        match (&entry.status, entry.site.certificate()) {
            (Status::Classified(expiry), Some(certificate)) => {
                match tier_class(expiry.tier) {
                    Some(class) => {
                        let _ = write!(out, "<tr class=\"{class}\">");
                    }
                    None => out.push_str("<tr>"),
                }
                let _ = writeln!(
                    out,
                    "<td><a href=\"{url}\">{url}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape(&certificate.subject),
                    escape(&certificate.issuer),
                    certificate.valid_from.format(TIMESTAMP_FORMAT),
                    certificate.valid_to.format(TIMESTAMP_FORMAT),
                    expiry.remaining_days,
                );
            }
            (Status::Undetermined(reason), _) => {
                let _ = writeln!(
                    out,
                    "<tr class=\"unknown\"><td><a href=\"{url}\">{url}</a></td><td colspan=\"5\">Could not determine certificate expiry: {}</td></tr>",
                    escape(reason),
                );
            }
            (Status::Classified(_), None) => {
                let _ = writeln!(
                    out,
                    "<tr class=\"unknown\"><td><a href=\"{url}\">{url}</a></td><td colspan=\"5\">Could not determine certificate expiry</td></tr>",
                );
            }
        }
    }

    out.push_str(TAIL);
    out
}

/// Escape text for use in HTML content and quoted attributes
#[must_use]
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::{
        report::{
            sort_by_urgency,
            tests::{failed, inspected, now},
        },
        site::{Certificate, Site},
    };
    use chrono::Duration;

    fn row_for<'a>(html: &'a str, url: &str) -> &'a str {
        html.lines()
            .find(|line| line.contains(&format!("<a href=\"{url}\">")))
            .unwrap()
    }

    #[test]
    fn test_tier_classes() {
        assert_eq!(tier_class(Tier::Expired), Some("error"));
        assert_eq!(tier_class(Tier::Critical), Some("warning"));
        assert_eq!(tier_class(Tier::Warning), Some("info"));
        assert_eq!(tier_class(Tier::Ok), None);
    }

    #[test]
    fn test_render_html_rows() {
        let entries = sort_by_urgency(
            vec![
                inspected("https://ok.example.com", 90),
                inspected("https://expired.example.com", -1),
                inspected("https://critical.example.com", 2),
                inspected("https://warning.example.com", 12),
                failed("https://down.example.com", "connection refused"),
            ],
            now(),
        );
        let html = render_html("Status for certificates", &entries);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Status for certificates</title>"));
        assert!(html.ends_with("</html>\n"));

        assert!(row_for(&html, "https://expired.example.com").starts_with("<tr class=\"error\">"));
        assert!(row_for(&html, "https://critical.example.com").starts_with("<tr class=\"warning\">"));
        assert!(row_for(&html, "https://warning.example.com").starts_with("<tr class=\"info\">"));
        assert!(row_for(&html, "https://ok.example.com").starts_with("<tr><td>"));

        let down = row_for(&html, "https://down.example.com");
        assert!(down.starts_with("<tr class=\"unknown\">"));
        assert!(down.contains("connection refused"));

        let expired = row_for(&html, "https://expired.example.com");
        assert!(expired.contains("<td>2026-10-18 09:00:00 UTC</td><td>-1</td></tr>"));
    }

    #[test]
    fn test_render_html_order_matches_entries() {
        let entries = sort_by_urgency(
            vec![
                inspected("https://a.example.com", 45),
                inspected("https://b.example.com", -3),
                inspected("https://c.example.com", 5),
            ],
            now(),
        );
        let html = render_html("t", &entries);
        let b = html.find("https://b.example.com").unwrap();
        let c = html.find("https://c.example.com").unwrap();
        let a = html.find("https://a.example.com").unwrap();
        assert!(b < c && c < a);
    }

    #[test]
    fn test_render_html_escapes_certificate_fields() {
        let mut site = Site::new("https://a.example.com/?q=\"><script>");
        site.populate(Certificate {
            subject: "CN=<script>alert(1)</script>".to_string(),
            issuer: "O=Tom & Jerry's CA".to_string(),
            valid_from: now() - Duration::days(1),
            valid_to: now() + Duration::days(100),
        });
        let html = render_html("<b>subject</b>", &sort_by_urgency(vec![site], now()));

        assert!(!html.contains("<script>"));
        assert!(html.contains("CN=&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("O=Tom &amp; Jerry&#39;s CA"));
        assert!(html.contains("href=\"https://a.example.com/?q=&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("<title>&lt;b&gt;subject&lt;/b&gt;</title>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
