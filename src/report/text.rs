use super::{Entry, Status, Summary, TIMESTAMP_FORMAT, severity_line};
use std::fmt::Write;

/// Render the plain-text body, one block per site separated by blank lines
#[must_use]
pub fn render_text(entries: &[Entry]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}\n", Summary::from_entries(entries).line());

    for entry in entries {
        let _ = writeln!(out, "{}", clean(&entry.site.url));

        match (&entry.status, entry.site.certificate()) {
            (Status::Classified(expiry), Some(certificate)) => {
                if let Some(line) = severity_line(expiry) {
                    let _ = writeln!(out, "{line}");
                }
                let _ = writeln!(out, "Subject: {}", clean(&certificate.subject));
                let _ = writeln!(out, "Issuer: {}", clean(&certificate.issuer));
                let _ = writeln!(
                    out,
                    "Valid from: {}",
                    certificate.valid_from.format(TIMESTAMP_FORMAT)
                );
                let _ = writeln!(
                    out,
                    "Valid to: {}",
                    certificate.valid_to.format(TIMESTAMP_FORMAT)
                );
                let _ = writeln!(out, "Expires in: {} days", expiry.remaining_days);
            }
            (Status::Undetermined(reason), _) => {
                let _ = writeln!(
                    out,
                    "UNDETERMINED: could not determine certificate expiry ({})",
                    clean(reason)
                );
            }
            (Status::Classified(_), None) => {
                let _ = writeln!(out, "UNDETERMINED: could not determine certificate expiry");
            }
        }

        out.push('\n');
    }

    out
}

/// Replace control characters so untrusted values cannot forge extra lines
fn clean(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
