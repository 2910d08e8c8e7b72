//! Human-readable rendering of ECCU request records

use chrono::{DateTime, Utc};

use crate::request::EccuRequest;

const SEPARATOR: &str = "----------";

/// Renders request records for the terminal
pub struct EntryRenderer {
    show_colors: bool,
}

impl Default for EntryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryRenderer {
    pub fn new() -> Self {
        Self {
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn plain() -> Self {
        Self { show_colors: false }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn render_all(&self, requests: &[EccuRequest]) -> String {
        if requests.is_empty() {
            return "No requests found.\n".to_string();
        }

        let mut output = String::new();
        for request in requests {
            output.push_str(&self.render(request));
        }
        output.push_str(SEPARATOR);
        output.push('\n');
        output
    }

    pub fn render(&self, request: &EccuRequest) -> String {
        let mut output = String::new();
        output.push_str(SEPARATOR);
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            self.colorize("Request ID:", "1"),
            request.id
        ));

        output.push_str("  Status:\n");
        let code = request
            .status
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let message = request.status.message.as_deref().unwrap_or("-");
        output.push_str(&format!(
            "    Code: {} - {}\n",
            code,
            self.colorize(message, status_color(request.status.code))
        ));
        if let Some(extended) = &request.status.extended {
            output.push_str(&format!("    Message: {}\n", extended));
        }
        if let Some(updated_at) = &request.status.updated_at {
            output.push_str(&format!("    Updated at: {}\n", format_time(updated_at)));
        }

        output.push_str(&format!(
            "  Property: {} ({}){}\n",
            request.property.name.as_deref().unwrap_or("-"),
            request.property.property_type.as_deref().unwrap_or("-"),
            if request.property.exact_match {
                " - exact match"
            } else {
                ""
            }
        ));

        if let Some(notes) = &request.notes {
            output.push_str(&format!("  Notes: {}\n", notes));
        }
        if let Some(email) = &request.email {
            output.push_str(&format!("  Email: {}\n", email));
        }
        if let Some(version) = &request.version {
            output.push_str(&format!("  Version: {}\n", version));
        }

        match (&request.uploaded_by, &request.uploaded_at) {
            (Some(by), Some(at)) => {
                output.push_str(&format!("  Uploaded by {} at {}\n", by, format_time(at)))
            }
            (Some(by), None) => output.push_str(&format!("  Uploaded by {}\n", by)),
            (None, Some(at)) => output.push_str(&format!("  Uploaded at {}\n", format_time(at))),
            (None, None) => {}
        }

        output.push_str(&format!(
            "  File: {}",
            request.file.name.as_deref().unwrap_or("-")
        ));
        if let Some(size) = request.file.size {
            output.push_str(&format!(" ({} bytes)", size));
        }
        if let Some(md5) = &request.file.md5 {
            output.push_str(&format!(" md5 {}", md5));
        }
        output.push('\n');

        if let Some(content) = &request.file.content {
            output.push_str("  Content:\n");
            for line in content.lines() {
                output.push_str(&format!("    {}\n", line));
            }
        }

        output
    }
}

fn status_color(code: Option<u64>) -> &'static str {
    match code {
        Some(1000) => "32",
        Some(c) if c >= 2000 => "31",
        _ => "33",
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
