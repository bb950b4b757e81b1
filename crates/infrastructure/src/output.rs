//! Terminal rendering of requests and responses.

use colored::Colorize;
use quiver_domain::{RequestSpec, ResponseSpec};

/// Prints the outbound request line and headers, for verbose mode.
pub fn print_request(request: &RequestSpec) {
    println!(
        "{} {}",
        request.method.to_string().bold(),
        request.full_url()
    );
    for header in &request.headers {
        println!("{}: {}", header.name.cyan(), header.value);
    }
    println!();
}

/// Prints the response: colored status line, headers, then the body —
/// pretty-printed when the response declares JSON, raw otherwise.
pub fn print_response(response: &ResponseSpec) {
    println!("{}", status_line(response.status));
    for header in &response.headers {
        println!("{}: {}", header.name.cyan(), header.value);
    }
    println!();
    println!("{}", format_body(response));
}

/// Formats the status line, colored by status class.
fn status_line(status: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    let text = format!("HTTP {status} {reason}");
    let colored = match status {
        0..=299 => text.green(),
        300..=399 => text.yellow(),
        400..=499 => text.magenta(),
        500..=599 => text.red(),
        _ => text.white(),
    };
    colored.to_string()
}

/// Renders the body, pretty-printing JSON responses when they parse.
fn format_body(response: &ResponseSpec) -> String {
    if response.is_json() {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&response.body) {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                return pretty;
            }
        }
    }
    String::from_utf8_lossy(&response.body).into_owned()
}
