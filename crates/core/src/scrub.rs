// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log line sanitization.
//!
//! Worker output arrives raw from terminals: ANSI color codes, carriage
//! returns driving progress bars, and repeated status lines. Lines are
//! cleaned before storage so the bounded tails hold signal, not paint.

use regex::Regex;
use std::sync::OnceLock;

/// Window within which an identical successive line is suppressed.
pub const DUPLICATE_WINDOW_MS: u64 = 1_000;

fn ansi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // CSI sequences, OSC sequences, and lone escapes
        match Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b.") {
            Ok(re) => re,
            Err(_) => unreachable!("static regex"),
        }
    })
}

fn progress_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Bar-and-percent lines ("[====>   ] 42%", "42%|███| 10/24") and
        // spinner-prefixed lines ("⠙ compiling...")
        match Regex::new(
            r"(?x)
            ^(
                \[?[=\#>\-\.\s\u{2500}-\u{25FF}\u{2580}-\u{259F}]*\]?\s*\d{1,3}\s?%.*
              | \d{1,3}\s?%\s*[|\[\u{2580}-\u{259F}].*
              | [\u{2800}-\u{28FF}\u{25D0}-\u{25D7}]\s.*
            )$",
        ) {
            Ok(re) => re,
            Err(_) => unreachable!("static regex"),
        }
    })
}

/// Strip ANSI escapes and carriage returns, collapse whitespace runs, trim.
pub fn clean_line(raw: &str) -> String {
    let stripped = ansi_re().replace_all(raw, "");
    // A CR-driven progress line overwrites itself; keep only the final frame.
    let last_frame = stripped.rsplit('\r').next().unwrap_or("");
    let mut out = String::with_capacity(last_frame.len());
    let mut in_space = true;
    for c in last_frame.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Lines that are pure progress-bar noise are dropped entirely.
pub fn is_progress_noise(cleaned: &str) -> bool {
    !cleaned.is_empty() && progress_re().is_match(cleaned)
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Compact form for user-facing failure text: cleaned and truncated.
pub fn compact(raw: &str, max: usize) -> String {
    truncate(&clean_line(raw), max)
}

/// Suppresses identical successive lines emitted within
/// [`DUPLICATE_WINDOW_MS`] on one stream.
#[derive(Debug, Default, Clone)]
pub struct RecentLineFilter {
    last: Option<(String, u64)>,
}

impl RecentLineFilter {
    /// Returns true when the line should be kept.
    pub fn admit(&mut self, line: &str, now_ms: u64) -> bool {
        if let Some((prev, prev_ms)) = &self.last {
            if prev == line && now_ms.saturating_sub(*prev_ms) < DUPLICATE_WINDOW_MS {
                return false;
            }
        }
        self.last = Some((line.to_string(), now_ms));
        true
    }
}

#[cfg(test)]
#[path = "scrub_tests.rs"]
mod tests;
