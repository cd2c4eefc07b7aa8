//! Rule-based message insights: summaries, phishing hints, username ideas.
//!
//! Everything here is deterministic string work. There is no model behind
//! the "AI helper", just keyword scans and templates, which keeps the
//! output explainable and trivially testable.

use serde::Serialize;

use crate::store::EmailMessage;

/// Keywords that raise the phishing score by one hit each.
const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "password",
    "reset",
    "urgent",
    "login",
    "verify",
    "credential",
    "click here",
    "limited time",
    "attachment",
    "malware",
    "bank",
];

const DESCRIPTORS: &[&str] = &["stealth", "nova", "zen", "astro", "quant", "pulse"];
const SUFFIXES: &[&str] = &["x", "hq", "fy", "shift", "craft", "ops"];

/// Coarse phishing-risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Outcome of the keyword scan over one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhishingReport {
    pub level: RiskLevel,
    /// Normalized score in `[0, 1]`.
    pub score: f64,
    /// Matched keywords, in scan order.
    pub hints: Vec<String>,
}

impl PhishingReport {
    /// Report when no message is selected: a nominal 0.1 floor rather
    /// than zero, so the gauge never reads "certainly safe".
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            level: RiskLevel::Low,
            score: 0.1,
            hints: Vec::new(),
        }
    }
}

/// Summarize a message: subject plus the first two non-empty body
/// fragments, at most three lines total.
#[must_use]
pub fn summarize(message: &EmailMessage) -> Vec<String> {
    let mut summary = vec![message.subject.trim().to_string()];
    summary.extend(
        message
            .body
            .split(['\r', '\n', '•', '-'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(2)
            .map(ToString::to_string),
    );
    summary.truncate(3);
    summary
}

/// Keyword-substring scan over subject and body.
///
/// Each matched keyword counts one hit; an external http(s) link counts
/// 1.5. The score is `min(1, hits / 5)`, bucketed High above 0.66 and
/// Medium above 0.33.
#[must_use]
pub fn phishing_risk(message: &EmailMessage) -> PhishingReport {
    let haystack = format!("{} {}", message.subject, message.body).to_lowercase();

    let mut hits = 0.0_f64;
    let mut hints = Vec::new();
    for keyword in SUSPICIOUS_KEYWORDS {
        if haystack.contains(keyword) {
            hits += 1.0;
            hints.push((*keyword).to_string());
        }
    }

    if haystack.contains("http://") || haystack.contains("https://") {
        hits += 1.5;
        hints.push("external link detected".to_string());
    }

    let score = (hits / 5.0).min(1.0);
    let level = if score > 0.66 {
        RiskLevel::High
    } else if score > 0.33 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    PhishingReport { level, score, hints }
}

/// Three deterministic username ideas derived from the address's local
/// part. Same input, same suggestions.
#[must_use]
pub fn username_suggestions(email: &str) -> Vec<String> {
    let local = email.split('@').next().unwrap_or_default();
    let sanitized: String = local.chars().filter(char::is_ascii_alphanumeric).collect();
    let stem: String = sanitized.chars().take(4).collect();

    (0..3)
        .map(|index| {
            let descriptor = DESCRIPTORS[(sanitized.len() + index) % DESCRIPTORS.len()];
            let suffix = SUFFIXES[(sanitized.len() * (index + 2)) % SUFFIXES.len()];
            format!("{descriptor}{stem}{suffix}")
        })
        .collect()
}

/// Canned replies keyed off the user's prompt.
#[must_use]
pub fn evaluate_prompt(prompt: &str, has_message: bool) -> Vec<String> {
    let normalized = prompt.to_lowercase();
    let mut replies = vec![if has_message {
        "Updating the mail summary below.".to_string()
    } else {
        "Select a mail so I can guide you.".to_string()
    }];

    if normalized.contains("phishing") {
        replies.push("Phishing report is ready.".to_string());
    }
    if normalized.contains("steps") {
        replies.push("Usage steps are listed below.".to_string());
    }
    if normalized.contains("username") {
        replies.push("Username ideas refreshed.".to_string());
    }
    replies
}

/// Human display size, one decimal at most.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    let exponent = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let value = ((bytes as f64 / 1024_f64.powi(exponent as i32)) * 10.0).round() / 10.0;

    if value.fract() == 0.0 {
        format!("{value:.0} {}", UNITS[exponent])
    } else {
        format!("{value:.1} {}", UNITS[exponent])
    }
}
