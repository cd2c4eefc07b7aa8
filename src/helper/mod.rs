//! Rule-based "AI helper": summaries, phishing hints, username ideas, and
//! the voice capability seam.

mod insights;
pub mod speech;

pub use insights::{
    evaluate_prompt, format_bytes, phishing_risk, summarize, username_suggestions, PhishingReport,
    RiskLevel,
};
pub use speech::{NullSpeech, SpeechCapability};
