//! Synthetic mail generation.
//!
//! Messages are drawn from a small pool of templates. A few of them carry
//! phishing-flavoured wording and external links on purpose, so the helper's
//! risk scan has realistic input to chew on.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use super::types::{Attachment, AttachmentKind, EmailMessage};

#[derive(Debug, Clone, Copy)]
struct MailTemplate {
    from: &'static str,
    subject: &'static str,
    body: &'static str,
}

const TEMPLATES: &[MailTemplate] = &[
    MailTemplate {
        from: "welcome@orbitnotes.app",
        subject: "Welcome to OrbitNotes",
        body: "Hi there\nYour workspace is ready.\nInvite your team whenever you like.",
    },
    MailTemplate {
        from: "digest@weeklybrew.dev",
        subject: "Your weekly digest is here",
        body: "Top stories this week:\n• Rust 2024 edition tips\n• Faster CI pipelines\n• Reader picks",
    },
    MailTemplate {
        from: "receipts@cloudhavn.io",
        subject: "Payment receipt #48213",
        body: "Thanks for your purchase.\nAmount: $12.00\nNo action is needed.",
    },
    MailTemplate {
        from: "security@accounts-verify.net",
        subject: "Urgent: verify your login",
        body: "We noticed a sign-in attempt.\nClick here to reset your password: https://accounts-verify.net/reset\nThis is a limited time link.",
    },
    MailTemplate {
        from: "no-reply@skyparcel.co",
        subject: "Your parcel is out for delivery",
        body: "Courier update\n• Arriving today between 2-4 pm\nTrack it here: https://skyparcel.co/t/8842",
    },
    MailTemplate {
        from: "team@pixelforge.studio",
        subject: "Draft review requested",
        body: "A teammate shared a draft with you.\nOpen the attachment to leave comments.",
    },
];

const ATTACHMENTS: &[(&str, &str, AttachmentKind)] = &[
    ("invoice.pdf", "https://files.cloudhavn.io/invoice.pdf", AttachmentKind::Pdf),
    ("banner.png", "https://cdn.pixelforge.studio/banner.png", AttachmentKind::Image),
    ("notes.txt", "https://files.orbitnotes.app/notes.txt", AttachmentKind::Text),
    ("tracking", "https://skyparcel.co/t/8842", AttachmentKind::Link),
];

/// Generate a fresh inbox address under the given domain.
#[must_use]
pub fn generate_address(domain: &str) -> String {
    const ADJECTIVES: &[&str] = &["brisk", "lunar", "quiet", "amber", "nova", "cobalt"];
    const NOUNS: &[&str] = &["fox", "otter", "comet", "willow", "ridge", "sparrow"];

    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("nova");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("fox");
    let tag: u16 = rng.gen_range(0..10_000);
    format!("{adjective}.{noun}.{tag:04}@{domain}")
}

/// Synthesize one message addressed to `to` for the given session.
#[must_use]
pub fn synthesize(session_id: &str, to: &str) -> EmailMessage {
    let mut rng = rand::thread_rng();
    let template = TEMPLATES
        .choose(&mut rng)
        .copied()
        .unwrap_or(TEMPLATES[0]);

    let attachments = if rng.gen_bool(0.4) {
        let (name, url, kind) = ATTACHMENTS.choose(&mut rng).copied().unwrap_or(ATTACHMENTS[0]);
        vec![Attachment {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            url: url.to_string(),
            kind,
            size: rng.gen_range(2_000..900_000),
        }]
    } else {
        Vec::new()
    };

    EmailMessage {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        from: template.from.to_string(),
        to: to.to_string(),
        subject: template.subject.to_string(),
        body: template.body.to_string(),
        received_at: Utc::now().timestamp_millis(),
        attachments,
    }
}
