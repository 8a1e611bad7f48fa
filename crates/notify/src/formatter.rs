//! Per-recipient message formatting.
//!
//! Every message is personalised: besides the greeting, each one carries a
//! mute link minted for that recipient's email, so recipients are never
//! batched into a single message.

use std::collections::BTreeMap;

use marginalia_core::mute_token::MuteTokenCodec;
use marginalia_core::types::DbId;
use serde::Serialize;

use crate::event::{CommentCreated, ReplyCreated};
use crate::store::Recipient;

/// Longest paper title shown verbatim in a subject line.
pub const MAX_SUBJECT_TITLE_CHARS: usize = 40;

/// Appended to titles cut at [`MAX_SUBJECT_TITLE_CHARS`].
const ELLIPSIS: &str = "...";

/// Template identifier understood by the mail provider.
pub const NEW_REPLY_TEMPLATE: &str = "new_reply";

/// Variable keys populated on every message.
pub mod vars {
    pub const FIRST_NAME: &str = "first_name";
    pub const TEXT: &str = "text";
    pub const LINK: &str = "link";
    pub const MUTE_LINK: &str = "mute_link";
}

// ---------------------------------------------------------------------------
// OutgoingEmail
// ---------------------------------------------------------------------------

/// The payload handed to a [`MailGateway`](crate::MailGateway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub recipient_address: String,
    pub recipient_name: String,
    pub subject: String,
    pub template: String,
    pub variables: BTreeMap<String, String>,
}

impl OutgoingEmail {
    /// Look up a template variable.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// LinkConfig
// ---------------------------------------------------------------------------

/// Where paper and mute links point.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Frontend origin, e.g. `https://app.example.org`.
    pub frontend_base_url: String,
    /// Prefix the mute token is appended to.
    pub unsubscribe_base_url: String,
}

impl LinkConfig {
    /// Derive both bases from the frontend origin; mute links land on
    /// `{frontend}/user/unsubscribe/{token}`.
    pub fn new(frontend_base_url: impl Into<String>) -> Self {
        let frontend_base_url = frontend_base_url.into().trim_end_matches('/').to_string();
        let unsubscribe_base_url = format!("{frontend_base_url}/user/unsubscribe");
        Self {
            frontend_base_url,
            unsubscribe_base_url,
        }
    }

    /// Link to a paper, optionally anchored to one comment.
    pub fn paper_url(&self, paper_id: &str, comment_id: Option<DbId>) -> String {
        let base = self.frontend_base_url.trim_end_matches('/');
        match comment_id {
            Some(id) => format!("{base}/paper/{paper_id}#highlight-{id}"),
            None => format!("{base}/paper/{paper_id}"),
        }
    }

    pub fn unsubscribe_url(&self, token: &str) -> String {
        format!("{}/{token}", self.unsubscribe_base_url.trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// NotificationFormatter
// ---------------------------------------------------------------------------

/// Builds [`OutgoingEmail`]s for resolved recipients.
#[derive(Debug, Clone)]
pub struct NotificationFormatter {
    codec: MuteTokenCodec,
    links: LinkConfig,
}

impl NotificationFormatter {
    pub fn new(codec: MuteTokenCodec, links: LinkConfig) -> Self {
        Self { codec, links }
    }

    /// Message telling `recipient` about a new comment on a paper they
    /// commented on.
    pub fn new_comment(&self, recipient: &Recipient, event: &CommentCreated) -> OutgoingEmail {
        let text = format!(
            "A new comment was posted on a paper you are following - {}. Click below to view:",
            event.paper_title
        );
        let link = self
            .links
            .paper_url(&event.paper_id, Some(event.new_comment_id));
        let subject = format!("New comment on {}", shorten_title(&event.paper_title));
        self.build(recipient, &event.paper_id, subject, text, link)
    }

    /// Message telling `recipient` someone replied to their comment.
    pub fn new_reply(&self, recipient: &Recipient, event: &ReplyCreated) -> OutgoingEmail {
        let text = format!(
            "You have got a new reply to your comment on '{}'",
            event.paper_title
        );
        let link = self.links.paper_url(&event.paper_id, None);
        let subject = "You have got a new reply to your comment".to_string();
        self.build(recipient, &event.paper_id, subject, text, link)
    }

    /// A fresh mute link for `(email, paper_id)`.
    pub fn mute_link(&self, email: &str, paper_id: &str) -> String {
        self.links
            .unsubscribe_url(&self.codec.mint(email, paper_id))
    }

    fn build(
        &self,
        recipient: &Recipient,
        paper_id: &str,
        subject: String,
        text: String,
        link: String,
    ) -> OutgoingEmail {
        let variables = BTreeMap::from([
            (vars::FIRST_NAME.to_string(), recipient.name.clone()),
            (vars::TEXT.to_string(), text),
            (vars::LINK.to_string(), link),
            (
                vars::MUTE_LINK.to_string(),
                self.mute_link(&recipient.email, paper_id),
            ),
        ]);

        OutgoingEmail {
            recipient_address: recipient.email.clone(),
            recipient_name: recipient.name.clone(),
            subject,
            template: NEW_REPLY_TEMPLATE.to_string(),
            variables,
        }
    }
}

/// Cut `title` to [`MAX_SUBJECT_TITLE_CHARS`] characters plus an ellipsis.
///
/// Counts characters, not bytes, so multi-byte titles are never split
/// mid-character. Titles at or under the limit are returned unchanged.
pub fn shorten_title(title: &str) -> String {
    match title.char_indices().nth(MAX_SUBJECT_TITLE_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &title[..cut]),
        None => title.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
