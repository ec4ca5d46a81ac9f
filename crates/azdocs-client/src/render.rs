//! Plain-text rendering for the terminal.

use azdocs_shared::token::Claims;
use azdocs_shared::types::{Conversation, ConversationId, Sender};

use crate::views::{format_file_size, EntryStatus, TranscriptEntry, UploadItem, UploadResult, UploadStatus};

/// Reference excerpts longer than this are cut.
const EXCERPT_CHARS: usize = 160;

pub fn transcript_entry(entry: &TranscriptEntry) -> String {
    let message = &entry.message;
    let mut out = match message.sender {
        Sender::User => {
            let marker = match entry.status {
                EntryStatus::Pending => " (sending...)",
                EntryStatus::Failed => " (not delivered)",
                EntryStatus::Confirmed => "",
            };
            format!("You{marker}: {}", message.text)
        }
        Sender::Bot if message.is_error => format!("Assistant [error]: {}", message.text),
        Sender::Bot => format!("Assistant: {}", message.text),
    };

    if !message.references.is_empty() {
        out.push_str("\n  Sources:");
        for (i, reference) in message.references.iter().enumerate() {
            out.push_str(&format!("\n  [{}] {}", i + 1, reference.title));
            let excerpt = excerpt(&reference.content);
            if !excerpt.is_empty() {
                out.push_str(&format!(" - {excerpt}"));
            }
        }
    }
    out
}

pub fn transcript(entries: &[TranscriptEntry]) -> String {
    if entries.is_empty() {
        return "(no messages yet)".to_string();
    }
    entries
        .iter()
        .map(transcript_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn conversation_list(conversations: &[Conversation], active: Option<&ConversationId>) -> String {
    if conversations.is_empty() {
        return "(no conversations)".to_string();
    }
    conversations
        .iter()
        .map(|c| {
            let marker = if Some(&c.id) == active { '*' } else { ' ' };
            format!("{marker} {}  {}", c.id, c.title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn upload_item(item: &UploadItem) -> String {
    format!(
        "#{} {} ({}) - {}",
        item.id,
        item.name,
        format_file_size(item.size_bytes),
        item.access_level
    )
}

pub fn upload_result(result: &UploadResult) -> String {
    match (result.status, &result.blob_url) {
        (UploadStatus::Success, Some(url)) => format!("ok    {}: {}", result.file_name, url),
        (UploadStatus::Success, None) => format!("ok    {}: {}", result.file_name, result.message),
        _ => format!("error {}: {}", result.file_name, result.message),
    }
}

pub fn identity(claims: &Claims) -> String {
    let mut lines = vec![format!(
        "Signed in as {}",
        claims.display_name().unwrap_or("(unknown user)")
    )];
    if let Some(email) = claims.email() {
        lines.push(format!("  email:   {email}"));
    }
    if let Some(sub) = claims.subject() {
        lines.push(format!("  subject: {sub}"));
    }
    let roles = claims.roles();
    if !roles.is_empty() {
        lines.push(format!("  roles:   {}", roles.join(", ")));
    }
    if let Some(exp) = claims.expires_at() {
        lines.push(format!("  expires: {}", exp.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines.join("\n")
}

fn excerpt(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use azdocs_shared::types::{Message, Reference};

    #[test]
    fn renders_statuses_and_sources() {
        let failed = TranscriptEntry {
            message: Message::user(1, "hi"),
            status: EntryStatus::Failed,
        };
        assert_eq!(transcript_entry(&failed), "You (not delivered): hi");

        let reply = TranscriptEntry {
            message: Message::bot(
                2,
                "See the guide.",
                vec![Reference {
                    title: "Guide".into(),
                    content: "line one\n  line two".into(),
                }],
            ),
            status: EntryStatus::Confirmed,
        };
        assert_eq!(
            transcript_entry(&reply),
            "Assistant: See the guide.\n  Sources:\n  [1] Guide - line one line two"
        );
    }

    #[test]
    fn long_excerpts_are_cut() {
        let long = "word ".repeat(100);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= EXCERPT_CHARS + 3);
    }

    #[test]
    fn active_conversation_is_marked() {
        let list = vec![
            Conversation::new("1".into(), "One"),
            Conversation::new("2".into(), "Two"),
        ];
        let active = ConversationId::new("2");
        assert_eq!(conversation_list(&list, Some(&active)), "  1  One\n* 2  Two");
    }
}
