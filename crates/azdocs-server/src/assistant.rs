//! A stand-in for the retrieval-augmented assistant.
//!
//! Documents are matched against the question by the words in their file
//! names; the best matches become the reply's references. This is enough
//! to exercise the client's citation rendering without a search service.

use std::collections::HashSet;

use azdocs_shared::constants::NO_ANSWER_TEXT;
use azdocs_shared::protocol::ChatReply;
use azdocs_shared::types::Reference;

use crate::uploads::Document;

/// Maximum number of references attached to one reply.
pub const MAX_REFERENCES: usize = 5;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "how", "what", "with", "does", "are", "can", "you", "about", "pdf",
];

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

pub fn answer(question: &str, documents: &[Document]) -> ChatReply {
    let asked = words(question);

    let mut scored: Vec<(usize, &Document)> = documents
        .iter()
        .map(|doc| (words(&doc.file_name).intersection(&asked).count(), doc))
        .filter(|(score, _)| *score > 0)
        .collect();
    // Stable sort keeps upload order among equal scores.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(MAX_REFERENCES);

    if scored.is_empty() {
        return ChatReply {
            text: NO_ANSWER_TEXT.to_string(),
            references: Vec::new(),
            chat_id: None,
        };
    }

    let references: Vec<Reference> = scored
        .iter()
        .map(|(_, doc)| Reference {
            title: doc.file_name.clone(),
            content: format!(
                "{} document ({} bytes), uploaded {}",
                doc.access_level.label(),
                doc.size,
                doc.uploaded_at.format("%Y-%m-%d")
            ),
        })
        .collect();

    let cited: Vec<String> = references
        .iter()
        .map(|r| format!("[{}]", r.title))
        .collect();

    ChatReply {
        text: format!(
            "I found {} document(s) related to \"{}\": {}.",
            references.len(),
            question.trim(),
            cited.join(", ")
        ),
        references,
        chat_id: None,
    }
}
