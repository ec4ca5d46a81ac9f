use serde::{Deserialize, Serialize};

use crate::constants::UNTITLED_CHAT;
use crate::error::SharedError;

// Conversation identifier. Client-minted ids are millisecond timestamps,
// server-issued ones are whatever the backend hands out; both are kept as
// opaque strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "RawConversationId", into = "String")]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a client-side id from the current wall clock (milliseconds).
    pub fn mint() -> Self {
        Self::mint_unique(|_| false)
    }

    /// Like [`mint`](Self::mint), but bumps the millisecond until `taken`
    /// no longer claims the candidate.
    pub fn mint_unique(taken: impl Fn(&ConversationId) -> bool) -> Self {
        let mut millis = chrono::Utc::now().timestamp_millis();
        loop {
            let candidate = Self(millis.to_string());
            if !taken(&candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConversationId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<RawConversationId> for ConversationId {
    fn from(raw: RawConversationId) -> Self {
        match raw {
            RawConversationId::Text(s) => Self(s),
            RawConversationId::Integer(n) => Self(n.to_string()),
            RawConversationId::Float(f) => Self(f.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => f.write_str("user"),
            Sender::Bot => f.write_str("bot"),
        }
    }
}

/// A citation attached to an assistant reply.
///
/// The backend has sent references both flat (`{title, content}`) and
/// wrapped (`{index, reference: {title, content}}`); both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawReference")]
pub struct Reference {
    pub title: String,
    pub content: String,
}

#[derive(Deserialize)]
struct FlatReference {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Wrapped {
        reference: FlatReference,
        #[serde(default)]
        #[allow(dead_code)]
        index: Option<u32>,
    },
    Flat(FlatReference),
}

impl From<RawReference> for Reference {
    fn from(raw: RawReference) -> Self {
        let flat = match raw {
            RawReference::Wrapped { reference, .. } => reference,
            RawReference::Flat(flat) => flat,
        };
        Self {
            title: flat.title,
            content: flat.content,
        }
    }
}

/// One entry of a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Locally unique ordinal; assigned by whoever owns the transcript.
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            references: Vec::new(),
            is_error: false,
        }
    }

    pub fn bot(id: u64, text: impl Into<String>, references: Vec<Reference>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
            references,
            is_error: false,
        }
    }

    /// A bot message standing in for a reply that never arrived.
    pub fn error(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Bot,
            references: Vec::new(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(default = "untitled")]
    pub title: String,
}

impl Conversation {
    pub fn new(id: ConversationId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

fn untitled() -> String {
    UNTITLED_CHAT.to_string()
}

/// Visibility tag of an uploaded document. Enforcement happens entirely on
/// the backend; the client only validates the range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "u8")]
pub struct AccessLevel(u8);

impl AccessLevel {
    pub const PUBLIC: AccessLevel = AccessLevel(1);
    pub const INTERNAL: AccessLevel = AccessLevel(2);
    pub const CONFIDENTIAL: AccessLevel = AccessLevel(3);
    pub const RESTRICTED: AccessLevel = AccessLevel(4);
    pub const TOP_SECRET: AccessLevel = AccessLevel(5);

    pub const ALL: [AccessLevel; 5] = [
        Self::PUBLIC,
        Self::INTERNAL,
        Self::CONFIDENTIAL,
        Self::RESTRICTED,
        Self::TOP_SECRET,
    ];

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Public",
            2 => "Internal",
            3 => "Confidential",
            4 => "Restricted",
            _ => "Top Secret",
        }
    }

    pub fn description(self) -> &'static str {
        match self.0 {
            1 => "Accessible to all users",
            2 => "Internal company documents",
            3 => "Confidential information",
            4 => "Highly restricted access",
            _ => "Maximum security clearance required",
        }
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::PUBLIC
    }
}

impl TryFrom<i64> for AccessLevel {
    type Error = SharedError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1..=5 => Ok(Self(value as u8)),
            other => Err(SharedError::InvalidAccessLevel(other)),
        }
    }
}

impl From<AccessLevel> for u8 {
    fn from(level: AccessLevel) -> Self {
        level.0
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s
            .trim()
            .parse()
            .map_err(|_| SharedError::InvalidAccessLevel(-1))?;
        Self::try_from(n)
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level {} - {}", self.0, self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_accepts_numbers_and_strings() {
        let c: Conversation = serde_json::from_str(r#"{"id": 42, "title": "x"}"#).unwrap();
        assert_eq!(c.id.as_str(), "42");

        let c: Conversation = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(c.id.as_str(), "abc");
        assert_eq!(c.title, UNTITLED_CHAT);

        let c: Conversation = serde_json::from_str(r#"{"id": 1712345.5}"#).unwrap();
        assert_eq!(c.id.as_str(), "1712345.5");
    }

    #[test]
    fn mint_unique_skips_taken_ids() {
        let first = ConversationId::mint();
        let second = ConversationId::mint_unique(|c| c == &first);
        assert_ne!(first, second);
        let n: i64 = second.as_str().parse().unwrap();
        assert!(n >= first.as_str().parse::<i64>().unwrap());
    }

    #[test]
    fn conversation_id_serializes_as_string() {
        let json = serde_json::to_value(ConversationId::new("7")).unwrap();
        assert_eq!(json, serde_json::json!("7"));
    }

    #[test]
    fn reference_accepts_both_shapes() {
        let flat: Reference =
            serde_json::from_str(r#"{"title": "A", "content": "a"}"#).unwrap();
        let wrapped: Reference = serde_json::from_str(
            r#"{"index": 0, "reference": {"title": "A", "content": "a"}}"#,
        )
        .unwrap();
        assert_eq!(flat, wrapped);
    }

    #[test]
    fn sender_accepts_assistant_alias() {
        let s: Sender = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(s, Sender::Bot);
    }

    #[test]
    fn access_level_range() {
        assert!(AccessLevel::try_from(0).is_err());
        assert!(AccessLevel::try_from(6).is_err());
        assert_eq!(AccessLevel::try_from(3).unwrap(), AccessLevel::CONFIDENTIAL);
        assert_eq!("5".parse::<AccessLevel>().unwrap().label(), "Top Secret");
        assert!(serde_json::from_str::<AccessLevel>("9").is_err());
    }

    #[test]
    fn error_message_is_flagged_bot() {
        let m = Message::error(3, "oops");
        assert_eq!(m.sender, Sender::Bot);
        assert!(m.is_error);
    }
}
