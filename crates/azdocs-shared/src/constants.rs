/// Default backend origin used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default frontend callback the identity provider redirects to
pub const DEFAULT_CALLBACK_URL: &str = "http://localhost:3000/auth/callback";

/// Query parameter carrying the bearer token on the auth callback
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Canonical session storage keys
pub const KEY_AUTH_TOKEN: &str = "authToken";
pub const KEY_USER_INFO: &str = "userInfo";

/// Legacy session storage keys, read as a fallback and cleared on logout
pub const LEGACY_KEY_TOKEN: &str = "token";
pub const LEGACY_KEY_USER: &str = "user";

/// Backend paths
pub const PATH_LOGIN: &str = "/login";
pub const PATH_CHAT: &str = "/api/chat";
pub const PATH_CHATS: &str = "/api/chats";
pub const PATH_NEW_CHAT: &str = "/api/chats/new";
pub const PATH_UPLOAD_PDF: &str = "/api/upload/pdf";

/// Multipart field names for document upload
pub const FIELD_FILE: &str = "file";
pub const FIELD_ACCESS_LEVEL: &str = "accessLevel";
pub const FIELD_FILE_NAME: &str = "fileName";

/// Title given to conversations when none is supplied
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Title shown for conversations the backend returned without one
pub const UNTITLED_CHAT: &str = "Untitled";

/// Text of the bot message synthesized when a reply could not be obtained
pub const SEND_FAILED_TEXT: &str =
    "Sorry, there was an error processing your request. Please try again later.";

/// Reply used when the assistant had nothing to ground an answer on
pub const NO_ANSWER_TEXT: &str =
    "I'm not sure how to answer your question without searching for more information.";

/// Maximum upload size in bytes (50 MiB)
pub const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;

/// Leading bytes of every PDF file
pub const PDF_MAGIC: &[u8] = b"%PDF";
