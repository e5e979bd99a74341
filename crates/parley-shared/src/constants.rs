/// Application name
pub const APP_NAME: &str = "Parley";

/// Logical key under which the serialized message-list snapshot is cached
pub const SNAPSHOT_KEY: &str = "messages";

/// Logical key holding the display name last greeted with a welcome notice
pub const WELCOME_MARKER_KEY: &str = "storedName";

/// Reserved author id for synthetic system messages
pub const SYSTEM_USER_ID: &str = "system";

/// Display name of the reserved system author
pub const SYSTEM_USER_NAME: &str = "System";

/// Name of the remote message collection
pub const MESSAGES_COLLECTION: &str = "messages";

/// Start-screen theme palette as (background, text) color pairs
pub const THEME_PALETTE: [(&str, &str); 4] = [
    ("#090C08", "#FFF"),
    ("#474056", "#FFF"),
    ("#8A95A5", "#000"),
    ("#B9C6AE", "#000"),
];

/// Body of the one-time system notice posted when a new name joins the room.
pub fn welcome_text(display_name: &str) -> String {
    format!("{display_name} has entered the chat. Welcome 👋")
}
