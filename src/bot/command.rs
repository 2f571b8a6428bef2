//! Chat command parsing

/// A parsed chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`, `/help`
    Help,
    /// `/watch <token>` or plain text
    Watch(String),
    /// `/unwatch <token>`
    Unwatch(String),
    /// `/list`
    List,
    /// `/chart [token]`
    Chart(Option<String>),
    /// `/top`
    Top,
    /// `/new`
    New,
    /// Any other slash command
    Unknown(String),
}

impl Command {
    /// Parse message text; blank messages yield `None`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(rest) = text.strip_prefix('/') else {
            return Some(Command::Watch(text.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        // Group chats address commands as /cmd@BotName
        let name = name.split('@').next().unwrap_or(name).to_lowercase();
        let arg = (!arg.is_empty()).then(|| arg.to_string());

        Some(match name.as_str() {
            "start" | "help" => Command::Help,
            "watch" | "add" | "check" => Command::Watch(arg.unwrap_or_default()),
            "unwatch" | "remove" => Command::Unwatch(arg.unwrap_or_default()),
            "list" => Command::List,
            "chart" => Command::Chart(arg),
            "top" => Command::Top,
            "new" => Command::New,
            _ => Command::Unknown(name),
        })
    }
}
