// ABOUTME: Parses chat input into slash commands or prompt text.
// ABOUTME: Commands manage the conversation in a channel; anything else is a prompt.

/// A conversation-management command typed into a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start [workdir]`: begin a fresh conversation
    Start { workdir: Option<String> },
    /// `/end`: forget the conversation in this channel
    End,
    /// `/status`: show backend, workdir and session
    Status,
    /// `/conversations`: list past conversations the backend knows about
    Conversations,
    /// `/resume <session_id> [workdir]`: continue a past session.
    /// A missing session id is reported back as usage help.
    Resume {
        session_id: Option<String>,
        workdir: Option<String>,
    },
    /// `/help`
    Help,
    /// Any other `/name`
    Unknown(String),
}

impl Command {
    /// Stable name for logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::End => "end",
            Command::Status => "status",
            Command::Conversations => "conversations",
            Command::Resume { .. } => "resume",
            Command::Help => "help",
            Command::Unknown(_) => "unknown",
        }
    }
}

/// What a line of chat input turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Message(String),
    Ignore,
}

pub const HELP_TEXT: &str = "Commands:\n\
    /start [workdir] - Start a new conversation\n\
    /end - End the conversation in this channel\n\
    /status - Show the active conversation\n\
    /conversations - List past conversations\n\
    /resume <session_id> [workdir] - Resume a past conversation\n\
    /help - Show this message";

/// Parse one line of chat input.
///
/// A leading `/` followed by a letter starts a command; names are case
/// insensitive. `//text` escapes a message that should start with `/`.
pub fn parse_input(body: &str) -> Input {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Input::Ignore;
    }

    if let Some(escaped) = trimmed.strip_prefix("//") {
        let escaped = escaped.trim();
        if escaped.is_empty() {
            return Input::Ignore;
        }
        return Input::Message(format!("/{escaped}"));
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Input::Message(trimmed.to_string());
    };
    if !rest.chars().next().is_some_and(char::is_alphabetic) {
        return Input::Message(trimmed.to_string());
    }

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default().to_lowercase();
    let mut arg = || words.next().map(str::to_string);

    let command = match name.as_str() {
        "start" => Command::Start { workdir: arg() },
        "end" => Command::End,
        "status" => Command::Status,
        "conversations" => Command::Conversations,
        "resume" => Command::Resume {
            session_id: arg(),
            workdir: arg(),
        },
        "help" => Command::Help,
        _ => Command::Unknown(name),
    };
    Input::Command(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            parse_input("  fix the build  "),
            Input::Message("fix the build".to_string())
        );
        assert_eq!(parse_input("   "), Input::Ignore);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse_input("/start project"),
            Input::Command(Command::Start {
                workdir: Some("project".to_string())
            })
        );
        assert_eq!(
            parse_input("/START"),
            Input::Command(Command::Start { workdir: None })
        );
        assert_eq!(
            parse_input("/resume abc123 /srv/app"),
            Input::Command(Command::Resume {
                session_id: Some("abc123".to_string()),
                workdir: Some("/srv/app".to_string()),
            })
        );
        assert_eq!(
            parse_input("/resume"),
            Input::Command(Command::Resume {
                session_id: None,
                workdir: None,
            })
        );
        assert_eq!(parse_input("/end"), Input::Command(Command::End));
        assert_eq!(parse_input("/status"), Input::Command(Command::Status));
        assert_eq!(
            parse_input("/conversations"),
            Input::Command(Command::Conversations)
        );
        assert_eq!(
            parse_input("/frobnicate now"),
            Input::Command(Command::Unknown("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_slash_escapes_and_paths() {
        assert_eq!(
            parse_input("//start is a command"),
            Input::Message("/start is a command".to_string())
        );
        assert_eq!(parse_input("//"), Input::Ignore);
        // Not a command: no letter after the slash
        assert_eq!(
            parse_input("/ 42"),
            Input::Message("/ 42".to_string())
        );
        assert_eq!(
            parse_input("/123"),
            Input::Message("/123".to_string())
        );
    }
}
