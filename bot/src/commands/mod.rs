//! Command parsing and handlers.

pub mod ignore;
pub mod job;
pub mod report;

/// One inbound message, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/begin`
    Begin,
    /// `/list`
    List,
    /// `/summary` or `/summarize`
    Summary,
    /// `/ignore` with its trimmed argument text
    Ignore(String),
    /// `/stop` or `/end`
    End,
    /// Anything that is not a command, trimmed
    Text(String),
    /// A slash command nobody handles
    Unknown(String),
}

impl Command {
    /// Classify a raw message line.
    ///
    /// A `@botname` suffix on the command word is ignored.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Text(trimmed.to_string());
        };

        let (word, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let name = word.split('@').next().unwrap_or(word);
        match name {
            "start" | "begin" => Self::Begin,
            "list" => Self::List,
            "summary" | "summarize" => Self::Summary,
            "ignore" => Self::Ignore(args.trim().to_string()),
            "stop" | "end" => Self::End,
            _ => Self::Unknown(name.to_string()),
        }
    }

    /// Whether this command cancels an in-flight job.
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_and_aliases() {
        assert_eq!(Command::parse("/start"), Command::Begin);
        assert_eq!(Command::parse("/begin"), Command::Begin);
        assert_eq!(Command::parse("/summarize"), Command::Summary);
        assert_eq!(Command::parse("  /end  "), Command::End);
        assert_eq!(Command::parse("/stop@rollcall_bot"), Command::End);
        assert_eq!(Command::parse("/list"), Command::List);
    }

    #[test]
    fn test_parse_ignore_arguments() {
        assert_eq!(
            Command::parse("/ignore  @a @b "),
            Command::Ignore("@a @b".to_string())
        );
        assert_eq!(Command::parse("/ignore"), Command::Ignore(String::new()));
    }

    #[test]
    fn test_parse_text_and_unknown() {
        assert_eq!(
            Command::parse(" https://x.com/a/status/1 "),
            Command::Text("https://x.com/a/status/1".to_string())
        );
        assert_eq!(Command::parse("/help"), Command::Unknown("help".to_string()));
        assert!(Command::parse("/end").is_end());
        assert!(!Command::parse("end").is_end());
    }
}
