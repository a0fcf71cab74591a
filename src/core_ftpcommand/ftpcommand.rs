use crate::core_ftpcommand::error::CommandError;

#[derive(Eq, Hash, PartialEq, Debug, Clone)]
pub enum FtpCommand {
    USER,
    QUIT,
    SYST,
    PORT,
    PASV,
    LIST,
    RETR,
    STOR,
    FEAT,
    PWD,
    CWD,
    TYPE,
    NOOP,
    Unknown(String),
}

impl FtpCommand {
    pub fn from_verb(verb: &str) -> FtpCommand {
        match verb.to_ascii_uppercase().as_str() {
            "USER" => FtpCommand::USER,
            "QUIT" => FtpCommand::QUIT,
            "SYST" => FtpCommand::SYST,
            "PORT" => FtpCommand::PORT,
            "PASV" => FtpCommand::PASV,
            "LIST" => FtpCommand::LIST,
            "RETR" => FtpCommand::RETR,
            "STOR" => FtpCommand::STOR,
            "FEAT" => FtpCommand::FEAT,
            "PWD" => FtpCommand::PWD,
            "CWD" => FtpCommand::CWD,
            "TYPE" => FtpCommand::TYPE,
            "NOOP" => FtpCommand::NOOP,
            other => FtpCommand::Unknown(other.to_string()),
        }
    }
}

/// One request line split into its verb and the untokenized remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub command: FtpCommand,
    pub verb: String,
    pub arg: String,
}

/// Splits `VERB [argument]`. The argument is everything after the first
/// space, trimmed; a line without one gets an empty argument.
pub fn parse_command_line(line: &str) -> Result<CommandLine, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (verb, arg) = match line.trim_start().split_once(' ') {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line.trim(), ""),
    };

    if verb.is_empty() {
        return Err(CommandError::MissingVerb);
    }

    let verb = verb.to_ascii_uppercase();
    Ok(CommandLine {
        command: FtpCommand::from_verb(&verb),
        verb,
        arg: arg.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verb_and_argument() {
        let line = parse_command_line("RETR foo.txt\r\n").unwrap();
        assert_eq!(line.command, FtpCommand::RETR);
        assert_eq!(line.verb, "RETR");
        assert_eq!(line.arg, "foo.txt");

        let line = parse_command_line("pwd\r\n").unwrap();
        assert_eq!(line.command, FtpCommand::PWD);
        assert_eq!(line.arg, "");
    }

    #[test]
    fn test_argument_is_not_tokenized() {
        let line = parse_command_line("STOR  a b  \r\n").unwrap();
        assert_eq!(line.command, FtpCommand::STOR);
        assert_eq!(line.arg, "a b");
    }

    #[test]
    fn test_unknown_verb() {
        let line = parse_command_line("MLSD /\r\n").unwrap();
        assert_eq!(line.command, FtpCommand::Unknown("MLSD".to_string()));
    }

    #[test]
    fn test_blank_line_has_no_verb() {
        for input in ["\r\n", "\n", "   \r\n", ""] {
            assert!(matches!(
                parse_command_line(input),
                Err(CommandError::MissingVerb)
            ));
        }
    }
}
