use crate::error::AdminCommandError;
use crate::lexer::lex_args;

/// A parsed `//<name> <args...>` or `/<name> <args...>` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn required_arg(&self, index: usize, name: &'static str) -> Result<&str, AdminCommandError> {
        self.arg(index).ok_or(AdminCommandError::MissingArgument(name))
    }
}

pub fn parse(line: &str) -> Result<ParsedCommand, AdminCommandError> {
    let rest = line
        .strip_prefix("//")
        .or_else(|| line.strip_prefix('/'))
        .ok_or(AdminCommandError::MissingPrefix)?;

    let mut tokens = lex_args(rest);
    if tokens.is_empty() {
        return Err(AdminCommandError::EmptyCommand);
    }
    let name = tokens.remove(0);
    Ok(ParsedCommand { name, args: tokens })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_double_slash_command_with_args() {
        let parsed = parse("//kick Bob reason here").unwrap();
        assert_eq!(parsed.name, "kick");
        assert_eq!(parsed.args, vec!["Bob", "reason", "here"]);
    }

    #[test]
    fn parses_a_single_slash_command() {
        let parsed = parse("/heal Bob").unwrap();
        assert_eq!(parsed.name, "heal");
    }

    #[test]
    fn rejects_input_with_no_prefix() {
        assert_eq!(parse("kick Bob"), Err(AdminCommandError::MissingPrefix));
    }

    #[test]
    fn rejects_an_empty_command_name() {
        assert_eq!(parse("//   "), Err(AdminCommandError::EmptyCommand));
    }
}
