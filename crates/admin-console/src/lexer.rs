use logos::Logos;

/// Tokenizes the argument portion of an admin command line (the command
/// prefix and name are split off before lexing begins — see
/// `command::parse`). Grounded on the teacher's `command-parser` crate,
/// which lexes chat/rcon input with `logos` the same way.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    #[regex(r#""([^"\\]|\\.)*""#, unquote)]
    QuotedString(String),

    #[regex(r"[^\s\"]+", |lex| lex.slice().to_string())]
    Word(String),
}

fn unquote(lex: &mut logos::Lexer<Token>) -> String {
    let raw = lex.slice();
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn lex_args(input: &str) -> Vec<String> {
    Token::lexer(input)
        .filter_map(|result| result.ok())
        .map(|token| match token {
            Token::QuotedString(s) | Token::Word(s) => s,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(lex_args("kick Bob 5"), vec!["kick", "Bob", "5"]);
    }

    #[test]
    fn keeps_a_quoted_string_as_one_token() {
        assert_eq!(
            lex_args(r#"announce "server restarting soon""#),
            vec!["announce", "server restarting soon"]
        );
    }

    #[test]
    fn unescapes_backslash_escapes_inside_quotes() {
        assert_eq!(lex_args(r#"say "quote: \" here""#), vec!["say", r#"quote: " here"#]);
    }
}
