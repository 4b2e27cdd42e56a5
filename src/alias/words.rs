// src/alias/words.rs
//! POSIX-shell word splitting for alias expansions.

use std::{iter::Peekable, str::Chars};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WordsError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("trailing backslash")]
    TrailingEscape,
}

/// Splits `input` into words the way `sh` would, without expansions.
///
/// Whitespace separates words; single quotes are literal; double quotes
/// honour `\\`, `\"`, `\$` and `` \` ``; a backslash elsewhere escapes the
/// next character; `#` at the start of a word comments out the line.
pub fn split(input: &str) -> Result<Vec<String>, WordsError> {
    let mut words = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.peek() {
            None => break,
            Some('#') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            Some(_) => {}
        }

        words.push(read_word(&mut chars)?);
    }

    Ok(words)
}

fn read_word(chars: &mut Peekable<Chars<'_>>) -> Result<String, WordsError> {
    let mut word = String::new();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => break,
            '\'' => loop {
                match chars.next() {
                    Some('\'') => break,
                    Some(c) => word.push(c),
                    None => return Err(WordsError::UnterminatedQuote('\'')),
                }
            },
            '"' => loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(c @ ('\\' | '"' | '$' | '`')) => word.push(c),
                        Some('\n') => {}
                        Some(c) => {
                            word.push('\\');
                            word.push(c);
                        }
                        None => return Err(WordsError::UnterminatedQuote('"')),
                    },
                    Some(c) => word.push(c),
                    None => return Err(WordsError::UnterminatedQuote('"')),
                }
            },
            '\\' => match chars.next() {
                Some('\n') => {}
                Some(c) => word.push(c),
                None => return Err(WordsError::TrailingEscape),
            },
            c => word.push(c),
        }
    }

    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(split("  mr   checkout\t123 ").unwrap(), ["mr", "checkout", "123"]);
        assert!(split("").unwrap().is_empty());
    }

    #[test]
    fn test_quotes() {
        assert_eq!(
            split(r#"issue list --label="help wanted" 'it''s' "a\"b" '$1'"#).unwrap(),
            ["issue", "list", "--label=help wanted", "its", "a\"b", "$1"]
        );
        assert_eq!(split(r#""" ''"#).unwrap(), ["", ""]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(split(r"a\ b c\\d").unwrap(), ["a b", r"c\d"]);
        assert_eq!(split(r#""keep \n""#).unwrap(), [r"keep \n"]);
        assert_eq!(split("one \\\ntwo").unwrap(), ["one", "two"]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(split("mr list # note").unwrap(), ["mr", "list"]);
        assert_eq!(split("issue#1 x").unwrap(), ["issue#1", "x"]);
        assert_eq!(split("a # c\nb").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(split("'open").unwrap_err(), WordsError::UnterminatedQuote('\''));
        assert_eq!(split("\"open").unwrap_err(), WordsError::UnterminatedQuote('"'));
        assert_eq!(split("end\\").unwrap_err(), WordsError::TrailingEscape);
    }
}
