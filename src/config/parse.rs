//! Reader for the YAML subset the config files use.
//!
//! Block mappings and sequences, plain and quoted scalars, `{}`/`[]` and
//! comments. Anything fancier (flow collections with content, block scalars,
//! anchors, tags) is rejected with a line-numbered [`SyntaxError`] rather than
//! being half-understood.

use super::document::{Document, NodeId, ScalarStyle};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

fn syntax(line: usize, message: impl Into<String>) -> SyntaxError {
    SyntaxError {
        line,
        message: message.into(),
    }
}

#[derive(Debug)]
enum Line {
    /// A comment (`# ...`) or, when empty, a blank line.
    Comment(String),
    Content {
        no: usize,
        indent: usize,
        text: String,
    },
}

struct Reader {
    lines: Vec<Line>,
    pos: usize,
    doc: Document,
}

impl Document {
    /// Parses one config file. An empty input yields an empty mapping.
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        Reader::new(text)?.read()
    }
}

impl Reader {
    fn new(text: &str) -> Result<Self, SyntaxError> {
        let mut lines = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let no = i + 1;
            let trimmed = raw.trim_start_matches(' ');

            if trimmed.trim().is_empty() {
                lines.push(Line::Comment(String::new()));
                continue;
            }
            if trimmed.starts_with('\t') {
                return Err(syntax(no, "tabs are not allowed for indentation"));
            }

            let indent = raw.len() - trimmed.len();
            let text = trimmed.trim_end();

            if text.starts_with('#') {
                lines.push(Line::Comment(text.to_string()));
                continue;
            }
            if indent == 0 && (text == "---" || text == "...") {
                continue;
            }

            lines.push(Line::Content {
                no,
                indent,
                text: text.to_string(),
            });
        }

        Ok(Self {
            lines,
            pos: 0,
            doc: Document::new(),
        })
    }

    fn read(mut self) -> Result<Document, SyntaxError> {
        let root = match self.peek() {
            None => self.doc.root(),
            Some((no, indent, is_item)) => {
                if is_item {
                    return Err(syntax(no, "top-level node must be a mapping"));
                }
                if self.peek_text().is_some_and(|t| t.starts_with('{')) {
                    self.read_empty_root()?
                } else {
                    self.parse_mapping(indent)?
                }
            }
        };

        let foot = self.take_comments();
        if let Some((no, _, _)) = self.peek() {
            return Err(syntax(no, "unexpected indentation"));
        }
        self.doc.node_mut(root).foot_comment.extend(foot);
        self.doc.set_root(root);
        Ok(self.doc)
    }

    /// A file holding nothing but `{}`.
    fn read_empty_root(&mut self) -> Result<NodeId, SyntaxError> {
        let head = self.take_comments();
        let (no, text) = self.take_line();
        let Some(tail) = text.strip_prefix("{}") else {
            return Err(syntax(no, "flow mappings are not supported"));
        };
        let comment = trailing_comment(tail, no)?;

        let root = self.doc.new_mapping();
        let node = self.doc.node_mut(root);
        node.head_comment = head;
        node.line_comment = comment;
        Ok(root)
    }

    // ---------- cursor ----------

    /// Next content line as `(line number, indent, is sequence item)`.
    fn peek(&self) -> Option<(usize, usize, bool)> {
        self.lines[self.pos..].iter().find_map(|line| match line {
            Line::Content { no, indent, text } => Some((*no, *indent, is_seq_item(text))),
            Line::Comment(_) => None,
        })
    }

    fn peek_text(&self) -> Option<&str> {
        self.lines[self.pos..].iter().find_map(|line| match line {
            Line::Content { text, .. } => Some(text.as_str()),
            Line::Comment(_) => None,
        })
    }

    fn take_comments(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(Line::Comment(text)) = self.lines.get(self.pos) {
            out.push(text.clone());
            self.pos += 1;
        }
        out
    }

    /// Consumes the content line at the cursor. Callers take comments first.
    fn take_line(&mut self) -> (usize, String) {
        let line = match self.lines.get(self.pos) {
            Some(Line::Content { no, text, .. }) => (*no, text.clone()),
            _ => (0, String::new()),
        };
        self.pos += 1;
        line
    }

    // ---------- blocks ----------

    fn parse_mapping(&mut self, indent: usize) -> Result<NodeId, SyntaxError> {
        let map = self.doc.new_mapping();

        while let Some((no, line_indent, is_item)) = self.peek() {
            if line_indent < indent {
                break;
            }
            if line_indent > indent {
                return Err(syntax(no, "unexpected indentation"));
            }
            if is_item {
                return Err(syntax(no, "expected a mapping key, found a sequence item"));
            }

            let head = self.take_comments();
            let (no, text) = self.take_line();
            let Some((key_text, key_style, rest)) = split_key(&text).map_err(|m| syntax(no, m))?
            else {
                return Err(syntax(no, "expected a mapping key"));
            };

            let key = self.doc.new_scalar_with_style(&key_text, key_style);
            let (value, comment) = self.parse_value(indent, rest, no)?;

            let key_node = self.doc.node_mut(key);
            key_node.head_comment = head;
            key_node.line_comment = comment;
            self.doc.push_pair(map, key, value);
        }

        Ok(map)
    }

    fn parse_sequence(&mut self, indent: usize) -> Result<NodeId, SyntaxError> {
        let seq = self.doc.new_sequence();

        while let Some((no, line_indent, is_item)) = self.peek() {
            if line_indent < indent || (line_indent == indent && !is_item) {
                break;
            }
            if line_indent > indent {
                return Err(syntax(no, "unexpected indentation"));
            }

            let head = self.take_comments();
            let (no, text) = self.take_line();
            let body = &text[1..];
            let after = body.trim_start_matches(' ');

            let item = if after.is_empty() || after.starts_with('#') {
                let comment = (!after.is_empty()).then(|| after.to_string());
                let node = self.parse_nested(indent)?;
                self.doc.node_mut(node).line_comment = comment;
                node
            } else if is_seq_item(after) {
                return Err(syntax(no, "nested inline sequences are not supported"));
            } else if split_key(after).map_err(|m| syntax(no, m))?.is_some() {
                // `- key: value` opens a mapping whose keys line up with `key`.
                let offset = indent + 1 + (body.len() - after.len());
                self.pos -= 1;
                self.lines[self.pos] = Line::Content {
                    no,
                    indent: offset,
                    text: after.to_string(),
                };
                self.parse_mapping(offset)?
            } else {
                let (node, comment) = self.parse_inline(after, no)?;
                self.doc.node_mut(node).line_comment = comment;
                node
            };

            self.doc.node_mut(item).head_comment = head;
            self.doc.push_item(seq, item);
        }

        Ok(seq)
    }

    /// Block nested under a line whose own value is empty.
    fn parse_nested(&mut self, indent: usize) -> Result<NodeId, SyntaxError> {
        match self.peek() {
            Some((_, child, true)) if child > indent => self.parse_sequence(child),
            Some((_, child, false)) if child > indent => self.parse_mapping(child),
            _ => Ok(self.doc.new_scalar_with_style("", ScalarStyle::Plain)),
        }
    }

    fn parse_value(
        &mut self,
        indent: usize,
        rest: &str,
        no: usize,
    ) -> Result<(NodeId, Option<String>), SyntaxError> {
        let rest = rest.trim_start();

        if rest.is_empty() || rest.starts_with('#') {
            let comment = (!rest.is_empty()).then(|| rest.to_string());
            let node = match self.peek() {
                // a sequence may sit at the same indent as its key
                Some((_, child, true)) if child >= indent => self.parse_sequence(child)?,
                _ => self.parse_nested(indent)?,
            };
            return Ok((node, comment));
        }

        self.parse_inline(rest, no)
    }

    fn parse_inline(
        &mut self,
        text: &str,
        no: usize,
    ) -> Result<(NodeId, Option<String>), SyntaxError> {
        match text.as_bytes()[0] {
            b'{' => {
                let tail = text
                    .strip_prefix("{}")
                    .ok_or_else(|| syntax(no, "flow mappings are not supported"))?;
                Ok((self.doc.new_mapping(), trailing_comment(tail, no)?))
            }
            b'[' => {
                let tail = text
                    .strip_prefix("[]")
                    .ok_or_else(|| syntax(no, "flow sequences are not supported"))?;
                Ok((self.doc.new_sequence(), trailing_comment(tail, no)?))
            }
            b'|' | b'>' => Err(syntax(no, "block scalars are not supported")),
            b'&' | b'*' => Err(syntax(no, "anchors and aliases are not supported")),
            b'!' => Err(syntax(no, "tags are not supported; quote values starting with '!'")),
            _ => {
                let (value, style, tail) = scalar(text).map_err(|m| syntax(no, m))?;
                let comment = trailing_comment(tail, no)?;
                Ok((self.doc.new_scalar_with_style(&value, style), comment))
            }
        }
    }
}

// -------------------- scalars --------------------

fn is_seq_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

fn trailing_comment(tail: &str, no: usize) -> Result<Option<String>, SyntaxError> {
    let tail = tail.trim_start();
    if tail.is_empty() {
        Ok(None)
    } else if tail.starts_with('#') {
        Ok(Some(tail.to_string()))
    } else {
        Err(syntax(no, format!("unexpected text after value: {tail}")))
    }
}

/// Splits `key: rest`. `Ok(None)` when the line holds no key.
fn split_key(text: &str) -> Result<Option<(String, ScalarStyle, &str)>, String> {
    if text.starts_with('"') || text.starts_with('\'') {
        let (key, style, tail) = scalar(text)?;
        let tail = tail.trim_start();
        return Ok(tail
            .strip_prefix(':')
            .filter(|rest| rest.is_empty() || rest.starts_with(' '))
            .map(|rest| (key, style, rest)));
    }

    let bytes = text.as_bytes();
    for i in 0..bytes.len() {
        if bytes[i] == b'#' && i > 0 && bytes[i - 1] == b' ' {
            return Ok(None);
        }
        if bytes[i] == b':' && (i + 1 == bytes.len() || bytes[i + 1] == b' ') {
            let key = text[..i].trim_end();
            if key.is_empty() {
                return Ok(None);
            }
            return Ok(Some((key.to_string(), ScalarStyle::Plain, &text[i + 1..])));
        }
    }

    Ok(None)
}

/// Reads one scalar, returning its text, style and whatever follows it.
fn scalar(text: &str) -> Result<(String, ScalarStyle, &str), String> {
    if text.starts_with('"') {
        let (value, end) = double_quoted(text)?;
        return Ok((value, ScalarStyle::DoubleQuoted, &text[end..]));
    }
    if text.starts_with('\'') {
        let (value, end) = single_quoted(text)?;
        return Ok((value, ScalarStyle::SingleQuoted, &text[end..]));
    }

    match text.find(" #") {
        Some(end) => Ok((
            text[..end].trim_end().to_string(),
            ScalarStyle::Plain,
            &text[end..],
        )),
        None => Ok((text.to_string(), ScalarStyle::Plain, "")),
    }
}

fn double_quoted(text: &str) -> Result<(String, usize), String> {
    let mut out = String::new();
    let mut chars = text.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, i + 1)),
            '\\' => {
                let Some((_, esc)) = chars.next() else {
                    break;
                };
                match esc {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    '/' => out.push('/'),
                    ' ' => out.push(' '),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    'e' => out.push('\x1b'),
                    'x' => out.push(hex_escape(&mut chars, 2)?),
                    'u' => out.push(hex_escape(&mut chars, 4)?),
                    'U' => out.push(hex_escape(&mut chars, 8)?),
                    other => return Err(format!("invalid escape sequence \\{other}")),
                }
            }
            _ => out.push(c),
        }
    }

    Err("unterminated double-quoted scalar".to_string())
}

fn hex_escape(chars: &mut impl Iterator<Item = (usize, char)>, len: usize) -> Result<char, String> {
    let digits: String = chars.take(len).map(|(_, c)| c).collect();
    if digits.len() != len {
        return Err("truncated escape sequence".to_string());
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape sequence {digits}"))
}

fn single_quoted(text: &str) -> Result<(String, usize), String> {
    let mut out = String::new();
    let mut chars = text.char_indices().skip(1).peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            out.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '\''))) {
            chars.next();
            out.push('\'');
            continue;
        }
        return Ok((out, i + 1));
    }

    Err("unterminated single-quoted scalar".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::document::NodeKind;

    fn style_of(doc: &Document, map: NodeId, key: &str) -> ScalarStyle {
        let entry = doc.find_entry(map, key).unwrap();
        match &doc.node(entry.value).kind {
            NodeKind::Scalar { style, .. } => *style,
            other => panic!("not a scalar: {other:?}"),
        }
    }

    #[test]
    fn test_nested_mapping_with_comments() {
        let text = "\
# protocol
git_protocol: ssh
editor:
hosts:
    gitlab.com:
        # your token
        token: abc # inline
";
        let doc = Document::parse(text).unwrap();
        let root = doc.root();

        assert_eq!(doc.get_str(root, "git_protocol"), Some("ssh"));
        assert_eq!(doc.get_str(root, "editor"), Some(""));

        let git = doc.find_entry(root, "git_protocol").unwrap();
        assert_eq!(doc.node(git.key).head_comment, vec!["# protocol"]);

        let hosts = doc.find_entry(root, "hosts").unwrap().value;
        let host = doc.find_entry(hosts, "gitlab.com").unwrap().value;
        let token = doc.find_entry(host, "token").unwrap();
        assert_eq!(doc.scalar(token.value), Some("abc"));
        assert_eq!(doc.node(token.key).head_comment, vec!["# your token"]);
        assert_eq!(doc.node(token.key).line_comment.as_deref(), Some("# inline"));
    }

    #[test]
    fn test_quoted_scalars() {
        let text = r#"a: "line\nbreak \"q\""
b: 'it''s'
"c d": plain value
e: "\u00e9"
"#;
        let doc = Document::parse(text).unwrap();
        let root = doc.root();

        assert_eq!(doc.get_str(root, "a"), Some("line\nbreak \"q\""));
        assert_eq!(doc.get_str(root, "b"), Some("it's"));
        assert_eq!(doc.get_str(root, "c d"), Some("plain value"));
        assert_eq!(doc.get_str(root, "e"), Some("é"));
        assert_eq!(style_of(&doc, root, "a"), ScalarStyle::DoubleQuoted);
        assert_eq!(style_of(&doc, root, "b"), ScalarStyle::SingleQuoted);
    }

    #[test]
    fn test_values_with_colons_and_hashes() {
        let text = "url: https://gitlab.example.com:8443/api\nissue: fix#12\n";
        let doc = Document::parse(text).unwrap();
        let root = doc.root();

        assert_eq!(
            doc.get_str(root, "url"),
            Some("https://gitlab.example.com:8443/api")
        );
        assert_eq!(doc.get_str(root, "issue"), Some("fix#12"));
    }

    #[test]
    fn test_empty_inputs_are_empty_mappings() {
        for text in ["", "\n\n", "# only a comment\n", "{}\n", "---\n{}\n"] {
            let doc = Document::parse(text).unwrap();
            assert!(doc.entries(doc.root()).is_empty(), "input: {text:?}");
        }
    }

    #[test]
    fn test_trailing_comments_become_foot() {
        let doc = Document::parse("a: 1\n\n# the end\n").unwrap();
        assert_eq!(doc.node(doc.root()).foot_comment, vec!["", "# the end"]);
    }

    #[test]
    fn test_sequences() {
        let text = "\
gitlab.com:
    - token: abc
      user: me
    - plain
list:
- one
- two
";
        let doc = Document::parse(text).unwrap();
        let root = doc.root();

        let legacy = doc.find_entry(root, "gitlab.com").unwrap().value;
        match &doc.node(legacy).kind {
            NodeKind::Sequence(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(doc.get_str(items[0], "user"), Some("me"));
                assert_eq!(doc.scalar(items[1]), Some("plain"));
            }
            other => panic!("expected a sequence, got {other:?}"),
        }

        let list = doc.find_entry(root, "list").unwrap().value;
        assert!(matches!(&doc.node(list).kind, NodeKind::Sequence(items) if items.len() == 2));
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let doc = Document::parse("k: first\nk: second\n").unwrap();
        assert_eq!(doc.entries(doc.root()).len(), 2);
        assert_eq!(doc.get_str(doc.root(), "k"), Some("first"));
    }

    #[test]
    fn test_rejects_non_mapping_top_level() {
        let err = Document::parse("- a\n- b\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("mapping"));

        assert!(Document::parse("just a scalar\n").is_err());
    }

    #[test]
    fn test_rejects_unsupported_syntax() {
        let cases = [
            "a: {b: c}\n",
            "a: [1, 2]\n",
            "a: |\n  text\n",
            "a: &anchor x\n",
            "a: !tag x\n",
            "a: \"open\n",
            "a:\n\tb: c\n",
            "a: b\n    c: d\n",
        ];
        for text in cases {
            assert!(Document::parse(text).is_err(), "accepted: {text:?}");
        }
    }

    #[test]
    fn test_error_reports_line() {
        let err = Document::parse("a: 1\nb: 2\nc: \"open\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: unterminated double-quoted scalar");
    }
}
