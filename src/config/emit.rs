//! Writer for [`Document`], the inverse of the reader in `parse`.

use super::document::{Document, NodeId, NodeKind, ScalarStyle};

const INDENT: usize = 4;

impl Document {
    /// Renders `node` as a standalone file, skipping top-level keys in `exclude`.
    ///
    /// The main config, the aliases file and the local file are all produced
    /// by this one function with different nodes and exclusion sets.
    pub fn encode(&self, node: NodeId, exclude: &[&str]) -> String {
        let mut out = String::new();
        let Some(n) = self.get(node) else {
            return out;
        };
        write_comments(&mut out, &n.head_comment, 0);

        match &n.kind {
            NodeKind::Mapping(_) if self.has_visible_entries(node, exclude) => {
                self.write_mapping(&mut out, node, 0, exclude);
                return out;
            }
            NodeKind::Mapping(_) => out.push_str("{}"),
            NodeKind::Sequence(items) if items.is_empty() => out.push_str("[]"),
            NodeKind::Sequence(_) => {
                self.write_sequence(&mut out, node, 0);
                write_comments(&mut out, &n.foot_comment, 0);
                return out;
            }
            NodeKind::Scalar { value, style } => out.push_str(&render_scalar(value, *style)),
        }

        push_line_comment(&mut out, n.line_comment.as_deref());
        out.push('\n');
        write_comments(&mut out, &n.foot_comment, 0);
        out
    }

    fn has_visible_entries(&self, map: NodeId, exclude: &[&str]) -> bool {
        self.entries(map)
            .iter()
            .any(|(k, _)| !is_excluded(self.scalar(*k), exclude))
    }

    fn write_mapping(&self, out: &mut String, map: NodeId, indent: usize, exclude: &[&str]) {
        for &(k, v) in self.entries(map) {
            if is_excluded(self.scalar(k), exclude) {
                continue;
            }
            let key = self.node(k);
            write_comments(out, &key.head_comment, indent);
            pad(out, indent);
            out.push_str(&render_key(key));
            out.push(':');
            self.write_value(out, v, indent, key.line_comment.as_deref());
        }
        write_comments(out, &self.node(map).foot_comment, indent);
    }

    fn write_sequence(&self, out: &mut String, seq: NodeId, indent: usize) {
        let NodeKind::Sequence(items) = &self.node(seq).kind else {
            return;
        };

        for &item in items {
            let node = self.node(item);
            write_comments(out, &node.head_comment, indent);

            match &node.kind {
                NodeKind::Mapping(entries) if !entries.is_empty() => {
                    // `- key: value` with the remaining keys aligned under `key`
                    let (k, v) = entries[0];
                    let key = self.node(k);
                    write_comments(out, &key.head_comment, indent);
                    pad(out, indent);
                    out.push_str("- ");
                    out.push_str(&render_key(key));
                    out.push(':');
                    self.write_value(out, v, indent + 2, key.line_comment.as_deref());

                    for &(k, v) in &entries[1..] {
                        let key = self.node(k);
                        write_comments(out, &key.head_comment, indent + 2);
                        pad(out, indent + 2);
                        out.push_str(&render_key(key));
                        out.push(':');
                        self.write_value(out, v, indent + 2, key.line_comment.as_deref());
                    }
                }
                _ => {
                    pad(out, indent);
                    out.push('-');
                    self.write_value(out, item, indent, node.line_comment.as_deref());
                }
            }
        }
    }

    /// Writes whatever follows `key:` (or `-`), including the newline.
    fn write_value(&self, out: &mut String, value: NodeId, indent: usize, comment: Option<&str>) {
        match &self.node(value).kind {
            NodeKind::Scalar { value: text, style } => {
                if !(text.is_empty() && *style == ScalarStyle::Plain) {
                    out.push(' ');
                    out.push_str(&render_scalar(text, *style));
                }
                push_line_comment(out, comment);
                out.push('\n');
            }
            NodeKind::Mapping(entries) if entries.is_empty() => {
                out.push_str(" {}");
                push_line_comment(out, comment);
                out.push('\n');
            }
            NodeKind::Sequence(items) if items.is_empty() => {
                out.push_str(" []");
                push_line_comment(out, comment);
                out.push('\n');
            }
            NodeKind::Mapping(_) => {
                push_line_comment(out, comment);
                out.push('\n');
                self.write_mapping(out, value, indent + INDENT, &[]);
            }
            NodeKind::Sequence(_) => {
                push_line_comment(out, comment);
                out.push('\n');
                self.write_sequence(out, value, indent + INDENT);
            }
        }
    }
}

fn is_excluded(key: Option<&str>, exclude: &[&str]) -> bool {
    key.is_some_and(|k| exclude.contains(&k))
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn push_line_comment(out: &mut String, comment: Option<&str>) {
    if let Some(comment) = comment {
        out.push(' ');
        out.push_str(comment);
    }
}

fn write_comments(out: &mut String, lines: &[String], indent: usize) {
    for line in lines {
        if !line.is_empty() {
            pad(out, indent);
            out.push_str(line);
        }
        out.push('\n');
    }
}

fn render_key(node: &super::document::Node) -> String {
    match &node.kind {
        NodeKind::Scalar { value, style } => render_scalar(value, *style),
        _ => String::from("\"\""),
    }
}

fn render_scalar(value: &str, style: ScalarStyle) -> String {
    match style {
        ScalarStyle::Plain if is_plain_safe(value) => value.to_string(),
        ScalarStyle::SingleQuoted if !value.chars().any(char::is_control) => {
            format!("'{}'", value.replace('\'', "''"))
        }
        _ => double_quote(value),
    }
}

fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// True when `s` reads back as the same string without quotes.
pub(crate) fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if s.trim() != s || "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return false;
    }
    !s.chars().any(char::is_control)
}
