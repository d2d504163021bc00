use log::warn;
use thiserror::Error;

use super::node::ConfigNode;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: `}}` without an open node")]
    UnexpectedClose { line: usize },
    #[error("line {line}: node `{name}` is never closed")]
    Unclosed { name: String, line: usize },
    #[error("line {line}: value without a key")]
    EmptyKey { line: usize },
}

/// Parses config text into a nameless root node.
///
/// Top-level values and nodes of the text become the values and children of
/// the returned root. A node name may sit on its own line or share a line with
/// the opening brace; `//` starts a comment running to the end of the line.
/// A leading byte order mark is ignored.
pub fn parse(text: &str) -> Result<ConfigNode, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parser = Parser {
        stack: vec![(ConfigNode::new(""), 0)],
        pending: None,
    };

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let mut rest = strip_comment(raw);

        while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
            parser.text(&rest[..pos], line)?;
            if rest[pos..].starts_with('{') {
                parser.open(line);
            } else {
                parser.close(line)?;
            }
            rest = &rest[pos + 1..];
        }
        parser.text(rest, line)?;
    }

    parser.finish()
}

struct Parser {
    // open nodes with the line they were opened on
    stack: Vec<(ConfigNode, usize)>,
    // a bare word waiting for its `{`
    pending: Option<(String, usize)>,
}

impl Parser {
    fn current(&mut self) -> &mut ConfigNode {
        // the root entry is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last].0
    }

    fn text(&mut self, text: &str, line: usize) -> Result<(), ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if let Some((key, value)) = text.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                return Err(ParseError::EmptyKey { line });
            }
            self.drop_pending(line);
            self.current().add_value(key, value.trim());
        } else {
            self.drop_pending(line);
            self.pending = Some((text.to_string(), line));
        }
        Ok(())
    }

    fn open(&mut self, line: usize) {
        let name = match self.pending.take() {
            Some((name, _)) => name,
            None => {
                warn!("line {}: anonymous node", line);
                String::new()
            }
        };
        self.stack.push((ConfigNode::new(name), line));
    }

    fn close(&mut self, line: usize) -> Result<(), ParseError> {
        self.drop_pending(line);
        if self.stack.len() == 1 {
            return Err(ParseError::UnexpectedClose { line });
        }
        if let Some((node, _)) = self.stack.pop() {
            self.current().add_node(node);
        }
        Ok(())
    }

    fn drop_pending(&mut self, line: usize) {
        if let Some((name, at)) = self.pending.take() {
            warn!(
                "line {}: ignoring `{}` (declared on line {}) with no block",
                line, name, at
            );
        }
    }

    fn finish(mut self) -> Result<ConfigNode, ParseError> {
        let end = self.pending.as_ref().map(|(_, at)| *at).unwrap_or(0);
        self.drop_pending(end);

        if self.stack.len() > 1 {
            if let Some((node, line)) = self.stack.pop() {
                return Err(ParseError::Unclosed {
                    name: node.name,
                    line,
                });
            }
        }

        Ok(self
            .stack
            .pop()
            .map(|(root, _)| root)
            .unwrap_or_default())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_blocks() {
        let text = "\
// header comment
STATIC
{
    mesh = hangar.mu // trailing comment
    name = Hangar
    Instances
    {
        RadialPosition = 1,2,3
        CelestialBody = Kerbin
    }
}
";
        let root = parse(text).unwrap();
        assert_eq!(root.nodes().len(), 1);

        let def = root.get_node("STATIC").unwrap();
        assert_eq!(def.get_value("mesh"), Some("hangar.mu"));
        assert_eq!(def.get_value("name"), Some("Hangar"));

        let inst = def.get_node("Instances").unwrap();
        assert_eq!(inst.get_value("RadialPosition"), Some("1,2,3"));
        assert_eq!(inst.get_value("CelestialBody"), Some("Kerbin"));
    }

    #[test]
    fn test_brace_on_same_line_and_root_values() {
        let root = parse("version = 2\nSTATIC {\n mesh = a.mu\n}\nOTHER{ key = v }\n").unwrap();

        assert_eq!(root.get_value("version"), Some("2"));
        assert_eq!(root.get_node("STATIC").unwrap().get_value("mesh"), Some("a.mu"));
        assert_eq!(root.get_node("OTHER").unwrap().get_value("key"), Some("v"));
    }

    #[test]
    fn test_value_may_contain_equals_and_be_empty() {
        let root = parse("A\n{\n expr = x = y\n empty =\n}\n").unwrap();
        let a = root.get_node("A").unwrap();

        assert_eq!(a.get_value("expr"), Some("x = y"));
        assert_eq!(a.get_value("empty"), Some(""));
    }

    #[test]
    fn test_unbalanced_braces_are_errors() {
        assert_eq!(
            parse("A\n{\n}\n}\n"),
            Err(ParseError::UnexpectedClose { line: 4 })
        );
        assert_eq!(
            parse("A\n{\n B\n {\n }\n"),
            Err(ParseError::Unclosed {
                name: "A".to_string(),
                line: 2
            })
        );
        assert_eq!(parse("A\n{\n = 3\n}\n"), Err(ParseError::EmptyKey { line: 3 }));
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let root = parse("\u{feff}STATIC\n{\n    mesh = hangar.mu\n}\n").unwrap();
        assert_eq!(root.get_node("STATIC").unwrap().get_value("mesh"), Some("hangar.mu"));
    }
}
