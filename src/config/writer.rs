use std::fmt::Write;

use super::node::ConfigNode;

/// Serializes a root node (as returned by [`parse`](super::parse)) into config
/// text, preceded by a `//` header comment when `header` is non-empty.
///
/// The output depends only on the tree, so writing an unchanged tree twice
/// yields identical bytes.
pub fn to_string(root: &ConfigNode, header: &str) -> String {
    let mut out = String::new();
    for line in header.lines() {
        out.push_str("//");
        if !line.starts_with(' ') && !line.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
        out.push('\n');
    }
    write_body(&mut out, root, 0);
    out
}

fn write_body(out: &mut String, node: &ConfigNode, depth: usize) {
    for (key, value) in node.values() {
        indent(out, depth);
        // writing into a String cannot fail
        let _ = writeln!(out, "{} = {}", key, value);
    }
    for child in node.nodes() {
        indent(out, depth);
        out.push_str(&child.name);
        out.push('\n');
        indent(out, depth);
        out.push_str("{\n");
        write_body(out, child, depth + 1);
        indent(out, depth);
        out.push_str("}\n");
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}
