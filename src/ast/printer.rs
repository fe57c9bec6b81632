//! Segment tree printer
//!
//! Produces the indented dump shown by `--tree` and `$temp:__PRINT_TREE`.

use std::fmt::Write;

use crate::ast::types::Segment;

const INDENT: &str = "  ";

/// Render a segment tree one node per line, children indented below their
/// parent.
pub fn print_tree(segment: &Segment) -> String {
    let mut out = String::new();
    write_node(&mut out, segment, 0, None);
    out
}

fn write_node(out: &mut String, segment: &Segment, depth: usize, label: Option<&str>) {
    let pad = INDENT.repeat(depth);
    let label = label.map(|l| format!("{}: ", l)).unwrap_or_default();

    match segment {
        Segment::Text { value } => {
            let _ = writeln!(out, "{}{}Text {:?}", pad, label, value);
        }
        Segment::Variable { scope, name } => {
            let _ = match scope {
                Some(scope) => writeln!(out, "{}{}Variable {}:{}", pad, label, scope, name),
                None => writeln!(out, "{}{}Variable {}", pad, label, name),
            };
        }
        Segment::Command { head, args } => {
            let _ = writeln!(out, "{}{}Command", pad, label);
            write_node(out, head, depth + 1, Some("head"));
            for arg in args.iter().flatten() {
                write_node(out, arg, depth + 1, Some("arg"));
            }
        }
        Segment::Pipe { left, right } => {
            let _ = writeln!(out, "{}{}Pipe", pad, label);
            write_node(out, left, depth + 1, Some("left"));
            write_node(out, right, depth + 1, Some("right"));
        }
        Segment::Redirection { left, device, mode } => {
            let _ = writeln!(out, "{}{}Redirection {:?}", pad, label, mode);
            write_node(out, left, depth + 1, Some("left"));
            write_node(out, device, depth + 1, Some("device"));
        }
        Segment::Sequence {
            left,
            right,
            stop_on_failure,
        } => {
            let mode = if *stop_on_failure { "stop on failure" } else { "continue" };
            let _ = writeln!(out, "{}{}Sequence ({})", pad, label, mode);
            write_node(out, left, depth + 1, Some("left"));
            write_node(out, right, depth + 1, Some("right"));
        }
        Segment::StringInterpolation { parts } => {
            let _ = writeln!(out, "{}{}StringInterpolation", pad, label);
            for part in parts {
                write_node(out, part, depth + 1, None);
            }
        }
        Segment::CommandInterpolation { inner } => {
            let _ = writeln!(out, "{}{}CommandInterpolation", pad, label);
            write_node(out, inner, depth + 1, None);
        }
    }
}
