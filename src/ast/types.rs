//! Abstract Syntax Tree (AST) Types for lumi
//!
//! A parsed line is a single [`Segment`] tree. Nodes are built once by the
//! parser and never mutated; the evaluator walks them by exhaustive `match`.
//!
//! `Display` renders a tree back to shell text that parses to an equivalent
//! tree. Two shapes have no source form and are rendered on a best-effort
//! basis: a `Text` outside an operand position reads back as a command of
//! that name, and a `Command` without arguments whose head is not `Text`
//! reads back as its bare head.

use std::fmt;

use crate::interpreter::helpers::quoting::{escape, escape_quoted, quote};

// =============================================================================
// PRECEDENCE
// =============================================================================

/// Binding strength of infix operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Invalid = 0,
    Sequence = 1,
    /// Shared by `|` and every redirection operator
    Pipe = 2,
    /// Implicit juxtaposition of a command and its arguments
    Command = 3,
}

// =============================================================================
// SEGMENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectionMode {
    /// `<`
    StdIn,
    /// `>`
    StdOut,
    /// `>>`
    StdErr,
    /// `>>>`
    StdOutAndErr,
}

impl RedirectionMode {
    pub fn operator(&self) -> &'static str {
        match self {
            Self::StdIn => "<",
            Self::StdOut => ">",
            Self::StdErr => ">>",
            Self::StdOutAndErr => ">>>",
        }
    }
}

/// One node of a parsed line
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A command name plus its arguments. `args` is `None` for a bare word.
    Command {
        head: Box<Segment>,
        args: Option<Vec<Segment>>,
    },
    Pipe {
        left: Box<Segment>,
        right: Box<Segment>,
    },
    Redirection {
        left: Box<Segment>,
        device: Box<Segment>,
        mode: RedirectionMode,
    },
    /// `;` (always continue) or `&` (stop when the left side fails)
    Sequence {
        left: Box<Segment>,
        right: Box<Segment>,
        stop_on_failure: bool,
    },
    Text {
        value: String,
    },
    Variable {
        scope: Option<String>,
        name: String,
    },
    /// Literal and computed parts concatenated without separators
    StringInterpolation {
        parts: Vec<Segment>,
    },
    /// `$( … )`
    CommandInterpolation {
        inner: Box<Segment>,
    },
}

impl Segment {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn variable(scope: Option<&str>, name: impl Into<String>) -> Self {
        Self::Variable {
            scope: scope.map(str::to_string),
            name: name.into(),
        }
    }

    pub fn command(head: Segment, args: Option<Vec<Segment>>) -> Self {
        Self::Command {
            head: Box::new(head),
            args,
        }
    }

    pub fn pipe(left: Segment, right: Segment) -> Self {
        Self::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn redirection(left: Segment, device: Segment, mode: RedirectionMode) -> Self {
        Self::Redirection {
            left: Box::new(left),
            device: Box::new(device),
            mode,
        }
    }

    pub fn sequence(left: Segment, right: Segment, stop_on_failure: bool) -> Self {
        Self::Sequence {
            left: Box::new(left),
            right: Box::new(right),
            stop_on_failure,
        }
    }

    pub fn command_interpolation(inner: Segment) -> Self {
        Self::CommandInterpolation {
            inner: Box::new(inner),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Command { .. } => "Command",
            Self::Pipe { .. } => "Pipe",
            Self::Redirection { .. } => "Redirection",
            Self::Sequence { .. } => "Sequence",
            Self::Text { .. } => "Text",
            Self::Variable { .. } => "Variable",
            Self::StringInterpolation { .. } => "StringInterpolation",
            Self::CommandInterpolation { .. } => "CommandInterpolation",
        }
    }

    /// How tightly this node binds when it appears as an operand.
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Sequence { .. } => Precedence::Sequence,
            Self::Pipe { .. } | Self::Redirection { .. } => Precedence::Pipe,
            _ => Precedence::Command,
        }
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Write a node in a position that only accepts a single value
/// (command head, argument, redirection device).
fn fmt_operand(segment: &Segment, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match segment {
        Segment::Text { value } => f.write_str(&escape(value)),
        Segment::Variable { .. }
        | Segment::StringInterpolation { .. }
        | Segment::CommandInterpolation { .. } => write!(f, "{}", segment),
        other => write!(f, "$({})", other),
    }
}

/// Write a child of a binary operator, wrapping it when it would otherwise
/// re-associate. Operators are left-associative.
fn fmt_child(
    child: &Segment,
    parent: Precedence,
    is_right: bool,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let own = child.precedence();
    let needs_wrap = own < parent || (is_right && own == parent);
    if needs_wrap {
        write!(f, "$({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Command { head, args: None } => fmt_operand(head, f),
            Segment::Command {
                head,
                args: Some(args),
            } => {
                fmt_operand(head, f)?;
                for arg in args {
                    f.write_str(" ")?;
                    fmt_operand(arg, f)?;
                }
                Ok(())
            }
            Segment::Pipe { left, right } => {
                fmt_child(left, Precedence::Pipe, false, f)?;
                f.write_str(" | ")?;
                fmt_child(right, Precedence::Pipe, true, f)
            }
            Segment::Redirection { left, device, mode } => {
                fmt_child(left, Precedence::Pipe, false, f)?;
                write!(f, " {} ", mode.operator())?;
                fmt_operand(device, f)
            }
            Segment::Sequence {
                left,
                right,
                stop_on_failure,
            } => {
                fmt_child(left, Precedence::Sequence, false, f)?;
                f.write_str(if *stop_on_failure { " & " } else { " ; " })?;
                fmt_child(right, Precedence::Sequence, true, f)
            }
            Segment::Text { value } => f.write_str(&quote(value)),
            Segment::Variable { scope, name } => {
                let full = match scope {
                    Some(scope) => format!("{}:{}", scope, name),
                    None => name.clone(),
                };
                write!(f, "${}", escape(&full))
            }
            Segment::StringInterpolation { parts } => {
                f.write_str("\"")?;
                // Parsed parts alternate literal, computed, literal, ...
                for (index, part) in parts.iter().enumerate() {
                    match part {
                        Segment::Text { value } if index % 2 == 0 => {
                            f.write_str(&escape_quoted(value))?
                        }
                        other => write!(f, "{{{}}}", other)?,
                    }
                }
                f.write_str("\"")
            }
            Segment::CommandInterpolation { inner } => write!(f, "$({})", inner),
        }
    }
}
