//! Precedence-Climbing Parser for lumi
//!
//! Consumes the lexer's token stream and produces a single [`Segment`].
//!
//! Grammar:
//!   line        ::= expr EndOfInput
//!   sequence    ::= pipe_or_redir ((';' | '&') pipe_or_redir)*
//!   pipe_or_redir ::= primary (('|' primary) | redir_op value)*
//!   redir_op    ::= '<' | '>' | '>>' | '>>>'
//!   primary     ::= command | variable
//!   command     ::= String argument*
//!   variable    ::= '$' ('(' expr ')' | (scope ':')? String)
//!
//! Arguments and redirection devices are parsed with command parsing
//! disabled, so a word there is a value and never swallows the words after
//! it. `$( … )` turns command parsing back on for its body.

use crate::ast::types::{Precedence, RedirectionMode, Segment};
use crate::parser::lexer::Lexer;
use crate::parser::token::{Token, TokenKind};
use crate::parser::types::SyntaxError;

/// Parse a complete line.
pub fn parse(input: &str) -> Result<Segment, SyntaxError> {
    let tokens = Lexer::new(input).tokenize()?;
    Parser::new(tokens).parse_all()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    command_parsing_disabled: bool,
}

fn infix_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Semicolon | TokenKind::Ampersand => Precedence::Sequence,
        TokenKind::Pipe
        | TokenKind::LeftAngle
        | TokenKind::RightAngle
        | TokenKind::DoubleRightAngle
        | TokenKind::TripleRightAngle => Precedence::Pipe,
        _ => Precedence::Invalid,
    }
}

fn starts_primary(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::String | TokenKind::Dollar)
}

impl Parser {
    /// `tokens` must end with `EndOfInput`, as the lexer guarantees.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            command_parsing_disabled: false,
        }
    }

    /// Parse one expression and require that nothing follows it.
    pub fn parse_all(mut self) -> Result<Segment, SyntaxError> {
        let segment = self.parse(Precedence::Invalid)?;
        self.take(TokenKind::EndOfInput)?;
        Ok(segment)
    }

    // =========================================================================
    // HELPER METHODS
    // =========================================================================

    fn current(&self) -> Result<&Token, SyntaxError> {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .ok_or_else(|| SyntaxError::new("Unexpected end of token stream", Default::default()))
    }

    fn current_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::EndOfInput)
    }

    fn advance(&mut self) -> Result<Token, SyntaxError> {
        let token = self.current()?.clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        Ok(token)
    }

    fn take(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        let token = self.current()?;
        if token.kind != kind {
            return Err(SyntaxError::with_token(
                format!("Unexpected token {}, expecting {}", token.kind, kind),
                token,
            ));
        }
        self.advance()
    }

    fn with_command_parsing<T>(
        &mut self,
        disabled: bool,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        let previous = self.command_parsing_disabled;
        self.command_parsing_disabled = disabled;
        let result = f(self);
        self.command_parsing_disabled = previous;
        result
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// Parse a primary and then every infix operator that binds tighter than
    /// `min`.
    fn parse(&mut self, min: Precedence) -> Result<Segment, SyntaxError> {
        let mut left = self.parse_primary()?;
        loop {
            let precedence = infix_precedence(self.current_kind());
            if precedence <= min {
                break;
            }
            left = self.parse_infix(left)?;
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Segment, SyntaxError> {
        match self.current_kind() {
            TokenKind::String => self.parse_string(),
            TokenKind::Dollar => self.parse_dollar(),
            other => Err(SyntaxError::with_token(
                format!("Expecting shell segment, found {}", other),
                self.current()?,
            )),
        }
    }

    fn parse_infix(&mut self, left: Segment) -> Result<Segment, SyntaxError> {
        let operator = self.advance()?;
        let segment = match operator.kind {
            TokenKind::Pipe => Segment::pipe(left, self.parse(Precedence::Pipe)?),
            TokenKind::Semicolon => Segment::sequence(left, self.parse(Precedence::Sequence)?, false),
            TokenKind::Ampersand => Segment::sequence(left, self.parse(Precedence::Sequence)?, true),
            TokenKind::LeftAngle => self.parse_redirection(left, RedirectionMode::StdIn)?,
            TokenKind::RightAngle => self.parse_redirection(left, RedirectionMode::StdOut)?,
            TokenKind::DoubleRightAngle => self.parse_redirection(left, RedirectionMode::StdErr)?,
            TokenKind::TripleRightAngle => {
                self.parse_redirection(left, RedirectionMode::StdOutAndErr)?
            }
            other => {
                return Err(SyntaxError::with_token(
                    format!("Unexpected token {}, expecting an operator", other),
                    &operator,
                ))
            }
        };
        Ok(segment)
    }

    // =========================================================================
    // PRIMARIES
    // =========================================================================

    fn parse_string(&mut self) -> Result<Segment, SyntaxError> {
        let token = self.take(TokenKind::String)?;
        let value = string_segment(&token)?;

        if self.command_parsing_disabled {
            return Ok(value);
        }

        if !starts_primary(self.current_kind()) {
            // An interpolated string on its own is a value
            if token.is_interpolated() {
                return Ok(value);
            }
            return Ok(Segment::command(value, None));
        }

        let mut args = Vec::new();
        while starts_primary(self.current_kind()) {
            let arg = self.with_command_parsing(true, |p| p.parse(Precedence::Command))?;
            args.push(arg);
        }
        Ok(Segment::command(value, Some(args)))
    }

    fn parse_dollar(&mut self) -> Result<Segment, SyntaxError> {
        self.take(TokenKind::Dollar)?;

        if self.current_kind() == TokenKind::LeftParen {
            self.advance()?;
            let inner = self.with_command_parsing(false, |p| p.parse(Precedence::Invalid))?;
            self.take(TokenKind::RightParen)?;
            return Ok(Segment::command_interpolation(inner));
        }

        let token = self.take(TokenKind::String)?;
        let Some(text) = token.text.as_deref() else {
            return Err(SyntaxError::with_token(
                "Unexpected interpolated string, expecting a variable name",
                &token,
            ));
        };

        Ok(match text.split_once(':') {
            Some((scope, name)) => Segment::variable(Some(scope), name),
            None => Segment::variable(None, text),
        })
    }

    fn parse_redirection(
        &mut self,
        left: Segment,
        mode: RedirectionMode,
    ) -> Result<Segment, SyntaxError> {
        let start = self.current()?.clone();
        let device = self.with_command_parsing(true, |p| p.parse(Precedence::Pipe))?;
        match device {
            Segment::Text { .. }
            | Segment::StringInterpolation { .. }
            | Segment::Variable { .. }
            | Segment::CommandInterpolation { .. } => Ok(Segment::redirection(left, device, mode)),
            other => Err(SyntaxError::with_token(
                format!(
                    "Unexpected {}, expecting one of: CommandInterpolation, StringInterpolation, Text, Variable",
                    other.kind_name()
                ),
                &start,
            )),
        }
    }
}

/// The value a `String` token stands for: plain text, or the parts of an
/// interpolated string with each `{…}` piece parsed as a full line.
fn string_segment(token: &Token) -> Result<Segment, SyntaxError> {
    let Some(pieces) = &token.payload else {
        return Ok(Segment::text(token.text.clone().unwrap_or_default()));
    };

    let mut parts = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece.kind {
            TokenKind::StringInterpolation => {
                let tokens = piece.payload.clone().unwrap_or_default();
                parts.push(Parser::new(tokens).parse_all()?);
            }
            _ => parts.push(Segment::text(piece.text.clone().unwrap_or_default())),
        }
    }
    Ok(Segment::StringInterpolation { parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cmd(name: &str, args: &[Segment]) -> Segment {
        let args = if args.is_empty() {
            None
        } else {
            Some(args.to_vec())
        };
        Segment::command(Segment::text(name), args)
    }

    fn text(value: &str) -> Segment {
        Segment::text(value)
    }

    #[test]
    fn test_bare_word_is_command() {
        assert_eq!(parse("ls").unwrap(), cmd("ls", &[]));
    }

    #[test]
    fn test_command_with_args() {
        assert_eq!(
            parse("echo hello world").unwrap(),
            cmd("echo", &[text("hello"), text("world")])
        );
    }

    #[test]
    fn test_quoted_word_alone_is_command() {
        assert_eq!(parse("\"my prog\"").unwrap(), cmd("my prog", &[]));
        assert_eq!(
            parse("\"my prog\" x").unwrap(),
            cmd("my prog", &[text("x")])
        );
    }

    #[test]
    fn test_interpolated_string_alone_is_value() {
        assert_eq!(
            parse("\"a{$x}\"").unwrap(),
            Segment::StringInterpolation {
                parts: vec![text("a"), Segment::variable(None, "x"), text("")]
            }
        );
    }

    #[test]
    fn test_pipe_is_left_associative() {
        assert_eq!(
            parse("a | b | c").unwrap(),
            Segment::pipe(Segment::pipe(cmd("a", &[]), cmd("b", &[])), cmd("c", &[]))
        );
    }

    #[test]
    fn test_sequence_binds_loosest() {
        assert_eq!(
            parse("a | b ; c & d").unwrap(),
            Segment::sequence(
                Segment::sequence(
                    Segment::pipe(cmd("a", &[]), cmd("b", &[])),
                    cmd("c", &[]),
                    false
                ),
                cmd("d", &[]),
                true
            )
        );
    }

    #[test]
    fn test_redirection_modes() {
        let cases = [
            ("a < f", RedirectionMode::StdIn),
            ("a > f", RedirectionMode::StdOut),
            ("a >> f", RedirectionMode::StdErr),
            ("a >>> f", RedirectionMode::StdOutAndErr),
        ];
        for (input, mode) in cases {
            assert_eq!(
                parse(input).unwrap(),
                Segment::redirection(cmd("a", &[]), text("f"), mode),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_redirection_device_is_not_a_command() {
        let tree = parse("echo x > out.txt extra").unwrap_err();
        assert_eq!(tree.message, "Unexpected token String, expecting EndOfInput");
    }

    #[test]
    fn test_redirection_then_pipe() {
        assert_eq!(
            parse("a > f | b").unwrap(),
            Segment::pipe(
                Segment::redirection(cmd("a", &[]), text("f"), RedirectionMode::StdOut),
                cmd("b", &[])
            )
        );
    }

    #[test]
    fn test_variables() {
        assert_eq!(parse("$name").unwrap(), Segment::variable(None, "name"));
        assert_eq!(
            parse("$tmp:name").unwrap(),
            Segment::variable(Some("tmp"), "name")
        );
        assert_eq!(
            parse("$cfg:ColorScheme.Foreground").unwrap(),
            Segment::variable(Some("cfg"), "ColorScheme.Foreground")
        );
        assert_eq!(
            parse("$a:b:c").unwrap(),
            Segment::variable(Some("a"), "b:c")
        );
    }

    #[test]
    fn test_variable_as_argument() {
        assert_eq!(
            parse("echo $x y").unwrap(),
            cmd("echo", &[Segment::variable(None, "x"), text("y")])
        );
    }

    #[test]
    fn test_command_interpolation_enables_commands() {
        assert_eq!(
            parse("echo $(split a,b , | echo) z").unwrap(),
            cmd(
                "echo",
                &[
                    Segment::command_interpolation(Segment::pipe(
                        cmd("split", &[text("a,b"), text(",")]),
                        cmd("echo", &[])
                    )),
                    text("z")
                ]
            )
        );
    }

    #[test]
    fn test_string_interpolation() {
        assert_eq!(
            parse(r#"echo "text with {$name} interpolated""#).unwrap(),
            cmd(
                "echo",
                &[Segment::StringInterpolation {
                    parts: vec![
                        text("text with "),
                        Segment::variable(None, "name"),
                        text(" interpolated")
                    ]
                }]
            )
        );
        assert_eq!(
            parse(r#""{echo a b}""#).unwrap(),
            Segment::StringInterpolation {
                parts: vec![text(""), cmd("echo", &[text("a"), text("b")]), text("")]
            }
        );
    }

    #[test]
    fn test_value_piped_into_variable() {
        assert_eq!(
            parse("echo hi | $tmp:greeting").unwrap(),
            Segment::pipe(
                cmd("echo", &[text("hi")]),
                Segment::variable(Some("tmp"), "greeting")
            )
        );
    }

    #[test]
    fn test_errors() {
        let err = parse("| a").unwrap_err();
        assert_eq!(err.message, "Expecting shell segment, found Pipe");
        assert_eq!(err.span.start.column, 1);

        let err = parse("a |").unwrap_err();
        assert_eq!(err.message, "Expecting shell segment, found EndOfInput");

        let err = parse("$(a").unwrap_err();
        assert_eq!(err.message, "Unexpected token EndOfInput, expecting RightParen");

        let err = parse("a )").unwrap_err();
        assert_eq!(err.message, "Unexpected token RightParen, expecting EndOfInput");
        assert_eq!(err.span.start.column, 3);

        let err = parse("$\"{x}\"").unwrap_err();
        assert_eq!(
            err.message,
            "Unexpected interpolated string, expecting a variable name"
        );

        let err = parse("\"{}\"").unwrap_err();
        assert_eq!(err.message, "Expecting shell segment, found EndOfInput");
    }

    #[test]
    fn test_lex_errors_surface_before_parsing() {
        let err = parse("echo \"abc").unwrap_err();
        assert_eq!(err.message, "Unexpected end of input when processing string");
    }

    #[test]
    fn test_round_trip_examples() {
        let inputs = [
            "echo hello",
            "a | b > out.txt ; c & d",
            "cat < \"in put.txt\" | $tmp:x",
            r#"echo "x {$a} y {echo "z"} w" $(b | c) "q""#,
            "\"my prog\"",
            "\"lonely {$value}\"",
            "$cfg:UseTilde",
            "echo \"\" \\ back",
        ];
        for input in inputs {
            let tree = parse(input).unwrap();
            let rendered = tree.to_string();
            assert_eq!(parse(&rendered).unwrap(), tree, "{} -> {}", input, rendered);
        }
    }

    fn word() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z][a-z0-9._/-]{0,6}",
            "[a-z ]{0,6}".prop_map(|s| format!("\"{}\"", s)),
            "[a-z]{1,4}".prop_map(|s| format!("$tmp:{}", s)),
            "[a-z]{1,4}".prop_map(|s| format!("\"<{{${}}}>\"", s)),
        ]
    }

    fn command() -> impl Strategy<Value = String> {
        ("[a-z]{1,5}", prop::collection::vec(word(), 0..4)).prop_map(|(head, args)| {
            let mut parts = vec![head];
            parts.extend(args);
            parts.join(" ")
        })
    }

    fn command_line() -> impl Strategy<Value = String> {
        let operator = prop_oneof![
            Just(" | "),
            Just(" ; "),
            Just(" & "),
        ];
        (command(), prop::collection::vec((operator, command()), 0..4)).prop_map(
            |(first, rest)| {
                let mut line = first;
                for (op, next) in rest {
                    line.push_str(op);
                    line.push_str(&next);
                }
                line
            },
        )
    }

    fn literal() -> impl Strategy<Value = String> {
        r#"[a-z {}$|\\"';>]{0,6}"#
    }

    fn simple_command() -> impl Strategy<Value = Segment> {
        (literal(), prop::collection::vec(literal(), 0..3)).prop_map(|(head, args)| {
            let args: Vec<Segment> = args.into_iter().map(Segment::text).collect();
            Segment::command(Segment::text(head), (!args.is_empty()).then_some(args))
        })
    }

    fn operand() -> impl Strategy<Value = Segment> {
        prop_oneof![
            literal().prop_map(Segment::text),
            (prop::option::of(Just("tmp")), "[a-z]{1,4}")
                .prop_map(|(scope, name)| Segment::variable(scope, name)),
            (literal(), "[a-z]{1,4}", literal()).prop_map(|(before, name, after)| {
                Segment::StringInterpolation {
                    parts: vec![
                        Segment::text(before),
                        Segment::variable(None, name),
                        Segment::text(after),
                    ],
                }
            }),
            simple_command().prop_map(Segment::command_interpolation),
        ]
    }

    fn command_tree() -> impl Strategy<Value = Segment> {
        (literal(), prop::collection::vec(operand(), 0..3)).prop_map(|(head, args)| {
            Segment::command(Segment::text(head), (!args.is_empty()).then_some(args))
        })
    }

    fn redirection_mode() -> impl Strategy<Value = RedirectionMode> {
        prop_oneof![
            Just(RedirectionMode::StdIn),
            Just(RedirectionMode::StdOut),
            Just(RedirectionMode::StdErr),
            Just(RedirectionMode::StdOutAndErr),
        ]
    }

    /// Left-associative chains of pipes and redirections.
    fn pipeline_tree() -> impl Strategy<Value = Segment> {
        let step = (
            prop::option::of(redirection_mode()),
            command_tree(),
            literal(),
        );
        (command_tree(), prop::collection::vec(step, 0..3)).prop_map(|(first, steps)| {
            steps
                .into_iter()
                .fold(first, |left, (mode, next, device)| match mode {
                    Some(mode) => Segment::redirection(left, Segment::text(device), mode),
                    None => Segment::pipe(left, next),
                })
        })
    }

    fn line_tree() -> impl Strategy<Value = Segment> {
        (
            pipeline_tree(),
            prop::collection::vec((any::<bool>(), pipeline_tree()), 0..3),
        )
            .prop_map(|(first, rest)| {
                rest.into_iter().fold(first, |left, (stop_on_failure, next)| {
                    Segment::sequence(left, next, stop_on_failure)
                })
            })
    }

    proptest! {
        #[test]
        fn prop_built_tree_renders_to_itself(tree in line_tree()) {
            let rendered = tree.to_string();
            prop_assert_eq!(parse(&rendered).unwrap(), tree, "{}", rendered);
        }

        #[test]
        fn prop_render_then_parse_is_stable(line in command_line(), device in "[a-z]{1,5}") {
            let line = format!("{} > {}", line, device);
            let tree = parse(&line).unwrap();
            let rendered = tree.to_string();
            prop_assert_eq!(parse(&rendered).unwrap(), tree);
        }
    }
}
