//! Text model of the log format.
//!
//! Logs are written in a small subset of Lua table syntax: a sequence
//! of top-level calls `Name( { ... } )` whose single argument is a
//! table of keyed and positional entries. This module turns text into
//! [`Call`]s and provides the quoting helpers the encoder needs.
//!
//! Supported: `--` line comments, `"..."` / `'...'` strings with
//! escapes, `[[...]]` and `[==[...]==]` long strings, signed decimal
//! integers, `true` / `false`, and nested tables separated by `,` or
//! `;`.

use indexmap::IndexMap;

use crate::error::ReplayError;

/// Deepest table nesting accepted; the log format itself needs three.
pub const MAX_DEPTH: usize = 32;

/// A parsed value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Signed integer, wide enough for every `u64` tick.
    Int(i128),
    /// Boolean.
    Bool(bool),
    /// String (quoted or long).
    Str(String),
    /// Nested table.
    Table(Table),
}

impl Value {
    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::Table(_) => "table",
        }
    }
}

/// A value together with the line it started on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// The value.
    pub value: Value,
    /// 1-based source line.
    pub line: usize,
}

/// A table literal: positional entries in order, keyed entries in
/// insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Entries without a key.
    pub positional: Vec<Entry>,
    /// `Key = value` entries.
    pub keyed: IndexMap<String, Entry>,
}

/// One top-level statement `Name( { ... } )`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    /// Function name.
    pub name: String,
    /// Line of the function name.
    pub line: usize,
    /// The table argument.
    pub arg: Table,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Int(i128),
    Str(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Semi,
    Eq,
    Eof,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("'{s}'"),
            Self::Int(n) => format!("integer {n}"),
            Self::Str(_) => "string".into(),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Comma => "','".into(),
            Self::Semi => "';'".into(),
            Self::Eq => "'='".into(),
            Self::Eof => "end of input".into(),
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn tokens(mut self) -> Result<Vec<(Tok, usize)>, ReplayError> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia();
            let line = self.line;
            let Some(c) = self.peek_at(0) else {
                out.push((Tok::Eof, line));
                return Ok(out);
            };
            let tok = match c {
                '{' => self.single(Tok::LBrace),
                '}' => self.single(Tok::RBrace),
                '(' => self.single(Tok::LParen),
                ')' => self.single(Tok::RParen),
                ',' => self.single(Tok::Comma),
                ';' => self.single(Tok::Semi),
                '=' => self.single(Tok::Eq),
                '"' | '\'' => Tok::Str(self.quoted()?),
                '[' => Tok::Str(self.long_string()?),
                '-' | '0'..='9' => Tok::Int(self.integer()?),
                c if c.is_ascii_alphabetic() || c == '_' => Tok::Ident(self.ident()),
                other => {
                    return Err(ReplayError::malformed(
                        line,
                        format!("unexpected character '{other}'"),
                    ))
                }
            };
            out.push((tok, line));
        }
    }

    fn single(&mut self, tok: Tok) -> Tok {
        self.bump();
        tok
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_at(0) {
            if c.is_whitespace() {
                self.bump();
            } else if c == '-' && self.peek_at(1) == Some('-') {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn ident(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek_at(0) {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        s
    }

    fn integer(&mut self) -> Result<i128, ReplayError> {
        let line = self.line;
        let mut s = String::new();
        if self.peek_at(0) == Some('-') {
            s.push('-');
            self.bump();
        }
        while let Some(c) = self.peek_at(0) {
            if c.is_ascii_digit() {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if s == "-" || s.is_empty() {
            return Err(ReplayError::malformed(line, "expected digits"));
        }
        if matches!(self.peek_at(0), Some(c) if c == '.' || c.is_ascii_alphabetic()) {
            return Err(ReplayError::malformed(
                line,
                format!("'{s}' is not an integer"),
            ));
        }
        s.parse::<i128>()
            .map_err(|_| ReplayError::malformed(line, format!("integer '{s}' is out of range")))
    }

    fn quoted(&mut self) -> Result<String, ReplayError> {
        let line = self.line;
        let Some(quote) = self.bump() else {
            return Err(ReplayError::malformed(line, "unterminated string"));
        };
        let mut s = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(ReplayError::malformed(line, "unterminated string"))
                }
                Some(c) if c == quote => return Ok(s),
                Some('\\') => s.push(self.escape(line)?),
                Some(c) => s.push(c),
            }
        }
    }

    fn escape(&mut self, line: usize) -> Result<char, ReplayError> {
        let c = match self.bump() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('\n') => '\n',
            Some(d) if d.is_ascii_digit() => {
                let mut code = d.to_digit(10).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek_at(0).and_then(|c| c.to_digit(10)) {
                        Some(v) => {
                            code = code * 10 + v;
                            self.bump();
                        }
                        None => break,
                    }
                }
                char::from_u32(code).ok_or_else(|| {
                    ReplayError::malformed(line, format!("invalid escape \\{code}"))
                })?
            }
            Some(other) => {
                return Err(ReplayError::malformed(
                    line,
                    format!("invalid escape '\\{other}'"),
                ))
            }
            None => return Err(ReplayError::malformed(line, "unterminated string")),
        };
        Ok(c)
    }

    fn long_string(&mut self) -> Result<String, ReplayError> {
        let line = self.line;
        self.bump();
        let mut level = 0;
        while self.peek_at(0) == Some('=') {
            level += 1;
            self.bump();
        }
        if self.bump() != Some('[') {
            return Err(ReplayError::malformed(line, "expected long string"));
        }
        // A newline right after the opening bracket is not part of the string.
        if self.peek_at(0) == Some('\n') {
            self.bump();
        }
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(ReplayError::malformed(line, "unterminated long string")),
                Some(']') if self.closes(level) => {
                    for _ in 0..=level {
                        self.bump();
                    }
                    return Ok(s);
                }
                Some(c) => s.push(c),
            }
        }
    }

    /// Whether the input after a consumed `]` is `level` `=` signs and `]`.
    fn closes(&self, level: usize) -> bool {
        (0..level).all(|i| self.peek_at(i) == Some('=')) && self.peek_at(level) == Some(']')
    }
}

struct Parser {
    toks: Vec<(Tok, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        self.toks.get(self.pos).map_or(&Tok::Eof, |(t, _)| t)
    }

    fn peek2(&self) -> &Tok {
        self.toks.get(self.pos + 1).map_or(&Tok::Eof, |(t, _)| t)
    }

    fn line(&self) -> usize {
        self.toks
            .get(self.pos)
            .or_else(|| self.toks.last())
            .map_or(1, |(_, l)| *l)
    }

    fn next(&mut self) -> Tok {
        let tok = self.peek().clone();
        if self.pos < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: Tok) -> Result<(), ReplayError> {
        let line = self.line();
        let got = self.next();
        if got == want {
            Ok(())
        } else {
            Err(ReplayError::malformed(
                line,
                format!("expected {}, found {}", want.describe(), got.describe()),
            ))
        }
    }

    fn chunk(&mut self) -> Result<Vec<Call>, ReplayError> {
        let mut calls = Vec::new();
        loop {
            while *self.peek() == Tok::Semi {
                self.next();
            }
            let line = self.line();
            match self.next() {
                Tok::Eof => return Ok(calls),
                Tok::Ident(name) => {
                    self.expect(Tok::LParen)?;
                    self.expect(Tok::LBrace)?;
                    let arg = self.table()?;
                    self.expect(Tok::RParen)?;
                    calls.push(Call { name, line, arg });
                }
                other => {
                    return Err(ReplayError::malformed(
                        line,
                        format!("expected statement, found {}", other.describe()),
                    ))
                }
            }
        }
    }

    /// Parse table entries; the opening brace is already consumed.
    fn table(&mut self) -> Result<Table, ReplayError> {
        if self.depth >= MAX_DEPTH {
            return Err(ReplayError::malformed(self.line(), "table nested too deeply"));
        }
        self.depth += 1;
        let table = self.entries();
        self.depth -= 1;
        table
    }

    fn entries(&mut self) -> Result<Table, ReplayError> {
        let mut table = Table::default();
        loop {
            if *self.peek() == Tok::RBrace {
                self.next();
                return Ok(table);
            }
            let line = self.line();
            let keyed = *self.peek2() == Tok::Eq;
            if let (Tok::Ident(key), true) = (self.peek().clone(), keyed) {
                self.next();
                self.next();
                let value = self.value()?;
                if table.keyed.contains_key(&key) {
                    return Err(ReplayError::malformed(line, format!("duplicate key '{key}'")));
                }
                table.keyed.insert(key, Entry { value, line });
            } else {
                let value = self.value()?;
                table.positional.push(Entry { value, line });
            }
            match self.next() {
                Tok::Comma | Tok::Semi => {}
                Tok::RBrace => return Ok(table),
                other => {
                    return Err(ReplayError::malformed(
                        self.line(),
                        format!("expected ',' or '}}', found {}", other.describe()),
                    ))
                }
            }
        }
    }

    fn value(&mut self) -> Result<Value, ReplayError> {
        let line = self.line();
        match self.next() {
            Tok::Int(n) => Ok(Value::Int(n)),
            Tok::Str(s) => Ok(Value::Str(s)),
            Tok::Ident(id) if id == "true" => Ok(Value::Bool(true)),
            Tok::Ident(id) if id == "false" => Ok(Value::Bool(false)),
            Tok::LBrace => Ok(Value::Table(self.table()?)),
            other => Err(ReplayError::malformed(
                line,
                format!("expected value, found {}", other.describe()),
            )),
        }
    }
}

/// Parse a whole log text into its top-level calls.
///
/// # Errors
///
/// [`ReplayError::MalformedLog`] with the line of the first lexical or
/// syntax error.
pub fn parse(text: &str) -> Result<Vec<Call>, ReplayError> {
    let toks = Lexer::new(text).tokens()?;
    Parser {
        toks,
        pos: 0,
        depth: 0,
    }
    .chunk()
}

/// Render `s` as a double-quoted string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render `s` as a long string literal, choosing the lowest bracket
/// level whose closing sequence does not occur in `s`.
pub fn long_string(s: &str) -> String {
    let mut level = 0;
    loop {
        let close = format!("]{}]", "=".repeat(level));
        // A trailing `]` could merge with the closing bracket.
        if !s.contains(&close) && !format!("{s}]").contains(&close) {
            break;
        }
        level += 1;
    }
    let eq = "=".repeat(level);
    let lead = if s.starts_with('\n') { "\n" } else { "" };
    format!("[{eq}[{lead}{s}]{eq}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn single(text: &str) -> Call {
        let mut calls = parse(text).unwrap();
        assert_eq!(calls.len(), 1);
        calls.remove(0)
    }

    #[test]
    fn parses_keyed_and_positional_entries() {
        let call = single("Log( { GameCycle = 12, Action = \"move\", Engine = { 1, -2, 3 } } )");
        assert_eq!(call.name, "Log");
        assert_eq!(call.arg.keyed["GameCycle"].value, Value::Int(12));
        assert_eq!(call.arg.keyed["Action"].value, Value::Str("move".into()));
        let Value::Table(engine) = &call.arg.keyed["Engine"].value else {
            panic!("Engine is not a table");
        };
        let nums: Vec<_> = engine.positional.iter().map(|e| e.value.clone()).collect();
        assert_eq!(nums, vec![Value::Int(1), Value::Int(-2), Value::Int(3)]);
    }

    #[test]
    fn keeps_key_order() {
        let call = single("T( { b = 1, a = 2, c = 3 } )");
        let keys: Vec<_> = call.arg.keyed.keys().cloned().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn skips_comments_and_tracks_lines() {
        let text = "\n--- -----\n--- MODULE: replay list\n\nA( {} )\nB( { x = true } )\n";
        let calls = parse(text).unwrap();
        assert_eq!(calls[0].line, 5);
        assert_eq!(calls[1].line, 6);
        assert_eq!(calls[1].arg.keyed["x"].value, Value::Bool(true));
    }

    #[test]
    fn long_strings_keep_content_verbatim() {
        let call = single("Log( { Value = [[say \"hi\" \\n]] } )");
        assert_eq!(
            call.arg.keyed["Value"].value,
            Value::Str("say \"hi\" \\n".into())
        );
        let call = single("Log( { Value = [==[a]]b]=]c]==] } )");
        assert_eq!(call.arg.keyed["Value"].value, Value::Str("a]]b]=]c".into()));
    }

    #[test]
    fn errors_report_line() {
        let err = parse("A( {} )\nB( { x = } )").unwrap_err();
        assert!(matches!(err, ReplayError::MalformedLog { line: 2, .. }), "{err}");

        let err = parse("A( { x = \"open } )").unwrap_err();
        assert!(matches!(err, ReplayError::MalformedLog { line: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = parse("A( { x = 1, x = 2 } )").unwrap_err();
        assert!(err.to_string().contains("duplicate key 'x'"));
    }

    #[test]
    fn rejects_non_integer_numbers() {
        assert!(parse("A( { x = 1.5 } )").is_err());
        assert!(parse("A( { x = 99999999999999999999 } )").is_err());
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let depth = 200_000;
        let text = format!("A( {{ x = {}{} }} )", "{".repeat(depth), "}".repeat(depth));
        let err = parse(&text).unwrap_err();
        let ReplayError::MalformedLog { line, detail } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*line, 1);
        assert!(detail.contains("nested"), "{detail}");
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let inner = MAX_DEPTH - 1;
        let text = format!("A( {{ x = {}{} }} )", "{".repeat(inner - 1), "}".repeat(inner - 1));
        assert_eq!(parse(&text).unwrap().len(), 1);
    }

    #[test]
    fn integers_cover_the_full_tick_range() {
        let call = single(&format!("Log( {{ GameCycle = {} }} )", u64::MAX));
        assert_eq!(
            call.arg.keyed["GameCycle"].value,
            Value::Int(i128::from(u64::MAX))
        );
    }

    #[test]
    fn quote_escapes() {
        assert_eq!(quote("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
    }

    proptest! {
        #[test]
        fn quoted_strings_round_trip(s in "\\PC*") {
            let text = format!("A( {{ v = {} }} )", quote(&s));
            let call = single(&text);
            prop_assert_eq!(&call.arg.keyed["v"].value, &Value::Str(s));
        }

        #[test]
        fn long_strings_round_trip(s in "[a-z\\]=\\[\n ]{0,24}") {
            let text = format!("A( {{ v = {} }} )", long_string(&s));
            let call = single(&text);
            prop_assert_eq!(&call.arg.keyed["v"].value, &Value::Str(s));
        }
    }
}
