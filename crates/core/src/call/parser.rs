use thiserror::Error;

use super::value::PyValue;

/// A call expression split into its function name and arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCall {
    /// Last segment of the (possibly dotted) callee name.
    pub function: String,
    pub positional: Vec<PyValue>,
    pub keywords: Vec<(String, PyValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("not a call expression: {0}")]
    NotACall(String),
    #[error("unexpected end of input while parsing {0}")]
    UnexpectedEnd(&'static str),
    #[error("expected {expected} at offset {offset}, found {found:?}")]
    Expected { expected: &'static str, offset: usize, found: char },
    #[error("argument unpacking at offset {0} cannot be bound statically")]
    Unpacking(usize),
    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),
}

/// Parse `name(arg, ..., key=value, ...)`.
///
/// Text after the closing parenthesis (attribute access, chained calls) is
/// ignored: the arguments belong to the first call.
pub fn parse_call(text: &str) -> Result<ParsedCall, ParseError> {
    let mut parser = Parser::new(text);
    parser.skip_ws();
    let name = parser
        .dotted_name()
        .ok_or_else(|| ParseError::NotACall(text.trim().to_string()))?;
    parser.skip_ws();
    if !parser.eat('(') {
        return Err(ParseError::NotACall(text.trim().to_string()));
    }
    let function = name.rsplit('.').next().unwrap_or(&name).to_string();

    let mut positional = Vec::new();
    let mut keywords = Vec::new();
    loop {
        parser.skip_ws();
        match parser.peek() {
            None => return Err(ParseError::UnexpectedEnd("argument list")),
            Some(')') => {
                parser.bump();
                break;
            }
            Some('*') => return Err(ParseError::Unpacking(parser.pos)),
            _ => {}
        }

        if let Some(keyword) = parser.keyword_prefix() {
            let value = parser.value(false)?;
            keywords.push((keyword, value));
        } else {
            if !keywords.is_empty() {
                // Python rejects this too; the evaluator would have failed.
                return Err(ParseError::Expected {
                    expected: "keyword argument",
                    offset: parser.pos,
                    found: parser.peek().unwrap_or(' '),
                });
            }
            positional.push(parser.value(false)?);
        }

        parser.skip_ws();
        match parser.peek() {
            Some(',') => {
                parser.bump();
            }
            Some(')') => {
                parser.bump();
                break;
            }
            Some(found) => {
                return Err(ParseError::Expected { expected: "',' or ')'", offset: parser.pos, found })
            }
            None => return Err(ParseError::UnexpectedEnd("argument list")),
        }
    }

    Ok(ParsedCall { function, positional, keywords })
}

/// Parse a single Python value expression, e.g. a parameter default.
pub fn parse_value(text: &str) -> Result<PyValue, ParseError> {
    let mut parser = Parser::new(text);
    parser.value(false)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

/// Raised inside literal parsing when the text is valid Python but not a
/// literal we decode; the caller rewinds and keeps the source as `Expr`.
enum Literal {
    Value(PyValue),
    NotLiteral,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '\\' && matches!(self.peek_nth(1), Some('\n') | Some('\r')) {
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c == '_' || c.is_alphabetic() => {
                self.bump();
            }
            _ => return None,
        }
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }
        Some(&self.src[start..self.pos])
    }

    fn dotted_name(&mut self) -> Option<String> {
        let start = self.pos;
        self.identifier()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.eat('.') {
                self.skip_ws();
                if self.identifier().is_some() {
                    continue;
                }
            }
            self.pos = save;
            break;
        }
        let text: String = self.src[start..self.pos].split_whitespace().collect();
        Some(text)
    }

    /// `name =` (but not `name ==`) at the current position.
    fn keyword_prefix(&mut self) -> Option<String> {
        let save = self.pos;
        if let Some(name) = self.identifier() {
            self.skip_ws();
            if self.peek() == Some('=') && self.peek_nth(1) != Some('=') {
                self.bump();
                return Some(name.to_string());
            }
        }
        self.pos = save;
        None
    }

    /// Parse one value. Literal syntax is decoded; otherwise the whole
    /// expression up to the next top-level separator is kept as source.
    fn value(&mut self, in_dict_key: bool) -> Result<PyValue, ParseError> {
        self.skip_ws();
        let start = self.pos;
        if let Literal::Value(value) = self.literal()? {
            self.skip_ws();
            if self.at_separator(in_dict_key) {
                return Ok(value);
            }
        }
        self.pos = start;
        self.skip_expression(in_dict_key)?;
        let source = self.src[start..self.pos].trim();
        if source.is_empty() {
            return match self.peek() {
                Some(found) => Err(ParseError::Expected { expected: "a value", offset: self.pos, found }),
                None => Err(ParseError::UnexpectedEnd("value")),
            };
        }
        Ok(PyValue::Expr(source.to_string()))
    }

    fn at_separator(&self, in_dict_key: bool) -> bool {
        match self.peek() {
            None => true,
            Some(',' | ')' | ']' | '}') => true,
            Some(':') => in_dict_key,
            _ => false,
        }
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        let Some(c) = self.peek() else {
            return Ok(Literal::NotLiteral);
        };
        match c {
            '-' | '+' => {
                self.bump();
                self.skip_ws();
                match self.number()? {
                    Literal::Value(PyValue::Int(i)) if c == '-' => {
                        Ok(Literal::Value(PyValue::Int(-i)))
                    }
                    Literal::Value(PyValue::Float(f)) if c == '-' => {
                        Ok(Literal::Value(PyValue::Float(-f)))
                    }
                    other => Ok(other),
                }
            }
            '0'..='9' => self.number(),
            '.' if matches!(self.peek_nth(1), Some('0'..='9')) => self.number(),
            '\'' | '"' => self.strings(),
            '[' => Ok(match self.sequence('[', ']')? {
                Some(items) => Literal::Value(PyValue::List(items)),
                None => Literal::NotLiteral,
            }),
            '(' => self.parenthesized(),
            '{' => self.braced(),
            c if c == '_' || c.is_alphabetic() => {
                if self.string_prefix_len().is_some() {
                    return self.strings();
                }
                let name = self.dotted_name().unwrap_or_default();
                Ok(Literal::Value(match name.as_str() {
                    "None" => PyValue::None,
                    "True" => PyValue::Bool(true),
                    "False" => PyValue::Bool(false),
                    _ => PyValue::Name(name),
                }))
            }
            _ => Ok(Literal::NotLiteral),
        }
    }

    fn number(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        let rest = self.rest();
        let lower = rest.get(..2).map(|s| s.to_ascii_lowercase());
        if let Some(radix) = match lower.as_deref() {
            Some("0x") => Some(16),
            Some("0o") => Some(8),
            Some("0b") => Some(2),
            _ => None,
        } {
            self.pos += 2;
            while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
                self.bump();
            }
            let digits: String = self.src[start + 2..self.pos].chars().filter(|c| *c != '_').collect();
            return Ok(i64::from_str_radix(&digits, radix)
                .map(|i| Literal::Value(PyValue::Int(i)))
                .unwrap_or(Literal::NotLiteral));
        }

        let mut is_float = false;
        self.digits();
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if matches!(self.peek(), Some('0'..='9')) {
                is_float = true;
                self.digits();
            } else {
                self.pos = save;
            }
        }
        if matches!(self.peek(), Some('j' | 'J')) {
            self.bump();
            return Ok(Literal::NotLiteral);
        }
        let text: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
        if is_float {
            Ok(text.parse::<f64>().map(|f| Literal::Value(PyValue::Float(f))).unwrap_or(Literal::NotLiteral))
        } else {
            Ok(text.parse::<i64>().map(|i| Literal::Value(PyValue::Int(i))).unwrap_or(Literal::NotLiteral))
        }
    }

    fn digits(&mut self) {
        while matches!(self.peek(), Some('0'..='9' | '_')) {
            self.bump();
        }
    }

    /// Length of a string prefix (`r`, `u`, `b`, `f`, `rb`, ...) directly
    /// followed by a quote.
    fn string_prefix_len(&self) -> Option<usize> {
        let rest = self.rest();
        for len in 1..=2 {
            let Some(prefix) = rest.get(..len) else { continue };
            if !prefix.chars().all(|c| "rRuUbBfF".contains(c)) {
                return None;
            }
            if matches!(rest[len..].chars().next(), Some('\'' | '"')) {
                return Some(len);
            }
        }
        None
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Literal, ParseError> {
        let mut out = String::new();
        let mut decoded = true;
        loop {
            match self.string_literal()? {
                Some(part) => out.push_str(&part),
                None => decoded = false,
            }
            let save = self.pos;
            self.skip_ws();
            let next_is_string = matches!(self.peek(), Some('\'' | '"')) || self.string_prefix_len().is_some();
            if !next_is_string {
                self.pos = save;
                break;
            }
        }
        Ok(if decoded { Literal::Value(PyValue::Str(out)) } else { Literal::NotLiteral })
    }

    /// Consume one string literal. Returns `None` for bytes and f-strings,
    /// which are consumed but not decoded.
    fn string_literal(&mut self) -> Result<Option<String>, ParseError> {
        let start = self.pos;
        let prefix_len = if matches!(self.peek(), Some('\'' | '"')) { 0 } else { self.string_prefix_len().unwrap_or(0) };
        let prefix = self.src[self.pos..self.pos + prefix_len].to_ascii_lowercase();
        self.pos += prefix_len;
        let raw = prefix.contains('r');
        let decodable = !prefix.contains('b') && !prefix.contains('f');

        let quote = self.bump().ok_or(ParseError::UnexpectedEnd("string"))?;
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(ParseError::UnterminatedString(start))?;
            if c == quote {
                if !triple {
                    break;
                }
                if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                    self.bump();
                    self.bump();
                    break;
                }
                out.push(c);
                continue;
            }
            if !triple && c == '\n' {
                return Err(ParseError::UnterminatedString(start));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escaped = self.bump().ok_or(ParseError::UnterminatedString(start))?;
            if raw {
                out.push('\\');
                out.push(escaped);
                continue;
            }
            match escaped {
                '\n' => {}
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                'a' => out.push('\x07'),
                'b' => out.push('\x08'),
                'f' => out.push('\x0c'),
                'v' => out.push('\x0b'),
                '\\' | '\'' | '"' => out.push(escaped),
                'x' => out.push(self.hex_escape(2).unwrap_or('\u{fffd}')),
                'u' => out.push(self.hex_escape(4).unwrap_or('\u{fffd}')),
                'U' => out.push(self.hex_escape(8).unwrap_or('\u{fffd}')),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
        Ok(decodable.then_some(out))
    }

    fn hex_escape(&mut self, len: usize) -> Option<char> {
        let digits = self.rest().get(..len)?;
        let code = u32::from_str_radix(digits, 16).ok()?;
        self.pos += len;
        char::from_u32(code)
    }

    /// Comma-separated values up to `close`. `Ok(None)` means valid syntax
    /// that is not a plain literal container (comprehension, starred item).
    fn sequence(&mut self, open: char, close: char) -> Result<Option<Vec<PyValue>>, ParseError> {
        if !self.eat(open) {
            return Ok(None);
        }
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(Some(items));
            }
            if self.peek() == Some('*') {
                return Ok(None);
            }
            let item = self.value(false)?;
            if is_comprehension(&item) {
                return Ok(None);
            }
            items.push(item);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(close) {
                return Ok(Some(items));
            }
            return Ok(None);
        }
    }

    fn parenthesized(&mut self) -> Result<Literal, ParseError> {
        self.bump();
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            if self.eat(')') {
                break;
            }
            if self.peek() == Some('*') {
                return Ok(Literal::NotLiteral);
            }
            let item = self.value(false)?;
            if is_comprehension(&item) {
                return Ok(Literal::NotLiteral);
            }
            items.push(item);
            self.skip_ws();
            if self.eat(',') {
                saw_comma = true;
                continue;
            }
            if self.eat(')') {
                break;
            }
            return Ok(Literal::NotLiteral);
        }
        if items.len() == 1 && !saw_comma {
            return Ok(Literal::Value(items.remove(0)));
        }
        Ok(Literal::Value(PyValue::Tuple(items)))
    }

    fn braced(&mut self) -> Result<Literal, ParseError> {
        self.bump();
        self.skip_ws();
        if self.eat('}') {
            return Ok(Literal::Value(PyValue::Dict(Vec::new())));
        }
        if self.peek() == Some('*') {
            return Ok(Literal::NotLiteral);
        }
        let first = self.value(true)?;
        self.skip_ws();
        if !self.eat(':') {
            // A set: rewind and reuse the sequence parser.
            let mut items = vec![first];
            loop {
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                if !self.eat(',') {
                    return Ok(Literal::NotLiteral);
                }
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                if self.peek() == Some('*') {
                    return Ok(Literal::NotLiteral);
                }
                items.push(self.value(false)?);
            }
            if items.iter().any(is_comprehension) {
                return Ok(Literal::NotLiteral);
            }
            return Ok(Literal::Value(PyValue::Set(items)));
        }

        let mut entries = Vec::new();
        let mut key = first;
        loop {
            let value = self.value(false)?;
            if is_comprehension(&value) {
                return Ok(Literal::NotLiteral);
            }
            entries.push((key, value));
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            if !self.eat(',') {
                return Ok(Literal::NotLiteral);
            }
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            if self.peek() == Some('*') {
                return Ok(Literal::NotLiteral);
            }
            key = self.value(true)?;
            self.skip_ws();
            if !self.eat(':') {
                return Ok(Literal::NotLiteral);
            }
        }
        Ok(Literal::Value(PyValue::Dict(entries)))
    }

    /// Advance past one expression: stops before a top-level `,`, a closing
    /// bracket, or (for dict keys) a `:`. Brackets and strings are balanced.
    fn skip_expression(&mut self, stop_on_colon: bool) -> Result<(), ParseError> {
        let mut depth: Vec<char> = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '\'' | '"' => {
                    self.string_literal()?;
                    continue;
                }
                c if (c.is_alphabetic() || c == '_') && self.string_prefix_len().is_some() => {
                    self.string_literal()?;
                    continue;
                }
                '(' => depth.push(')'),
                '[' => depth.push(']'),
                '{' => depth.push('}'),
                ')' | ']' | '}' => {
                    if depth.is_empty() {
                        return Ok(());
                    }
                    if depth.pop() != Some(c) {
                        return Err(ParseError::Expected { expected: "balanced brackets", offset: self.pos, found: c });
                    }
                }
                ',' if depth.is_empty() => return Ok(()),
                ':' if depth.is_empty() && stop_on_colon => return Ok(()),
                _ => {}
            }
            self.bump();
        }
        if depth.is_empty() {
            Ok(())
        } else {
            Err(ParseError::UnexpectedEnd("bracketed expression"))
        }
    }
}

/// Opaque items whose top level contains a `for` keyword turn the enclosing
/// brackets into a comprehension.
fn is_comprehension(value: &PyValue) -> bool {
    let PyValue::Expr(source) = value else {
        return false;
    };
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut word = String::new();
    for c in source.chars() {
        if let Some(q) = in_string {
            if c == q {
                in_string = None;
            }
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            continue;
        }
        if depth == 0 && word == "for" {
            return true;
        }
        word.clear();
        match c {
            '\'' | '"' => in_string = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth == 0 && word == "for"
}
