/// Regex-driven lexer for hastack
///
/// Splits source text into location-tagged tokens. Every token, AST node and
/// type in the toolchain carries a `Location` that originates here.
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// A position in a source file, 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, col: usize) -> Self {
        Location {
            file: file.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:", self.file, self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Int,
    Char,
    Word,
    OpenQuote,
    CloseQuote,
    OpenBracket,
    CloseBracket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: Location,
}

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t\r]+").expect("whitespace pattern"));
static INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").expect("int pattern"));
static CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'([^'])'").expect("char pattern"));
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s\d{}\[\]]+").expect("word pattern"));

/// Tokenize a whole source string.
///
/// Lexing is total: whitespace is skipped, digits become `Int`, quoted single
/// characters become `Char`, braces and brackets delimit quotes and lists,
/// and any other run of characters is a `Word`.
pub fn lex(file: &str, source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut col = 1;

    while !rest.is_empty() {
        if let Some(m) = WHITESPACE.find(rest) {
            col += m.as_str().chars().count();
            rest = &rest[m.end()..];
            continue;
        }
        if let Some(stripped) = rest.strip_prefix('\n') {
            col = 1;
            line += 1;
            rest = stripped;
            continue;
        }

        let location = Location::new(file, line, col);
        if let Some(m) = INT.find(rest) {
            col += m.as_str().chars().count();
            rest = &rest[m.end()..];
            tokens.push(Token {
                kind: TokenKind::Int,
                value: m.as_str().to_string(),
                location,
            });
            continue;
        }
        if let Some(caps) = CHAR.captures(rest) {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            col += whole.chars().count();
            rest = &rest[whole.len()..];
            tokens.push(Token {
                kind: TokenKind::Char,
                value: inner.to_string(),
                location,
            });
            continue;
        }
        if let Some(delim) = [
            ('{', TokenKind::OpenQuote),
            ('}', TokenKind::CloseQuote),
            ('[', TokenKind::OpenBracket),
            (']', TokenKind::CloseBracket),
        ]
        .iter()
        .find(|(c, _)| rest.starts_with(*c))
        {
            col += 1;
            rest = &rest[1..];
            tokens.push(Token {
                kind: delim.1,
                value: delim.0.to_string(),
                location,
            });
            continue;
        }
        if let Some(m) = WORD.find(rest) {
            col += m.as_str().chars().count();
            rest = &rest[m.end()..];
            tokens.push(Token {
                kind: TokenKind::Word,
                value: m.as_str().to_string(),
                location,
            });
            continue;
        }

        // Stray control character no rule claims: skip it.
        let mut chars = rest.chars();
        chars.next();
        rest = chars.as_str();
        col += 1;
    }

    tokens
}
