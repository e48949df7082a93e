//! Lexer (tokenizer) for Yolang source code
//!
//! Produces one [`Token`] per call to [`TokenSource::next_token`]. Every token
//! kind has a canonical name (see [`TokenKind::name`]); grammar terminals are
//! written with these names, and the parse table matches on them.
//!
//! Once the input is exhausted the lexer keeps returning
//! [`TokenKind::EndOfFile`], so every input reaches the end marker.

use std::fmt;

use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

macro_rules! token_kinds {
    ($($kind:ident),* $(,)?) => {
        /// All token kinds produced by the lexer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TokenKind {
            $($kind),*
        }

        impl TokenKind {
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$kind),*];

            /// Canonical text used for this kind in grammar terminals.
            pub fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$kind => stringify!($kind)),*
                }
            }
        }
    };
}

token_kinds! {
    EndOfFile,

    // Literals and names
    Identifier,
    IntegerConstant,
    FloatConstant,
    StringConstant,
    True,
    False,

    // Keywords
    Func,
    Var,
    If,
    Else,
    While,
    Return,
    Print,
    Scan,

    // Type names
    Int,
    Float,
    Bool,
    String,

    // Operators
    Plus,         // +
    Minus,        // -
    Mul,          // *
    Div,          // /
    Mod,          // %
    Assign,       // =
    Equals,       // ==
    NotEquals,    // !=
    Less,         // <
    LessOrEquals, // <=
    More,         // >
    MoreOrEquals, // >=
    And,          // &&
    Or,           // ||
    Negation,     // !
    Arrow,        // ->

    // Punctuation
    LeftParenthesis,
    RightParenthesis,
    LeftCurly,
    RightCurly,
    LeftSquareBracket,
    RightSquareBracket,
    Comma,
    Colon,
    Semicolon,
}

impl TokenKind {
    /// Inverse of [`TokenKind::name`].
    pub fn from_name(name: &str) -> Option<TokenKind> {
        TokenKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic value carried by literal and identifier tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token, empty for end of file
    pub lexeme: String,
    pub value: Option<TokenValue>,
    pub location: SourceLocation,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            value: None,
            location,
        }
    }

    fn with_value(mut self, value: TokenValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Canonical text matched against grammar terminals.
    pub fn text(&self) -> &'static str {
        self.kind.name()
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("lexer error at line {}, column {}: {}", .location.line, .location.column, .message)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Anything the parsing engine can pull tokens from.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, LexError>;
}

/// Lexer for Yolang source code
#[derive(Debug, Default)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::default();
        lexer.set_text(input);
        lexer
    }

    /// Restart on a new source text.
    pub fn set_text(&mut self, input: &str) {
        self.input = input.chars().collect();
        self.position = 0;
        self.line = 1;
        self.column = 1;
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::EndOfFile, "", loc));
        };

        let single = |kind: TokenKind| -> Result<Token, LexError> { Ok(Token::new(kind, ch, loc)) };
        match ch {
            '"' => self.string_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            '-' if self.eat('>') => Ok(Token::new(TokenKind::Arrow, "->", loc)),
            '=' if self.eat('=') => Ok(Token::new(TokenKind::Equals, "==", loc)),
            '!' if self.eat('=') => Ok(Token::new(TokenKind::NotEquals, "!=", loc)),
            '<' if self.eat('=') => Ok(Token::new(TokenKind::LessOrEquals, "<=", loc)),
            '>' if self.eat('=') => Ok(Token::new(TokenKind::MoreOrEquals, ">=", loc)),
            '&' if self.eat('&') => Ok(Token::new(TokenKind::And, "&&", loc)),
            '|' if self.eat('|') => Ok(Token::new(TokenKind::Or, "||", loc)),

            '+' => single(TokenKind::Plus),
            '-' => single(TokenKind::Minus),
            '*' => single(TokenKind::Mul),
            '/' => single(TokenKind::Div),
            '%' => single(TokenKind::Mod),
            '=' => single(TokenKind::Assign),
            '!' => single(TokenKind::Negation),
            '<' => single(TokenKind::Less),
            '>' => single(TokenKind::More),
            '(' => single(TokenKind::LeftParenthesis),
            ')' => single(TokenKind::RightParenthesis),
            '{' => single(TokenKind::LeftCurly),
            '}' => single(TokenKind::RightCurly),
            '[' => single(TokenKind::LeftSquareBracket),
            ']' => single(TokenKind::RightSquareBracket),
            ',' => single(TokenKind::Comma),
            ':' => single(TokenKind::Colon),
            ';' => single(TokenKind::Semicolon),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Parse string literal
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();
        let mut lexeme = String::from('"');

        while let Some(ch) = self.advance() {
            lexeme.push(ch);
            match ch {
                '"' => {
                    return Ok(Token::new(TokenKind::StringConstant, lexeme, loc)
                        .with_value(TokenValue::Str(string)));
                }
                '\\' => {
                    let escaped = self.advance().ok_or_else(|| LexError {
                        message: "Unexpected end of file in string literal".to_string(),
                        location: self.current_location(),
                    })?;
                    lexeme.push(escaped);

                    let unescaped = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        '0' => '\0',
                        _ => {
                            return Err(LexError {
                                message: format!("Unknown escape sequence: \\{}", escaped),
                                location: self.current_location(),
                            });
                        }
                    };
                    string.push(unescaped);
                }
                _ => string.push(ch),
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse numeric literal: digits, optionally followed by `.` and digits
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::from(first_digit);
        self.take_digits(&mut num_str);

        let is_float = self.peek() == Some('.')
            && self.peek_ahead(1).map_or(false, |c| c.is_ascii_digit());
        if is_float {
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);

            let value = num_str.parse::<f64>().map_err(|_| LexError {
                message: format!("Invalid float literal: {}", num_str),
                location: loc,
            })?;
            return Ok(Token::new(TokenKind::FloatConstant, num_str, loc)
                .with_value(TokenValue::Float(value)));
        }

        let value = num_str.parse::<i64>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", num_str),
            location: loc,
        })?;
        Ok(Token::new(TokenKind::IntegerConstant, num_str, loc).with_value(TokenValue::Int(value)))
    }

    fn take_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.peek().filter(char::is_ascii_digit) {
            into.push(ch);
            self.advance();
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::from(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match ident.as_str() {
            "func" => TokenKind::Func,
            "var" => TokenKind::Var,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "print" => TokenKind::Print,
            "scan" => TokenKind::Scan,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "Int" => TokenKind::Int,
            "Float" => TokenKind::Float,
            "Bool" => TokenKind::Bool,
            "String" => TokenKind::String,
            _ => {
                let value = TokenValue::Name(ident.clone());
                return Token::new(TokenKind::Identifier, ident, loc).with_value(value);
            }
        };
        Token::new(kind, ident, loc)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Consume `expected` if it is the next character
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Result<Token, LexError> {
        self.scan()
    }
}
