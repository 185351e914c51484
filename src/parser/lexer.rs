//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Literal tokens keep their source spelling (`0x1fUL`, `'\n'`, `"a\tb"`) since
//! later phases re-emit them rather than evaluate them. Comments are not
//! tokens; they are collected separately, in source order, so the parser can
//! attach them to the declarations around them. Preprocessor lines are
//! skipped.

use crate::syntax::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals, as spelled in the source
    Number(String),
    CharLiteral(String),
    StringLiteral(String),

    // Identifiers
    Ident(String),

    // Keywords
    Auto,
    Bool,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Offsetof,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    VaArg,
    Void,
    Volatile,
    While,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    LtLt,  // <<
    GtGt,  // >>

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    AmpEq,     // &=
    PipeEq,    // |=
    CaretEq,   // ^=
    LtLtEq,    // <<=
    GtGtEq,    // >>=

    // Increment/Decrement
    PlusPlus,   // ++
    MinusMinus, // --

    // Member access
    Dot,   // .
    Arrow, // ->

    // Ternary
    Question, // ?
    Colon,    // :

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Ellipsis,  // ...

    // End of file
    Eof,
}

/// A token and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    /// Location just past the token's last character.
    pub end: SourceLocation,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        self.location
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "number {}", n),
            TokenKind::CharLiteral(c) => return write!(f, "char literal {}", c),
            TokenKind::StringLiteral(s) => return write!(f, "string literal {}", s),
            TokenKind::Ident(s) => return write!(f, "identifier '{}'", s),
            TokenKind::Eof => return write!(f, "end of file"),
            TokenKind::Auto => "auto",
            TokenKind::Bool => "_Bool",
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Char => "char",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Default => "default",
            TokenKind::Do => "do",
            TokenKind::Double => "double",
            TokenKind::Else => "else",
            TokenKind::Enum => "enum",
            TokenKind::Extern => "extern",
            TokenKind::Float => "float",
            TokenKind::For => "for",
            TokenKind::Goto => "goto",
            TokenKind::If => "if",
            TokenKind::Inline => "inline",
            TokenKind::Int => "int",
            TokenKind::Long => "long",
            TokenKind::Offsetof => "offsetof",
            TokenKind::Register => "register",
            TokenKind::Restrict => "restrict",
            TokenKind::Return => "return",
            TokenKind::Short => "short",
            TokenKind::Signed => "signed",
            TokenKind::Sizeof => "sizeof",
            TokenKind::Static => "static",
            TokenKind::Struct => "struct",
            TokenKind::Switch => "switch",
            TokenKind::Typedef => "typedef",
            TokenKind::Union => "union",
            TokenKind::Unsigned => "unsigned",
            TokenKind::VaArg => "va_arg",
            TokenKind::Void => "void",
            TokenKind::Volatile => "volatile",
            TokenKind::While => "while",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::LtLtEq => "<<=",
            TokenKind::GtGtEq => ">>=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Ellipsis => "...",
        };
        write!(f, "'{}'", text)
    }
}

/// A `//` or `/* */` comment, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub location: SourceLocation,
}

/// Lexer error type
#[derive(Debug, Error)]
#[error("Lexer error at line {}, column {}: {message}", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    comments: Vec<Comment>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            comments: Vec::new(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                let loc = self.current_location();
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location: loc,
                    end: loc,
                });
                break;
            }

            if self.peek() == Some('#') && self.at_line_start() {
                self.skip_preprocessor_directive();
                continue;
            }

            let location = self.current_location();
            let kind = self.next_token()?;
            tokens.push(Token {
                kind,
                location,
                end: self.current_location(),
            });
        }

        Ok(tokens)
    }

    /// Comments seen so far, in source order.
    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<TokenKind, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        let kind = match ch {
            '"' => self.quoted('"', String::new(), loc)?,
            '\'' => self.quoted('\'', String::new(), loc)?,

            '0'..='9' => self.number_literal(ch),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number_literal(ch),

            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch, loc)?,

            '+' => self.pick(&[("+", TokenKind::PlusPlus), ("=", TokenKind::PlusEq)], TokenKind::Plus),
            '-' => self.pick(
                &[
                    ("-", TokenKind::MinusMinus),
                    ("=", TokenKind::MinusEq),
                    (">", TokenKind::Arrow),
                ],
                TokenKind::Minus,
            ),
            '*' => self.pick(&[("=", TokenKind::StarEq)], TokenKind::Star),
            '/' => self.pick(&[("=", TokenKind::SlashEq)], TokenKind::Slash),
            '%' => self.pick(&[("=", TokenKind::PercentEq)], TokenKind::Percent),
            '=' => self.pick(&[("=", TokenKind::EqEq)], TokenKind::Eq),
            '!' => self.pick(&[("=", TokenKind::NotEq)], TokenKind::Bang),
            '<' => self.pick(
                &[
                    ("<=", TokenKind::LtLtEq),
                    ("<", TokenKind::LtLt),
                    ("=", TokenKind::Le),
                ],
                TokenKind::Lt,
            ),
            '>' => self.pick(
                &[
                    (">=", TokenKind::GtGtEq),
                    (">", TokenKind::GtGt),
                    ("=", TokenKind::Ge),
                ],
                TokenKind::Gt,
            ),
            '&' => self.pick(&[("&", TokenKind::AndAnd), ("=", TokenKind::AmpEq)], TokenKind::Amp),
            '|' => self.pick(&[("|", TokenKind::OrOr), ("=", TokenKind::PipeEq)], TokenKind::Pipe),
            '^' => self.pick(&[("=", TokenKind::CaretEq)], TokenKind::Caret),
            '.' => self.pick(&[("..", TokenKind::Ellipsis)], TokenKind::Dot),
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                return Err(LexError {
                    message: format!("Unexpected character: '{}'", ch),
                    location: loc,
                })
            }
        };

        Ok(kind)
    }

    /// Longest-match selection among multi-character operators sharing a
    /// first character. `choices` lists the remaining characters, longest
    /// first.
    fn pick(&mut self, choices: &[(&str, TokenKind)], single: TokenKind) -> TokenKind {
        for (rest, kind) in choices {
            let matches = rest
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek_ahead(i) == Some(c));
            if matches {
                for _ in 0..rest.chars().count() {
                    self.advance();
                }
                return kind.clone();
            }
        }
        single
    }

    /// Scan a string or character literal after its opening quote, keeping
    /// the spelling (quotes and escapes) intact.
    fn quoted(
        &mut self,
        quote: char,
        mut text: String,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        text.push(quote);

        while let Some(ch) = self.peek() {
            match ch {
                '\n' => break,
                '\\' => {
                    self.advance();
                    text.push('\\');
                    match self.advance() {
                        Some(escaped) => text.push(escaped),
                        None => break,
                    }
                }
                _ => {
                    self.advance();
                    text.push(ch);
                    if ch == quote {
                        return Ok(if quote == '"' {
                            TokenKind::StringLiteral(text)
                        } else {
                            TokenKind::CharLiteral(text)
                        });
                    }
                }
            }
        }

        Err(LexError {
            message: if quote == '"' {
                "Unterminated string literal".to_string()
            } else {
                "Unterminated character literal".to_string()
            },
            location: loc,
        })
    }

    /// Scan a numeric constant: decimal, octal, hex, floating, with suffixes.
    fn number_literal(&mut self, first: char) -> TokenKind {
        let mut text = String::new();
        text.push(first);
        let hex = first == '0' && matches!(self.peek(), Some('x') | Some('X'));

        while let Some(ch) = self.peek() {
            let exponent_sign = matches!(ch, '+' | '-')
                && match text.chars().last() {
                    Some('e') | Some('E') => !hex,
                    Some('p') | Some('P') => hex,
                    _ => false,
                };
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Number(text)
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(
        &mut self,
        first_char: char,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Wide literals: L"..." and L'x'
        if ident == "L" {
            if let Some(quote @ ('"' | '\'')) = self.peek() {
                self.advance();
                return self.quoted(quote, ident, loc);
            }
        }

        let token = match ident.as_str() {
            "auto" => TokenKind::Auto,
            "_Bool" => TokenKind::Bool,
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "char" => TokenKind::Char,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "do" => TokenKind::Do,
            "double" => TokenKind::Double,
            "else" => TokenKind::Else,
            "enum" => TokenKind::Enum,
            "extern" => TokenKind::Extern,
            "float" => TokenKind::Float,
            "for" => TokenKind::For,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "inline" | "__inline" | "__inline__" => TokenKind::Inline,
            "int" => TokenKind::Int,
            "long" => TokenKind::Long,
            "offsetof" => TokenKind::Offsetof,
            "register" => TokenKind::Register,
            "restrict" | "__restrict" => TokenKind::Restrict,
            "return" => TokenKind::Return,
            "short" => TokenKind::Short,
            "signed" | "__signed__" => TokenKind::Signed,
            "sizeof" => TokenKind::Sizeof,
            "static" => TokenKind::Static,
            "struct" => TokenKind::Struct,
            "switch" => TokenKind::Switch,
            "typedef" => TokenKind::Typedef,
            "union" => TokenKind::Union,
            "unsigned" => TokenKind::Unsigned,
            "va_arg" => TokenKind::VaArg,
            "void" => TokenKind::Void,
            "volatile" | "__volatile__" => TokenKind::Volatile,
            "while" => TokenKind::While,
            _ => TokenKind::Ident(ident),
        };

        Ok(token)
    }

    /// Skip whitespace, recording comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some('\x0c') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Single-line comment (// ...), not including the newline
    fn line_comment(&mut self) {
        let location = self.current_location();
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }
        self.comments.push(Comment { text, location });
    }

    /// Multi-line comment (/* ... */)
    fn block_comment(&mut self) -> Result<(), LexError> {
        let location = self.current_location();
        let mut text = String::from("/*");
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                text.push_str("*/");
                self.comments.push(Comment { text, location });
                return Ok(());
            }
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location,
        })
    }

    /// Skip preprocessor directive, honouring backslash line continuations
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\\' && self.peek() == Some('\n') {
                self.advance();
                continue;
            }
            if ch == '\n' {
                break;
            }
        }
    }

    /// True if only whitespace precedes the current position on its line.
    fn at_line_start(&self) -> bool {
        self.input[..self.position]
            .iter()
            .rev()
            .take_while(|&&c| c != '\n')
            .all(|c| c.is_whitespace())
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
        let ch = *self.input.get(self.position)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("int main() { return 0; }");

        assert_eq!(
            tokens,
            vec![
                TokenKind::Int,
                TokenKind::Ident("main".into()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Number("0".into()),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("++ -- += -= == != && || <<= >>= ... -> &= |= ^=");

        assert_eq!(
            tokens,
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::LtLtEq,
                TokenKind::GtGtEq,
                TokenKind::Ellipsis,
                TokenKind::Arrow,
                TokenKind::AmpEq,
                TokenKind::PipeEq,
                TokenKind::CaretEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_collected() {
        let mut lexer = Lexer::new("int x; // trailing\n/* block\ncomment */ int z;");
        let tokens = lexer.tokenize().unwrap();
        let comments = lexer.take_comments();

        assert_eq!(tokens.len(), 7);
        assert_eq!(tokens[4].kind, TokenKind::Ident("z".into()));
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "// trailing");
        assert_eq!(comments[0].location, SourceLocation::new(1, 8));
        assert_eq!(comments[1].text, "/* block\ncomment */");
        assert_eq!(comments[1].location.line, 2);
    }

    #[test]
    fn test_literals_keep_spelling() {
        let tokens = kinds(r#"0x1fUL 1.5e-3 .5f 'a' '\n' "hello\n" L"w""#);

        assert_eq!(
            tokens,
            vec![
                TokenKind::Number("0x1fUL".into()),
                TokenKind::Number("1.5e-3".into()),
                TokenKind::Number(".5f".into()),
                TokenKind::CharLiteral("'a'".into()),
                TokenKind::CharLiteral(r"'\n'".into()),
                TokenKind::StringLiteral(r#""hello\n""#.into()),
                TokenKind::StringLiteral(r#"L"w""#.into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hex_exponent_sign_is_an_operator() {
        let tokens = kinds("0x1e+2");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Number("0x1e".into()),
                TokenKind::Plus,
                TokenKind::Number("2".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_preprocessor_skip() {
        let tokens = kinds("#include <stdio.h>\n#define X \\\n  1\nint x;");

        assert_eq!(tokens[0], TokenKind::Int);
        assert_eq!(tokens[1], TokenKind::Ident("x".into()));
    }

    #[test]
    fn test_token_locations() {
        let mut lexer = Lexer::new("int\n  foo;");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[1].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[1].end, SourceLocation::new(2, 6));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.to_string().contains("Unterminated string literal"));
    }
}
