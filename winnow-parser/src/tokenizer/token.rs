use logos::Logos;
use std::ops::Range;

/// The different kinds of tokens that can be produced by the tokenizer.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    #[regex(r"[\n\r]+")]
    NewLine,

    #[regex(r"[ \t]+")]
    Whitespace,

    /// A line comment, running from `---` to the end of the line.
    #[regex(r"---[^\n]*")]
    LineComment,

    /// A block comment, `=== ... ===`. The closing delimiter is required; an unterminated block
    /// comment is reported as a lexical error by the streaming pass.
    #[regex(r"===([^=]|=[^=]|==[^=])*===")]
    BlockComment,

    /// The opening of a block comment with no closing `===` anywhere after it.
    #[token("===")]
    UnterminatedBlockComment,

    #[token("==")]
    Eq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LessEq,

    #[token(">=")]
    GreaterEq,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("++")]
    PlusPlus,

    #[token("--")]
    MinusMinus,

    #[token("**")]
    StarStar,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    Mul,

    #[token("/")]
    Div,

    #[token("%")]
    Mod,

    #[token("^")]
    Caret,

    #[token("!")]
    Bang,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("=")]
    Assign,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(".")]
    Dot,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token("and")]
    And,

    #[token("or")]
    Or,

    #[token("not")]
    Not,

    #[token("var")]
    Var,

    #[token("let")]
    Let,

    #[token("fn")]
    Fn,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("while")]
    While,

    #[token("for")]
    For,

    #[token("class")]
    Class,

    #[token("print")]
    Print,

    #[token("return")]
    Return,

    #[token("this")]
    This,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("nil")]
    Nil,

    /// A binary integer literal, `0b...`. The digits are validated by the streaming pass so an
    /// invalid digit can be reported as a lexical error instead of splitting the token.
    #[regex(r"0b[0-9a-zA-Z_]*")]
    BinInt,

    /// An octal integer literal, `0o...`.
    #[regex(r"0o[0-9a-zA-Z_]*")]
    OctInt,

    /// A hexadecimal integer literal, `0x...`.
    #[regex(r"0x[0-9a-zA-Z_]*")]
    HexInt,

    /// A bignumber literal, `#n`, scanned into an arbitrary-precision integer downstream.
    #[regex(r"#[0-9][0-9_]*")]
    BigNum,

    /// An exact fraction literal, `n|d`.
    #[regex(r"[0-9][0-9_]*\|[0-9][0-9_]*")]
    Frac,

    /// A scientific-notation literal, `mEn`, with an optional sign on the exponent.
    #[regex(r"[0-9][0-9_]*(\.[0-9]+)?E[+-]?[0-9]+")]
    Sci,

    #[regex(r"[0-9][0-9_]*\.[0-9]+")]
    Float,

    #[regex(r"[0-9][0-9_]*")]
    Int,

    /// A double-quoted string literal.
    #[regex(r#""[^"\n]*""#)]
    Str,

    /// A lone `"` with no closing quote on the same line.
    #[token("\"")]
    UnterminatedStr,

    /// A single-quoted algebra-string literal, parsed by the algebra expression parser.
    #[regex(r"'[^'\n]*'")]
    AlgebraStr,

    /// A lone `'` with no closing quote on the same line.
    #[token("'")]
    UnterminatedAlgebraStr,

    /// An identifier: Latin or Greek letters, `_`, `$`, or a character from the Unicode
    /// math-symbol block, with digits allowed after the first character.
    #[regex(r"[a-zA-Z_$\u{0370}-\u{03ff}\u{2200}-\u{22ff}][a-zA-Z0-9_$\u{0370}-\u{03ff}\u{2200}-\u{22ff}]*")]
    Name,

    /// A name recognized as a native function via the fixed dictionary. Never produced by the
    /// raw lexer; [`Name`](TokenKind::Name) tokens are promoted during streaming.
    NativeFn,

    /// A name recognized as a numeric constant via the fixed dictionary. Never produced by the
    /// raw lexer; [`Name`](TokenKind::Name) tokens are promoted during streaming.
    NumConst,
}

impl TokenKind {
    /// Returns true if the token represents whitespace or a comment, which the streaming pass
    /// removes before the parser sees the stream.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::NewLine
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }

    /// Returns true if the token closes a delimited group, for the purposes of trailing-comma
    /// elision.
    pub fn is_right_delimiter(self) -> bool {
        matches!(self, TokenKind::CloseParen | TokenKind::CloseBracket)
    }
}

/// A token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The region of the source code that this token originated from.
    pub span: Range<usize>,

    /// The 1-based line the token begins on.
    pub line: usize,

    /// The kind of token.
    pub kind: TokenKind,

    /// The raw lexeme that was scanned into this token.
    pub lexeme: String,
}

impl Token {
    /// Returns true if the token represents whitespace or a comment.
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} '{}' [{}..{}] line {}",
            self.kind, self.lexeme, self.span.start, self.span.end, self.line
        )
    }
}
