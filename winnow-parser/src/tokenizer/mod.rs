pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};
use winnow_error::{ErrKind, Error};

/// The fixed dictionary of native function names. A completed word token matching one of these
/// is promoted to [`TokenKind::NativeFn`] before the generic `Name` kind is kept.
pub const NATIVE_FUNCTIONS: &[&str] = &[
    "abs", "acos", "asin", "atan", "avg", "ceil", "cos", "cosh", "derive", "exp", "floor", "gcd",
    "ln", "log", "max", "min", "simplify", "sin", "sinh", "sqrt", "subexs", "tan", "tanh",
];

/// The fixed dictionary of numeric-constant names.
pub const CONSTANTS: &[&str] = &["e", "inf", "nan", "phi", "pi", "tau"];

/// Returns an iterator over the raw token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Scans the entire source into an owned token stream, applying the streaming rules:
///
/// - whitespace and comment tokens are removed,
/// - a trailing comma directly before a closing delimiter is elided,
/// - `Name` tokens found in the native-function or constant dictionaries are promoted,
/// - every numeric literal is validated (separator groups, overflow, radix digits).
///
/// The first lexical error aborts the whole stream; scanning never continues past an error.
pub fn tokenize_complete(input: &str) -> Result<Vec<Token>, Error> {
    let mut lexer = tokenize(input);
    let mut tokens: Vec<Token> = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let line = input[..span.start].matches('\n').count() + 1;
        let lexeme = lexer.slice();

        let kind = result.map_err(|()| {
            Error::new(
                span.clone(),
                line,
                ErrKind::Lexical,
                format!("unrecognized character '{}'", lexeme),
            )
        })?;

        if kind.is_trivia() {
            continue;
        }

        let token = Token {
            span: span.clone(),
            line,
            kind: promote_name(kind, lexeme),
            lexeme: lexeme.to_string(),
        };
        validate(&token)?;

        // trailing comma elision: a comma directly before a closing delimiter is dropped
        if token.kind.is_right_delimiter()
            && tokens.last().map(|prev| prev.kind) == Some(TokenKind::Comma)
        {
            tokens.pop();
        }

        tokens.push(token);
    }

    Ok(tokens)
}

/// Promotes a completed word token via the native-function and constant dictionaries.
fn promote_name(kind: TokenKind, lexeme: &str) -> TokenKind {
    if kind != TokenKind::Name {
        return kind;
    }
    if NATIVE_FUNCTIONS.contains(&lexeme) {
        TokenKind::NativeFn
    } else if CONSTANTS.contains(&lexeme) {
        TokenKind::NumConst
    } else {
        TokenKind::Name
    }
}

/// Checks a scanned token for lexical validity. The parser relies on these checks and parses
/// validated literal lexemes without re-checking them.
fn validate(token: &Token) -> Result<(), Error> {
    let err = |message: String| Error::new(token.span.clone(), token.line, ErrKind::Lexical, message);

    match token.kind {
        TokenKind::Int => {
            check_separators(token)?;
            let digits = strip_separators(&token.lexeme);
            digits.parse::<i64>().map_err(|_| {
                err(format!(
                    "the integer '{}' exceeds the safe integer bound; use a bignumber ('#{}') or scientific notation",
                    token.lexeme, digits,
                ))
            })?;
        }
        TokenKind::Frac => {
            check_separators(token)?;
            let digits = strip_separators(&token.lexeme);
            for part in digits.split('|') {
                part.parse::<i64>().map_err(|_| {
                    err(format!("the fraction '{}' has a component exceeding the safe integer bound", token.lexeme))
                })?;
            }
        }
        TokenKind::Sci => {
            check_separators(token)?;
            let digits = strip_separators(&token.lexeme);
            let (_, exponent) = digits.split_once('E').ok_or_else(|| {
                err(format!("malformed scientific literal '{}'", token.lexeme))
            })?;
            exponent.parse::<i64>().map_err(|_| {
                err(format!("the exponent of '{}' exceeds the safe integer bound", token.lexeme))
            })?;
        }
        TokenKind::Float | TokenKind::BigNum => check_separators(token)?,
        TokenKind::BinInt => validate_radix(token, 2, "binary")?,
        TokenKind::OctInt => validate_radix(token, 8, "octal")?,
        TokenKind::HexInt => validate_radix(token, 16, "hexadecimal")?,
        TokenKind::Pipe => {
            return Err(err("expected an integer numerator before '|'".to_string()));
        }
        TokenKind::UnterminatedStr => {
            return Err(err("unterminated string; expected a closing '\"'".to_string()));
        }
        TokenKind::UnterminatedAlgebraStr => {
            return Err(err("unterminated algebra string; expected a closing \"'\"".to_string()));
        }
        TokenKind::UnterminatedBlockComment => {
            return Err(err("unterminated block comment; expected a closing '==='".to_string()));
        }
        _ => {}
    }

    Ok(())
}

/// Validates a radix-prefixed integer literal: at least one digit, every digit valid for the
/// radix, and the value within the safe integer bound.
fn validate_radix(token: &Token, radix: u32, radix_name: &str) -> Result<(), Error> {
    let err = |message: String| Error::new(token.span.clone(), token.line, ErrKind::Lexical, message);
    let digits = strip_separators(&token.lexeme[2..]);

    if digits.is_empty() {
        return Err(err(format!("expected at least one {} digit after '{}'", radix_name, &token.lexeme[..2])));
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
        return Err(err(format!("'{}' is not a valid {} digit", bad, radix_name)));
    }
    i64::from_str_radix(&digits, radix).map_err(|_| {
        err(format!("the integer '{}' exceeds the safe integer bound", token.lexeme))
    })?;

    Ok(())
}

/// Checks that `_` digit separators split the literal into groups of exactly 3 digits.
fn check_separators(token: &Token) -> Result<(), Error> {
    if !token.lexeme.contains('_') {
        return Ok(());
    }

    // only the integer part of a literal may carry separators; everything after a '.', 'E', or
    // '|' begins a new grouping run
    for run in token.lexeme.split(|c| c == '.' || c == 'E' || c == '|' || c == '#') {
        if run.is_empty() || !run.contains('_') {
            continue;
        }
        let mut groups = run.split('_');
        let head = groups.next().unwrap_or_default();
        let head_ok = !head.is_empty() && head.len() <= 3;
        let tail_ok = groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));
        if !head_ok || !tail_ok {
            return Err(Error::new(
                token.span.clone(),
                token.line,
                ErrKind::Lexical,
                format!("digit separators in '{}' must separate groups of exactly 3 digits", token.lexeme),
            ));
        }
    }

    Ok(())
}

/// Removes digit-group separators from a validated literal lexeme.
pub fn strip_separators(lexeme: &str) -> String {
    lexeme.chars().filter(|&c| c != '_').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compares the streamed tokens to the expected kinds and lexemes.
    fn compare_tokens<const N: usize>(input: &str, expected: [(TokenKind, &str); N]) {
        let tokens = tokenize_complete(input).unwrap();
        let actual = tokens
            .iter()
            .map(|token| (token.kind, token.lexeme.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Add, "+"),
                (TokenKind::Int, "2"),
            ],
        );
    }

    #[test]
    fn numeric_literal_classes() {
        compare_tokens(
            "3|4 2E5 #912 0xFF 0o17 0b101 3.25",
            [
                (TokenKind::Frac, "3|4"),
                (TokenKind::Sci, "2E5"),
                (TokenKind::BigNum, "#912"),
                (TokenKind::HexInt, "0xFF"),
                (TokenKind::OctInt, "0o17"),
                (TokenKind::BinInt, "0b101"),
                (TokenKind::Float, "3.25"),
            ],
        );
    }

    #[test]
    fn native_and_constant_promotion() {
        compare_tokens(
            "sin(pi) + area",
            [
                (TokenKind::NativeFn, "sin"),
                (TokenKind::OpenParen, "("),
                (TokenKind::NumConst, "pi"),
                (TokenKind::CloseParen, ")"),
                (TokenKind::Add, "+"),
                (TokenKind::Name, "area"),
            ],
        );
    }

    #[test]
    fn trailing_comma_elision() {
        let with_comma = tokenize_complete("f(1,2,)").unwrap();
        let without = tokenize_complete("f(1,2)").unwrap();
        let kinds = |tokens: &[Token]| tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
        assert_eq!(kinds(&with_comma), kinds(&without));
    }

    #[test]
    fn comments_are_removed() {
        compare_tokens(
            "1 --- ignore me\n=== a\nblock ===+ 2",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Add, "+"),
                (TokenKind::Int, "2"),
            ],
        );
    }

    #[test]
    fn line_numbers() {
        let tokens = tokenize_complete("1\n2\n\n3").unwrap();
        let lines = tokens.iter().map(|t| t.line).collect::<Vec<_>>();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn separator_groups_must_be_three_digits() {
        assert!(tokenize_complete("1_000_000").is_ok());
        let err = tokenize_complete("1_00").unwrap_err();
        assert_eq!(err.kind, winnow_error::ErrKind::Lexical);
    }

    #[test]
    fn integer_overflow_is_lexical() {
        let err = tokenize_complete("99999999999999999999").unwrap_err();
        assert_eq!(err.kind, winnow_error::ErrKind::Lexical);
        assert!(err.message.contains("bignumber"));
    }

    #[test]
    fn radix_literals_require_digits() {
        assert!(tokenize_complete("0x").is_err());
        assert!(tokenize_complete("0b12").is_err());
        assert!(tokenize_complete("0o8").is_err());
    }

    #[test]
    fn greek_and_math_symbol_names() {
        compare_tokens(
            "φ + ∂x",
            [
                (TokenKind::Name, "φ"),
                (TokenKind::Add, "+"),
                (TokenKind::Name, "∂x"),
            ],
        );
    }

    #[test]
    fn stray_pipe_is_lexical_error() {
        let err = tokenize_complete("x|2").unwrap_err();
        assert!(err.message.contains("numerator"));
    }
}
