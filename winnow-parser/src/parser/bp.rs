//! The binding-power table driving the Pratt expression loop.
//!
//! Every token kind that can act as an infix or postfix operator maps to a binding power here.
//! The expression loop keeps consuming operators while the next operator's binding power is
//! greater than the minimum it was entered with; right-associative operators recurse with their
//! own power minus one.

use crate::tokenizer::TokenKind;

pub const NONE: u8 = 0;
pub const ASSIGN: u8 = 2;
pub const OR: u8 = 4;
pub const AND: u8 = 6;
pub const EQUALITY: u8 = 8;
pub const COMPARISON: u8 = 10;
pub const CONCAT: u8 = 12;
pub const TERM: u8 = 14;
pub const FACTOR: u8 = 16;

/// Implicit multiplication binds tighter than explicit multiplication, so `2x^2 / 3y` groups
/// as `(2x^2) / (3y)`.
pub const IMUL: u8 = 18;

pub const UNARY: u8 = 20;
pub const POWER: u8 = 22;
pub const POSTFIX: u8 = 24;
pub const CALL: u8 = 26;

/// Returns the binding power of the given token kind when used as an infix or postfix
/// operator, or [`NONE`] if the token cannot continue an expression.
pub fn infix(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Assign => ASSIGN,
        TokenKind::Or => OR,
        TokenKind::And => AND,
        TokenKind::Eq | TokenKind::NotEq => EQUALITY,
        TokenKind::Less | TokenKind::LessEq | TokenKind::Greater | TokenKind::GreaterEq => {
            COMPARISON
        }
        TokenKind::Amp => CONCAT,
        TokenKind::Add | TokenKind::Sub => TERM,
        TokenKind::Mul | TokenKind::Div | TokenKind::Mod => FACTOR,
        TokenKind::Caret => POWER,
        TokenKind::Bang | TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::StarStar => {
            POSTFIX
        }
        TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::Dot => CALL,
        _ => NONE,
    }
}
