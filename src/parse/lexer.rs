use winnow::combinator::alt;
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_while;

/// Binary and unary operators recognized in slot expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Not,
    And,
    Or,
}

impl Op {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Op::Not => 3,
            Op::And => 2,
            Op::Or => 1,
        }
    }

    /// `NOT` is unary and right-associative; the binary operators are
    /// left-associative.
    pub(crate) fn is_left_associative(self) -> bool {
        !matches!(self, Op::Not)
    }
}

/// One lexical token of a slot expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Op(Op),
    LParen,
    RParen,
    Term(String),
}

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace).void().parse_next(input)
}

fn paren(input: &mut &str) -> ModalResult<Token> {
    alt(('('.value(Token::LParen), ')'.value(Token::RParen))).parse_next(input)
}

/// A word is a maximal run of non-whitespace, non-parenthesis characters.
/// Reserved keywords (matched case-insensitively) become operators;
/// everything else, including arbitrary Unicode, is a term.
fn word(input: &mut &str) -> ModalResult<Token> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '(' && c != ')')
        .map(classify)
        .parse_next(input)
}

fn classify(run: &str) -> Token {
    if run.eq_ignore_ascii_case("AND") {
        Token::Op(Op::And)
    } else if run.eq_ignore_ascii_case("OR") {
        Token::Op(Op::Or)
    } else if run.eq_ignore_ascii_case("NOT") {
        Token::Op(Op::Not)
    } else {
        Token::Term(run.to_owned())
    }
}

fn token(input: &mut &str) -> ModalResult<Token> {
    ws.parse_next(input)?;
    alt((paren, word)).parse_next(input)
}

/// Split an expression string into tokens. Whitespace separates tokens and
/// is discarded; any input tokenizes, so this never fails.
pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    let mut rest = input;
    let mut tokens = Vec::new();
    while let Ok(tok) = token.parse_next(&mut rest) {
        tokens.push(tok);
    }
    tokens
}
