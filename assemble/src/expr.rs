//! Integer expression evaluation for operands and directives.
//!
//! Grammar (usual precedence, left associative):
//!
//!   expr    := term (('+' | '-') term)*
//!   term    := unary (('*' | '/' | '%') unary)*
//!   unary   := ('-' | '+') unary | primary
//!   primary := number | '(' expr ')'
//!   number  := 0x<hex> | 0b<binary> | <decimal>
//!
//! Division and modulo truncate toward zero. Division by zero and
//! overflow of a 64 bit intermediate are errors rather than values.

use crate::AsmError;

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    // Returns the next non whitespace byte without consuming it.
    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn expr(&mut self) -> Option<i64> {
        let mut val = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            val = match op {
                b'+' => val.checked_add(rhs)?,
                _ => val.checked_sub(rhs)?,
            };
        }
        Some(val)
    }

    fn term(&mut self) -> Option<i64> {
        let mut val = self.unary()?;
        while let Some(op @ (b'*' | b'/' | b'%')) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            val = match op {
                b'*' => val.checked_mul(rhs)?,
                b'/' => val.checked_div(rhs)?,
                _ => val.checked_rem(rhs)?,
            };
        }
        Some(val)
    }

    fn unary(&mut self) -> Option<i64> {
        match self.peek()? {
            b'-' => {
                self.pos += 1;
                self.unary()?.checked_neg()
            }
            b'+' => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<i64> {
        if self.peek()? == b'(' {
            self.pos += 1;
            let val = self.expr()?;
            if self.peek()? != b')' {
                return None;
            }
            self.pos += 1;
            return Some(val);
        }
        self.number()
    }

    fn number(&mut self) -> Option<i64> {
        let rest = &self.src[self.pos..];
        let (radix, skip) = match rest {
            [b'0', b'x' | b'X', ..] => (16, 2),
            [b'0', b'b' | b'B', ..] => (2, 2),
            _ => (10, 0),
        };
        let digits = rest[skip..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric())
            .count();
        if digits == 0 {
            return None;
        }
        // Only ASCII alphanumerics were taken so this is valid utf8.
        let text = std::str::from_utf8(&rest[skip..skip + digits]).ok()?;
        let val = i64::from_str_radix(text, radix).ok()?;
        self.pos += skip + digits;
        Some(val)
    }
}

/// `evaluate` computes the value of `text`.
///
/// # Errors
/// `AsmError::InvalidExpression` carrying the original text if it doesn't
/// parse completely or can't produce an integer.
pub fn evaluate(text: &str) -> Result<i64, AsmError> {
    let mut p = Parser {
        src: text.as_bytes(),
        pos: 0,
    };
    match p.expr() {
        Some(val) if p.peek().is_none() => Ok(val),
        _ => Err(AsmError::InvalidExpression(text.to_string())),
    }
}
