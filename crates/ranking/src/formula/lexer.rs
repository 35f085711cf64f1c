use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Bang,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Question,
    Colon,
    LParen,
    RParen,
    Comma,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the formula text.
    pub offset: usize,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Str(s) => format!("string \"{s}\""),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::End => "end of formula".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            _ => "",
        }
    }
}

/// Split formula text into tokens. The result always ends with `End`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, ch) = chars[i];
        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        let peek = chars.get(i + 1).map(|&(_, c)| c);
        let (kind, width) = match ch {
            '+' => (TokenKind::Plus, 1),
            '-' => (TokenKind::Minus, 1),
            '*' => (TokenKind::Star, 1),
            '/' => (TokenKind::Slash, 1),
            '%' => (TokenKind::Percent, 1),
            '^' => (TokenKind::Caret, 1),
            '?' => (TokenKind::Question, 1),
            ':' => (TokenKind::Colon, 1),
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            ',' => (TokenKind::Comma, 1),
            '<' if peek == Some('=') => (TokenKind::Le, 2),
            '<' => (TokenKind::Lt, 1),
            '>' if peek == Some('=') => (TokenKind::Ge, 2),
            '>' => (TokenKind::Gt, 1),
            '=' if peek == Some('=') => (TokenKind::EqEq, 2),
            '!' if peek == Some('=') => (TokenKind::NotEq, 2),
            '!' => (TokenKind::Bang, 1),
            '&' if peek == Some('&') => (TokenKind::AndAnd, 2),
            '|' if peek == Some('|') => (TokenKind::OrOr, 2),
            '"' | '\'' => {
                let quote = ch;
                let mut j = i + 1;
                let mut text = String::new();
                loop {
                    match chars.get(j) {
                        Some(&(_, c)) if c == quote => break,
                        Some(&(_, c)) => text.push(c),
                        None => return Err(CompileError::UnterminatedString { offset }),
                    }
                    j += 1;
                }
                (TokenKind::Str(text), j + 1 - i)
            }
            c if c.is_ascii_digit() || (c == '.' && peek.is_some_and(|p| p.is_ascii_digit())) => {
                let width = number_width(&chars[i..]);
                let end = chars.get(i + width).map_or(source.len(), |&(o, _)| o);
                let text = &source[offset..end];
                let value = text.parse::<f64>().map_err(|_| CompileError::InvalidNumber {
                    text: text.to_string(),
                    offset,
                })?;
                (TokenKind::Number(value), width)
            }
            c if c.is_alphabetic() || c == '_' => {
                let width = chars[i..]
                    .iter()
                    .take_while(|&&(_, c)| c.is_alphanumeric() || c == '_')
                    .count();
                let name: String = chars[i..i + width].iter().map(|&(_, c)| c).collect();
                (TokenKind::Ident(name), width)
            }
            other => return Err(CompileError::UnexpectedChar { ch: other, offset }),
        };

        tokens.push(Token { kind, offset });
        i += width;
    }

    tokens.push(Token {
        kind: TokenKind::End,
        offset: source.len(),
    });
    Ok(tokens)
}

/// Length in chars of a decimal literal: digits, optional fraction, optional exponent.
fn number_width(chars: &[(usize, char)]) -> usize {
    let digit_at = |k: usize| chars.get(k).is_some_and(|&(_, c)| c.is_ascii_digit());
    let char_at = |k: usize| chars.get(k).map(|&(_, c)| c);

    let mut k = 0;
    while digit_at(k) {
        k += 1;
    }
    if char_at(k) == Some('.') {
        k += 1;
        while digit_at(k) {
            k += 1;
        }
    }
    if matches!(char_at(k), Some('e') | Some('E')) {
        let mut m = k + 1;
        if matches!(char_at(m), Some('+') | Some('-')) {
            m += 1;
        }
        if digit_at(m) {
            while digit_at(m) {
                m += 1;
            }
            k = m;
        }
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operators_and_idents() {
        assert_eq!(
            kinds("a <= b && !c"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Le,
                TokenKind::Ident("b".into()),
                TokenKind::AndAnd,
                TokenKind::Bang,
                TokenKind::Ident("c".into()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            kinds("1 2.5 .5 1e-6 3E2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(2.5),
                TokenKind::Number(0.5),
                TokenKind::Number(1e-6),
                TokenKind::Number(300.0),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_exponent_without_digits_stays_identifier() {
        // "2e" lexes as the number 2 followed by identifier e.
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number(2.0), TokenKind::Ident("e".into()), TokenKind::End]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#"'vise' "jaw""#),
            vec![
                TokenKind::Str("vise".into()),
                TokenKind::Str("jaw".into()),
                TokenKind::End
            ]
        );
        assert_eq!(
            tokenize("'open"),
            Err(CompileError::UnterminatedString { offset: 0 })
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("ab + 12").unwrap();
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 3);
        assert_eq!(tokens[2].offset, 5);
        assert_eq!(tokens[3].offset, 7);
    }

    #[test]
    fn test_rejects_stray_characters() {
        assert_eq!(
            tokenize("a # b"),
            Err(CompileError::UnexpectedChar { ch: '#', offset: 2 })
        );
        assert!(matches!(
            tokenize("a & b"),
            Err(CompileError::UnexpectedChar { ch: '&', .. })
        ));
    }
}
