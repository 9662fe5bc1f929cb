//! Type-string parser — raw C type spellings → [`CType`] trees.
//!
//! Grammar (whitespace-insensitive):
//!
//! ```text
//! type    := base ( '[' INT ']' ( '[' INT ']' )?
//!                 | '(' '*' ')' '(' params ')' )?
//! base    := 'const'? IDENT '*'?
//! params  := ( type ( ',' type )* )?
//! ```
//!
//! Anything outside this grammar (bitfields, `...`, multi-word specifiers,
//! pointer-to-pointer) is a parse error.

use anyhow::{Result, bail};

use crate::model::CType;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Int(usize),
    Star,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            c if c.is_ascii_digit() => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let digits = &input[start..end];
                let value = digits
                    .parse::<usize>()
                    .map_err(|e| anyhow::anyhow!("bad array length '{digits}': {e}"))?;
                tokens.push(Token::Int(value));
            }
            c if c == '_' || c.is_ascii_alphabetic() => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if !(d == '_' || d.is_ascii_alphanumeric()) {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(input[start..end].to_string()));
            }
            other => bail!("unexpected character '{other}' at offset {start}"),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => bail!("expected {expected:?}, found {tok:?}"),
            None => bail!("expected {expected:?}, found end of input"),
        }
    }

    fn parse_type(&mut self) -> Result<CType> {
        let base = self.parse_base()?;
        match self.peek() {
            Some(Token::LBracket) => {
                let mut dims = Vec::new();
                while self.eat(&Token::LBracket) {
                    match self.next() {
                        Some(Token::Int(n)) => dims.push(n),
                        other => bail!("expected array length, found {other:?}"),
                    }
                    self.expect(Token::RBracket)?;
                }
                if dims.len() > 2 {
                    bail!("arrays with {} dimensions are not supported", dims.len());
                }
                Ok(CType::Array {
                    element: Box::new(base),
                    dims,
                })
            }
            Some(Token::LParen) => {
                self.expect(Token::LParen)?;
                self.expect(Token::Star)?;
                self.expect(Token::RParen)?;
                self.expect(Token::LParen)?;
                let params = self.parse_params()?;
                self.expect(Token::RParen)?;
                Ok(CType::FnPtr {
                    return_type: Box::new(base),
                    params,
                })
            }
            _ => Ok(base),
        }
    }

    fn parse_base(&mut self) -> Result<CType> {
        let mut is_const = false;
        let name = loop {
            match self.next() {
                Some(Token::Ident(id)) if id == "const" && !is_const => is_const = true,
                Some(Token::Ident(id)) => break id,
                other => bail!("expected type name, found {other:?}"),
            }
        };
        if let Some(Token::Ident(extra)) = self.peek() {
            bail!("multi-word type '{name} {extra}' is not supported");
        }
        let named = CType::Named { name, is_const };
        if self.eat(&Token::Star) {
            if self.peek() == Some(&Token::Star) {
                bail!("more than one level of pointer");
            }
            return Ok(CType::Ptr {
                pointee: Box::new(named),
            });
        }
        Ok(named)
    }

    fn parse_params(&mut self) -> Result<Vec<CType>> {
        let mut params = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            return Ok(params);
        }
        loop {
            params.push(self.parse_type()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        // `(void)` is an empty parameter list.
        let void_list = matches!(
            params.as_slice(),
            [CType::Named { name, is_const: false }] if name == "void"
        );
        if void_list {
            params.clear();
        }
        Ok(params)
    }
}

/// Parse a complete C type string.
pub fn parse_type(input: &str) -> Result<CType> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
    };
    let ty = parser.parse_type()?;
    if let Some(tok) = parser.peek() {
        bail!("trailing {tok:?} in type '{input}'");
    }
    Ok(ty)
}

/// Split a function declarator (`int (const char *, float)`) into its result
/// type. Parameter types come from the declaration's own param list.
pub fn function_result(declarator: &str) -> Result<CType> {
    let Some(paren) = declarator.find('(') else {
        bail!("function type '{declarator}' has no parameter list");
    };
    parse_type(declarator[..paren].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, is_const: bool) -> CType {
        CType::Named {
            name: name.to_string(),
            is_const,
        }
    }

    #[test]
    fn pointers() {
        assert_eq!(
            parse_type("const char *").unwrap(),
            CType::Ptr {
                pointee: Box::new(named("char", true))
            }
        );
        assert_eq!(
            parse_type("void*").unwrap(),
            CType::Ptr {
                pointee: Box::new(named("void", false))
            }
        );
        assert!(parse_type("const char **").is_err());
    }

    #[test]
    fn arrays() {
        assert_eq!(
            parse_type("float [4]").unwrap(),
            CType::Array {
                element: Box::new(named("float", false)),
                dims: vec![4],
            }
        );
        assert_eq!(
            parse_type("sg_color[4][2]").unwrap(),
            CType::Array {
                element: Box::new(named("sg_color", false)),
                dims: vec![4, 2],
            }
        );
        let CType::Array { element, .. } = parse_type("const void *[8]").unwrap() else {
            panic!("expected array");
        };
        assert!(matches!(*element, CType::Ptr { .. }));
        assert!(parse_type("int [1][2][3]").is_err());
        assert!(parse_type("int []").is_err());
    }

    #[test]
    fn function_pointers() {
        let ty = parse_type("void (*)(const char *, void *)").unwrap();
        let CType::FnPtr { return_type, params } = ty else {
            panic!("expected fn ptr");
        };
        assert_eq!(*return_type, named("void", false));
        assert_eq!(params.len(), 2);

        let CType::FnPtr { params, .. } = parse_type("void (*)(void)").unwrap() else {
            panic!("expected fn ptr");
        };
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_out_of_grammar_spellings() {
        assert!(parse_type("uint32_t : 4").is_err());
        assert!(parse_type("unsigned int").is_err());
        assert!(parse_type("").is_err());
        assert!(parse_type("int (*)(const char *, ...)").is_err());
    }

    #[test]
    fn function_result_type() {
        assert_eq!(
            function_result("const void * (int)").unwrap(),
            CType::Ptr {
                pointee: Box::new(named("void", true))
            }
        );
        assert_eq!(function_result("void (void)").unwrap(), named("void", false));
        assert!(function_result("int").is_err());
    }
}
