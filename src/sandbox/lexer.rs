/// Script Lexer
///
/// Tokenizes script source into a stream of tokens. Template literals are
/// emitted whole (raw text between the backticks) and split by the parser.

use super::error::{ScriptError, ScriptResult};
use super::types::{Token, TokenType};

// ─── Keywords Map ────────────────────────────────────────────

fn lookup_keyword(name: &str) -> Option<TokenType> {
    match name {
        "var" => Some(TokenType::Var),
        "let" => Some(TokenType::Let),
        "const" => Some(TokenType::Const),
        "function" => Some(TokenType::Function),
        "return" => Some(TokenType::Return),
        "if" => Some(TokenType::If),
        "else" => Some(TokenType::Else),
        "while" => Some(TokenType::While),
        "do" => Some(TokenType::Do),
        "for" => Some(TokenType::For),
        "in" => Some(TokenType::In),
        "break" => Some(TokenType::Break),
        "continue" => Some(TokenType::Continue),
        "throw" => Some(TokenType::Throw),
        "try" => Some(TokenType::Try),
        "catch" => Some(TokenType::Catch),
        "finally" => Some(TokenType::Finally),
        "new" => Some(TokenType::New),
        "typeof" => Some(TokenType::Typeof),
        "true" => Some(TokenType::True),
        "false" => Some(TokenType::False),
        "null" => Some(TokenType::Null),
        _ => None,
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

// ─── Lexer Struct ────────────────────────────────────────────

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    saw_newline: bool,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            saw_newline: false,
        }
    }

    // ── Helpers ──────────────────────────────────────────────

    fn peek(&self, offset: usize) -> char {
        self.chars.get(self.pos + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        if self.pos >= self.chars.len() {
            return '\0';
        }
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::syntax(message, self.line, self.column)
    }

    fn make_token(&mut self, token_type: TokenType, value: String, line: usize, column: usize) -> Token {
        let newline_before = self.saw_newline;
        self.saw_newline = false;
        Token { token_type, value, line, column, newline_before }
    }

    // ── Whitespace / Comments ────────────────────────────────

    fn skip_trivia(&mut self) -> ScriptResult<()> {
        while !self.at_end() {
            let ch = self.peek(0);
            if ch == '\n' {
                self.saw_newline = true;
                self.advance();
            } else if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek(1) == '/' {
                while !self.at_end() && self.peek(0) != '\n' {
                    self.advance();
                }
            } else if ch == '/' && self.peek(1) == '*' {
                self.advance();
                self.advance();
                loop {
                    if self.at_end() {
                        return Err(self.error("Unterminated comment"));
                    }
                    if self.peek(0) == '*' && self.peek(1) == '/' {
                        self.advance();
                        self.advance();
                        break;
                    }
                    if self.advance() == '\n' {
                        self.saw_newline = true;
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    // ── Literals ─────────────────────────────────────────────

    fn read_number(&mut self) -> ScriptResult<String> {
        let mut text = String::new();
        if self.peek(0) == '0' && matches!(self.peek(1), 'x' | 'X') {
            self.advance();
            self.advance();
            while self.peek(0).is_ascii_hexdigit() {
                text.push(self.advance());
            }
            let n = i64::from_str_radix(&text, 16).map_err(|_| self.error("Invalid hexadecimal literal"))?;
            return Ok(n.to_string());
        }
        while self.peek(0).is_ascii_digit() || self.peek(0) == '_' {
            let ch = self.advance();
            if ch != '_' {
                text.push(ch);
            }
        }
        if self.peek(0) == '.' && self.peek(1).is_ascii_digit() {
            text.push(self.advance());
            while self.peek(0).is_ascii_digit() {
                text.push(self.advance());
            }
        } else if self.peek(0) == '.' && !is_ident_start(self.peek(1)) {
            // trailing dot: `1.`
            self.advance();
        }
        if matches!(self.peek(0), 'e' | 'E')
            && (self.peek(1).is_ascii_digit()
                || (matches!(self.peek(1), '+' | '-') && self.peek(2).is_ascii_digit()))
        {
            text.push(self.advance());
            if matches!(self.peek(0), '+' | '-') {
                text.push(self.advance());
            }
            while self.peek(0).is_ascii_digit() {
                text.push(self.advance());
            }
        }
        Ok(text)
    }

    fn read_escape(&mut self, value: &mut String) -> ScriptResult<()> {
        let escaped = self.advance();
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\x08'),
            'f' => value.push('\x0C'),
            'v' => value.push('\x0B'),
            '0' => value.push('\0'),
            'x' => {
                let hex: String = (0..2).map(|_| self.advance()).collect();
                let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("Invalid hexadecimal escape"))?;
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            'u' => {
                let hex: String = if self.peek(0) == '{' {
                    self.advance();
                    let mut digits = String::new();
                    while !self.at_end() && self.peek(0) != '}' {
                        digits.push(self.advance());
                    }
                    self.advance();
                    digits
                } else {
                    (0..4).map(|_| self.advance()).collect()
                };
                let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("Invalid Unicode escape"))?;
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            '\n' => {}
            '\0' => return Err(self.error("Invalid or unexpected token")),
            other => value.push(other),
        }
        Ok(())
    }

    fn read_string(&mut self, quote: char) -> ScriptResult<String> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.at_end() || self.peek(0) == '\n' {
                return Err(self.error("Invalid or unexpected token"));
            }
            let ch = self.advance();
            if ch == quote {
                break;
            }
            if ch == '\\' {
                self.read_escape(&mut value)?;
            } else {
                value.push(ch);
            }
        }
        Ok(value)
    }

    /// Raw template text; escapes and `${...}` are left for the parser.
    fn read_template(&mut self) -> ScriptResult<String> {
        self.advance(); // opening backtick
        let mut raw = String::new();
        let mut depth = 0usize;
        loop {
            if self.at_end() {
                return Err(self.error("Unterminated template literal"));
            }
            let ch = self.advance();
            match ch {
                '\\' => {
                    raw.push(ch);
                    raw.push(self.advance());
                }
                '`' if depth == 0 => break,
                '$' if self.peek(0) == '{' => {
                    raw.push(ch);
                    raw.push(self.advance());
                    depth += 1;
                }
                '{' if depth > 0 => {
                    raw.push(ch);
                    depth += 1;
                }
                '}' if depth > 0 => {
                    raw.push(ch);
                    depth -= 1;
                }
                _ => raw.push(ch),
            }
        }
        Ok(raw)
    }

    // ── Operators ────────────────────────────────────────────

    fn read_operator(&mut self) -> ScriptResult<(TokenType, String)> {
        const OPERATORS: &[(&str, TokenType)] = &[
            ("===", TokenType::StrictEq),
            ("!==", TokenType::StrictNe),
            ("**", TokenType::StarStar),
            ("=>", TokenType::Arrow),
            ("==", TokenType::Eq),
            ("!=", TokenType::Ne),
            ("<=", TokenType::Le),
            (">=", TokenType::Ge),
            ("&&", TokenType::And),
            ("||", TokenType::Or),
            ("??", TokenType::Nullish),
            ("++", TokenType::Increment),
            ("--", TokenType::Decrement),
            ("+=", TokenType::PlusAssign),
            ("-=", TokenType::MinusAssign),
            ("*=", TokenType::StarAssign),
            ("/=", TokenType::SlashAssign),
            ("%=", TokenType::PercentAssign),
            ("+", TokenType::Plus),
            ("-", TokenType::Minus),
            ("*", TokenType::Star),
            ("/", TokenType::Slash),
            ("%", TokenType::Percent),
            ("<", TokenType::Lt),
            (">", TokenType::Gt),
            ("!", TokenType::Not),
            ("=", TokenType::Assign),
            ("?", TokenType::Question),
            (":", TokenType::Colon),
            (".", TokenType::Dot),
            (",", TokenType::Comma),
            (";", TokenType::Semicolon),
            ("(", TokenType::LParen),
            (")", TokenType::RParen),
            ("{", TokenType::LBrace),
            ("}", TokenType::RBrace),
            ("[", TokenType::LBracket),
            ("]", TokenType::RBracket),
        ];

        for (text, token_type) in OPERATORS {
            let matches = text.chars().enumerate().all(|(i, c)| self.peek(i) == c);
            if matches {
                for _ in 0..text.chars().count() {
                    self.advance();
                }
                return Ok((token_type.clone(), text.to_string()));
            }
        }
        Err(self.error(format!("Invalid or unexpected token '{}'", self.peek(0))))
    }

    // ── Main Loop ────────────────────────────────────────────

    fn tokenize(&mut self) -> ScriptResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let line = self.line;
            let column = self.column;
            if self.at_end() {
                tokens.push(self.make_token(TokenType::Eof, String::new(), line, column));
                return Ok(tokens);
            }

            let ch = self.peek(0);
            let token = if ch.is_ascii_digit() || (ch == '.' && self.peek(1).is_ascii_digit()) {
                let text = self.read_number()?;
                self.make_token(TokenType::Number, text, line, column)
            } else if ch == '"' || ch == '\'' {
                let text = self.read_string(ch)?;
                self.make_token(TokenType::String, text, line, column)
            } else if ch == '`' {
                let text = self.read_template()?;
                self.make_token(TokenType::Template, text, line, column)
            } else if is_ident_start(ch) {
                let mut name = String::new();
                while is_ident_part(self.peek(0)) {
                    name.push(self.advance());
                }
                let token_type = lookup_keyword(&name).unwrap_or(TokenType::Ident);
                self.make_token(token_type, name, line, column)
            } else {
                let (token_type, text) = self.read_operator()?;
                self.make_token(token_type, text, line, column)
            };
            tokens.push(token);
        }
    }
}

/// Tokenize script source.
pub fn tokenize(input: &str) -> ScriptResult<Vec<Token>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str) -> Vec<TokenType> {
        tokenize(input).unwrap().into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_tokenize_call() {
        assert_eq!(
            types("console.log(\"hi\");"),
            vec![
                TokenType::Ident,
                TokenType::Dot,
                TokenType::Ident,
                TokenType::LParen,
                TokenType::String,
                TokenType::RParen,
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_operator_match() {
        assert_eq!(
            types("a === b !== c => d ** e"),
            vec![
                TokenType::Ident,
                TokenType::StrictEq,
                TokenType::Ident,
                TokenType::StrictNe,
                TokenType::Ident,
                TokenType::Arrow,
                TokenType::Ident,
                TokenType::StarStar,
                TokenType::Ident,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 3.5 0x1F 1e3 .5 1_000").unwrap();
        let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["42", "3.5", "31", "1e3", ".5", "1000", ""]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#"'a\'b' "c\nA\x42""#).unwrap();
        assert_eq!(tokens[0].value, "a'b");
        assert_eq!(tokens[1].value, "c\nAB");
    }

    #[test]
    fn test_comments_and_newlines() {
        let tokens = tokenize("a // comment\n/* block\n */ b").unwrap();
        assert_eq!(tokens[0].value, "a");
        assert!(!tokens[0].newline_before);
        assert_eq!(tokens[1].value, "b");
        assert!(tokens[1].newline_before);
    }

    #[test]
    fn test_template_keeps_raw_text() {
        let tokens = tokenize("`x ${ {a: 1}.a } y`").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Template);
        assert_eq!(tokens[0].value, "x ${ {a: 1}.a } y");
    }

    #[test]
    fn test_errors() {
        assert!(tokenize("'unterminated").is_err());
        assert!(tokenize("a # b").is_err());
        assert!(tokenize("/* open").is_err());
    }
}
