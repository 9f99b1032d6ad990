/// Script Parser
///
/// Recursive descent parser producing the script AST. Statement
/// terminators follow a simplified automatic-semicolon rule: a statement
/// ends at `;`, before `}`, at end of input, or at a line break.

use std::rc::Rc;

use super::error::{ScriptError, ScriptResult};
use super::lexer::tokenize;
use super::types::*;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, depth: 0 }
    }

    /// Parser for a fragment embedded at `depth`, such as a template
    /// substitution.
    fn nested_at(tokens: Vec<Token>, depth: usize) -> Self {
        Self { tokens, pos: 0, depth }
    }

    // ─── Helpers ──────────────────────────────────────────

    fn current(&self) -> &Token {
        // tokenize always ends the stream with Eof
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_type(&self, offset: usize) -> TokenType {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.token_type.clone())
            .unwrap_or(TokenType::Eof)
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.current().token_type == token_type
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ScriptError {
        let token = self.current();
        if token.token_type == TokenType::Eof {
            ScriptError::syntax("Unexpected end of input", token.line, token.column)
        } else {
            ScriptError::syntax(format!("Unexpected token '{}'", token.value), token.line, token.column)
        }
    }

    fn expect(&mut self, token_type: TokenType) -> ScriptResult<Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_ident(&mut self) -> ScriptResult<String> {
        if self.check(TokenType::Ident) {
            Ok(self.advance().value)
        } else {
            Err(self.unexpected())
        }
    }

    fn consume_semicolon(&mut self) -> ScriptResult<()> {
        if self.eat(TokenType::Semicolon) {
            return Ok(());
        }
        let token = self.current();
        if matches!(token.token_type, TokenType::RBrace | TokenType::Eof) || token.newline_before {
            return Ok(());
        }
        Err(self.unexpected())
    }

    fn enter(&mut self) -> ScriptResult<()> {
        self.depth += 1;
        if self.depth > MAX_PARSER_DEPTH {
            let token = self.current();
            return Err(ScriptError::syntax("Maximum nesting depth exceeded", token.line, token.column));
        }
        Ok(())
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ScriptResult<T>) -> ScriptResult<T> {
        self.enter()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Property names after `.` and in object literals may be keywords.
    fn is_property_name(token: &Token) -> bool {
        token.value.chars().next().map_or(false, |c| c.is_alphabetic() || c == '_' || c == '$')
    }

    // ─── Program / Statements ─────────────────────────────

    pub fn parse_program(&mut self) -> ScriptResult<Program> {
        let mut body = Vec::new();
        while !self.check(TokenType::Eof) {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    fn parse_statement(&mut self) -> ScriptResult<Stmt> {
        self.nested(Self::parse_statement_body)
    }

    fn parse_statement_body(&mut self) -> ScriptResult<Stmt> {
        match self.current().token_type {
            TokenType::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenType::Semicolon => {
                self.advance();
                Ok(Stmt::Empty)
            }
            TokenType::Var | TokenType::Let | TokenType::Const => {
                let stmt = self.parse_var_decl()?;
                self.consume_semicolon()?;
                Ok(stmt)
            }
            TokenType::Function => {
                self.advance();
                let def = self.parse_function_rest(true)?;
                Ok(Stmt::FunctionDecl(Rc::new(def)))
            }
            TokenType::If => self.parse_if(),
            TokenType::While => {
                self.advance();
                self.expect(TokenType::LParen)?;
                let test = self.parse_expression()?;
                self.expect(TokenType::RParen)?;
                let body = Box::new(self.parse_statement()?);
                Ok(Stmt::While { test, body })
            }
            TokenType::Do => {
                self.advance();
                let body = Box::new(self.parse_statement()?);
                self.expect(TokenType::While)?;
                self.expect(TokenType::LParen)?;
                let test = self.parse_expression()?;
                self.expect(TokenType::RParen)?;
                self.eat(TokenType::Semicolon);
                Ok(Stmt::DoWhile { body, test })
            }
            TokenType::For => self.parse_for(),
            TokenType::Return => {
                self.advance();
                let token = self.current();
                let bare = token.newline_before
                    || matches!(token.token_type, TokenType::Semicolon | TokenType::RBrace | TokenType::Eof);
                let value = if bare { None } else { Some(self.parse_expression()?) };
                self.consume_semicolon()?;
                Ok(Stmt::Return(value))
            }
            TokenType::Break => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Stmt::Break)
            }
            TokenType::Continue => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Stmt::Continue)
            }
            TokenType::Throw => {
                self.advance();
                if self.current().newline_before {
                    return Err(self.unexpected());
                }
                let value = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Throw(value))
            }
            TokenType::Try => self.parse_try(),
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_block(&mut self) -> ScriptResult<Vec<Stmt>> {
        self.expect(TokenType::LBrace)?;
        let mut body = Vec::new();
        while !self.check(TokenType::RBrace) {
            if self.check(TokenType::Eof) {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn decl_kind(token_type: &TokenType) -> Option<DeclKind> {
        match token_type {
            TokenType::Var => Some(DeclKind::Var),
            TokenType::Let => Some(DeclKind::Let),
            TokenType::Const => Some(DeclKind::Const),
            _ => None,
        }
    }

    fn parse_var_decl(&mut self) -> ScriptResult<Stmt> {
        let kind = Self::decl_kind(&self.advance().token_type).ok_or_else(|| self.unexpected())?;
        let mut declarations = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let init = if self.eat(TokenType::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            if kind == DeclKind::Const && init.is_none() {
                let token = self.current();
                return Err(ScriptError::syntax(
                    "Missing initializer in const declaration",
                    token.line,
                    token.column,
                ));
            }
            declarations.push((name, init));
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        Ok(Stmt::VarDecl { kind, declarations })
    }

    fn parse_if(&mut self) -> ScriptResult<Stmt> {
        self.advance();
        self.expect(TokenType::LParen)?;
        let test = self.parse_expression()?;
        self.expect(TokenType::RParen)?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(TokenType::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If { test, consequent, alternate })
    }

    fn is_of(token: &Token) -> bool {
        token.token_type == TokenType::Ident && token.value == "of"
    }

    fn parse_for(&mut self) -> ScriptResult<Stmt> {
        self.advance();
        self.expect(TokenType::LParen)?;

        // for (let x of ...) / for (x in ...)
        let kind = Self::decl_kind(&self.current().token_type);
        let name_offset = if kind.is_some() { 1 } else { 0 };
        if self.peek_type(name_offset) == TokenType::Ident {
            let after = self.tokens.get(self.pos + name_offset + 1).cloned();
            if let Some(after) = after {
                let is_of = Self::is_of(&after);
                if is_of || after.token_type == TokenType::In {
                    if kind.is_some() {
                        self.advance();
                    }
                    let name = self.expect_ident()?;
                    self.advance();
                    let source = self.parse_expression()?;
                    self.expect(TokenType::RParen)?;
                    let body = Box::new(self.parse_statement()?);
                    return Ok(if is_of {
                        Stmt::ForOf { kind, name, iterable: source, body }
                    } else {
                        Stmt::ForIn { kind, name, object: source, body }
                    });
                }
            }
        }

        let init = if self.check(TokenType::Semicolon) {
            None
        } else if kind.is_some() {
            Some(Box::new(self.parse_var_decl()?))
        } else {
            Some(Box::new(Stmt::Expr(self.parse_expression()?)))
        };
        self.expect(TokenType::Semicolon)?;
        let test = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenType::Semicolon)?;
        let update = if self.check(TokenType::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenType::RParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For { init, test, update, body })
    }

    fn parse_try(&mut self) -> ScriptResult<Stmt> {
        self.advance();
        let block = self.parse_block()?;
        let mut param = None;
        let mut handler = None;
        let mut finalizer = None;
        if self.eat(TokenType::Catch) {
            if self.eat(TokenType::LParen) {
                param = Some(self.expect_ident()?);
                self.expect(TokenType::RParen)?;
            }
            handler = Some(self.parse_block()?);
        }
        if self.eat(TokenType::Finally) {
            finalizer = Some(self.parse_block()?);
        }
        if handler.is_none() && finalizer.is_none() {
            let token = self.current();
            return Err(ScriptError::syntax("Missing catch or finally after try", token.line, token.column));
        }
        Ok(Stmt::Try { block, param, handler, finalizer })
    }

    /// Parse `name(params) { body }` after the `function` keyword.
    fn parse_function_rest(&mut self, require_name: bool) -> ScriptResult<FunctionDef> {
        let name = if self.check(TokenType::Ident) {
            Some(self.advance().value)
        } else if require_name {
            return Err(self.unexpected());
        } else {
            None
        };
        let params = self.parse_params()?;
        let body = FunctionBody::Block(self.parse_block()?);
        Ok(FunctionDef { name, params, body, is_arrow: false })
    }

    fn parse_params(&mut self) -> ScriptResult<Vec<String>> {
        self.expect(TokenType::LParen)?;
        let mut params = Vec::new();
        while !self.check(TokenType::RParen) {
            params.push(self.expect_ident()?);
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RParen)?;
        Ok(params)
    }

    // ─── Expressions ──────────────────────────────────────

    pub fn parse_expression(&mut self) -> ScriptResult<Expr> {
        self.parse_assignment()
    }

    /// `(a, b) =>` lookahead: only identifiers and commas before `)`, then `=>`.
    fn at_arrow_params(&self) -> bool {
        let mut i = self.pos + 1;
        while let Some(token) = self.tokens.get(i) {
            match token.token_type {
                TokenType::Ident | TokenType::Comma => i += 1,
                TokenType::RParen => {
                    return self.tokens.get(i + 1).map_or(false, |t| t.token_type == TokenType::Arrow);
                }
                _ => return false,
            }
        }
        false
    }

    fn parse_arrow_body(&mut self, params: Vec<String>) -> ScriptResult<Expr> {
        self.expect(TokenType::Arrow)?;
        let body = if self.check(TokenType::LBrace) {
            FunctionBody::Block(self.parse_block()?)
        } else {
            FunctionBody::Expr(self.parse_assignment()?)
        };
        Ok(Expr::Function(Rc::new(FunctionDef { name: None, params, body, is_arrow: true })))
    }

    fn assign_op(token_type: &TokenType) -> Option<AssignOp> {
        match token_type {
            TokenType::Assign => Some(AssignOp::Assign),
            TokenType::PlusAssign => Some(AssignOp::Compound(BinaryOp::Add)),
            TokenType::MinusAssign => Some(AssignOp::Compound(BinaryOp::Sub)),
            TokenType::StarAssign => Some(AssignOp::Compound(BinaryOp::Mul)),
            TokenType::SlashAssign => Some(AssignOp::Compound(BinaryOp::Div)),
            TokenType::PercentAssign => Some(AssignOp::Compound(BinaryOp::Mod)),
            _ => None,
        }
    }

    fn is_assignable(expr: &Expr) -> bool {
        matches!(expr, Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. })
    }

    fn parse_assignment(&mut self) -> ScriptResult<Expr> {
        self.nested(Self::parse_assignment_body)
    }

    fn parse_assignment_body(&mut self) -> ScriptResult<Expr> {
        if self.check(TokenType::Ident) && self.peek_type(1) == TokenType::Arrow {
            let param = self.advance().value;
            return self.parse_arrow_body(vec![param]);
        }
        if self.check(TokenType::LParen) && self.at_arrow_params() {
            let params = self.parse_params()?;
            return self.parse_arrow_body(params);
        }

        let left = self.parse_conditional()?;
        if let Some(op) = Self::assign_op(&self.current().token_type) {
            if !Self::is_assignable(&left) {
                let token = self.current();
                return Err(ScriptError::syntax("Invalid left-hand side in assignment", token.line, token.column));
            }
            self.advance();
            let value = self.parse_assignment()?;
            return Ok(Expr::Assign { op, target: Box::new(left), value: Box::new(value) });
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> ScriptResult<Expr> {
        let test = self.parse_or()?;
        if !self.eat(TokenType::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(TokenType::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_or(&mut self) -> ScriptResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_and()?;
        loop {
            let op = match self.current().token_type {
                TokenType::Or => LogicalOp::Or,
                TokenType::Nullish => LogicalOp::Nullish,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_and()?;
            left = Expr::Logical { op, left: Box::new(left), right: Box::new(right) };
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_and(&mut self) -> ScriptResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_equality()?;
        while self.eat(TokenType::And) {
            self.enter()?;
            let right = self.parse_equality()?;
            left = Expr::Logical { op: LogicalOp::And, left: Box::new(left), right: Box::new(right) };
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_binary_level(
        &mut self,
        ops: &[(TokenType, BinaryOp)],
        next: fn(&mut Self) -> ScriptResult<Expr>,
    ) -> ScriptResult<Expr> {
        // each operator nests the tree built so far one level deeper
        let base = self.depth;
        let mut left = next(self)?;
        loop {
            let current = self.current().token_type.clone();
            let Some((_, op)) = ops.iter().find(|(t, _)| *t == current) else {
                break;
            };
            let op = *op;
            self.advance();
            self.enter()?;
            let right = next(self)?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_equality(&mut self) -> ScriptResult<Expr> {
        self.parse_binary_level(
            &[
                (TokenType::Eq, BinaryOp::Eq),
                (TokenType::StrictEq, BinaryOp::StrictEq),
                (TokenType::Ne, BinaryOp::Ne),
                (TokenType::StrictNe, BinaryOp::StrictNe),
            ],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> ScriptResult<Expr> {
        self.parse_binary_level(
            &[
                (TokenType::Lt, BinaryOp::Lt),
                (TokenType::Gt, BinaryOp::Gt),
                (TokenType::Le, BinaryOp::Le),
                (TokenType::Ge, BinaryOp::Ge),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> ScriptResult<Expr> {
        self.parse_binary_level(
            &[(TokenType::Plus, BinaryOp::Add), (TokenType::Minus, BinaryOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> ScriptResult<Expr> {
        self.parse_binary_level(
            &[
                (TokenType::Star, BinaryOp::Mul),
                (TokenType::Slash, BinaryOp::Div),
                (TokenType::Percent, BinaryOp::Mod),
            ],
            Self::parse_exponent,
        )
    }

    fn parse_exponent(&mut self) -> ScriptResult<Expr> {
        let base = self.parse_unary()?;
        if self.eat(TokenType::StarStar) {
            let exponent = self.nested(Self::parse_exponent)?;
            return Ok(Expr::Binary { op: BinaryOp::Pow, left: Box::new(base), right: Box::new(exponent) });
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> ScriptResult<Expr> {
        self.nested(Self::parse_unary_body)
    }

    fn parse_unary_body(&mut self) -> ScriptResult<Expr> {
        let op = match self.current().token_type {
            TokenType::Not => Some(UnaryOp::Not),
            TokenType::Minus => Some(UnaryOp::Neg),
            TokenType::Plus => Some(UnaryOp::Pos),
            TokenType::Typeof => Some(UnaryOp::Typeof),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary { op, operand: Box::new(operand) });
        }

        if self.check(TokenType::Increment) || self.check(TokenType::Decrement) {
            let increment = self.advance().token_type == TokenType::Increment;
            let target = self.parse_unary()?;
            if !Self::is_assignable(&target) {
                let token = self.current();
                return Err(ScriptError::syntax(
                    "Invalid left-hand side expression in prefix operation",
                    token.line,
                    token.column,
                ));
            }
            return Ok(Expr::Update { increment, prefix: true, target: Box::new(target) });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ScriptResult<Expr> {
        let expr = self.parse_call_member()?;
        let token = self.current();
        let is_update = matches!(token.token_type, TokenType::Increment | TokenType::Decrement);
        if is_update && !token.newline_before {
            if !Self::is_assignable(&expr) {
                return Err(ScriptError::syntax(
                    "Invalid left-hand side expression in postfix operation",
                    token.line,
                    token.column,
                ));
            }
            let increment = self.advance().token_type == TokenType::Increment;
            return Ok(Expr::Update { increment, prefix: false, target: Box::new(expr) });
        }
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> ScriptResult<Vec<Expr>> {
        self.expect(TokenType::LParen)?;
        let mut args = Vec::new();
        while !self.check(TokenType::RParen) {
            args.push(self.parse_assignment()?);
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RParen)?;
        Ok(args)
    }

    fn parse_member_suffix(&mut self, object: Expr, allow_call: bool) -> ScriptResult<Expr> {
        let base = self.depth;
        let mut expr = object;
        loop {
            if matches!(self.current().token_type, TokenType::Dot | TokenType::LBracket | TokenType::LParen) {
                self.enter()?;
            }
            match self.current().token_type {
                TokenType::Dot => {
                    self.advance();
                    let token = self.current().clone();
                    if !Self::is_property_name(&token) {
                        return Err(self.unexpected());
                    }
                    self.advance();
                    expr = Expr::Member { object: Box::new(expr), property: token.value };
                }
                TokenType::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenType::RBracket)?;
                    expr = Expr::Index { object: Box::new(expr), index: Box::new(index) };
                }
                TokenType::LParen if allow_call => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call { callee: Box::new(expr), args };
                }
                _ => break,
            }
        }
        self.depth = base;
        Ok(expr)
    }

    fn parse_call_member(&mut self) -> ScriptResult<Expr> {
        let base = if self.eat(TokenType::New) {
            let primary = self.parse_primary()?;
            let callee = self.parse_member_suffix(primary, false)?;
            let args = if self.check(TokenType::LParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            Expr::New { callee: Box::new(callee), args }
        } else {
            self.parse_primary()?
        };
        self.parse_member_suffix(base, true)
    }

    fn parse_primary(&mut self) -> ScriptResult<Expr> {
        let token = self.current().clone();
        match token.token_type {
            TokenType::Number => {
                self.advance();
                let n = token
                    .value
                    .parse::<f64>()
                    .map_err(|_| ScriptError::syntax("Invalid number", token.line, token.column))?;
                Ok(Expr::Number(n))
            }
            TokenType::String => {
                self.advance();
                Ok(Expr::Str(token.value))
            }
            TokenType::Template => {
                self.advance();
                parse_template(&token, self.depth)
            }
            TokenType::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenType::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenType::Null => {
                self.advance();
                Ok(Expr::Null)
            }
            TokenType::Ident => {
                self.advance();
                if token.value == "undefined" {
                    Ok(Expr::Undefined)
                } else {
                    Ok(Expr::Ident(token.value))
                }
            }
            TokenType::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenType::RParen)?;
                Ok(expr)
            }
            TokenType::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(TokenType::RBracket) {
                    items.push(self.parse_assignment()?);
                    if !self.eat(TokenType::Comma) {
                        break;
                    }
                }
                self.expect(TokenType::RBracket)?;
                Ok(Expr::Array(items))
            }
            TokenType::LBrace => self.parse_object_literal(),
            TokenType::Function => {
                self.advance();
                let def = self.parse_function_rest(false)?;
                Ok(Expr::Function(Rc::new(def)))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_object_literal(&mut self) -> ScriptResult<Expr> {
        self.expect(TokenType::LBrace)?;
        let mut props = Vec::new();
        while !self.check(TokenType::RBrace) {
            let token = self.current().clone();
            let key = match token.token_type {
                TokenType::String => token.value.clone(),
                TokenType::Number => {
                    let n = token.value.parse::<f64>().unwrap_or(f64::NAN);
                    super::value::format_number(n)
                }
                _ if Self::is_property_name(&token) => token.value.clone(),
                _ => return Err(self.unexpected()),
            };
            self.advance();

            let value = if self.eat(TokenType::Colon) {
                self.parse_assignment()?
            } else if self.check(TokenType::LParen) {
                let params = self.parse_params()?;
                let body = FunctionBody::Block(self.parse_block()?);
                Expr::Function(Rc::new(FunctionDef { name: Some(key.clone()), params, body, is_arrow: false }))
            } else if token.token_type == TokenType::Ident {
                Expr::Ident(key.clone())
            } else {
                return Err(self.unexpected());
            };
            props.push((key, value));
            if !self.eat(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RBrace)?;
        Ok(Expr::Object(props))
    }
}

// ─── Template literals ────────────────────────────────────

fn template_escape(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\n' => None,
        other => Some(other),
    }
}

/// Split raw template text into literal runs and `${...}` expressions.
fn parse_template(token: &Token, depth: usize) -> ScriptResult<Expr> {
    let chars: Vec<char> = token.value.chars().collect();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' && i + 1 < chars.len() {
            if let Some(c) = template_escape(chars[i + 1]) {
                literal.push(c);
            }
            i += 2;
            continue;
        }
        if ch == '$' && chars.get(i + 1) == Some(&'{') {
            let start = i + 2;
            let mut depth = 1usize;
            let mut end = start;
            while end < chars.len() {
                match chars[end] {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                end += 1;
            }
            if depth != 0 {
                return Err(ScriptError::syntax("Unterminated template literal", token.line, token.column));
            }
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            let source: String = chars[start..end].iter().collect();
            let mut parser = Parser::nested_at(tokenize(&source)?, depth);
            let expr = parser.parse_expression()?;
            if !parser.check(TokenType::Eof) {
                return Err(parser.unexpected());
            }
            parts.push(TemplatePart::Expr(expr));
            i = end + 1;
            continue;
        }
        literal.push(ch);
        i += 1;
    }
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }
    Ok(Expr::Template(parts))
}

/// Tokenize and parse a whole script.
pub fn parse(source: &str) -> ScriptResult<Program> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(src: &str) -> Expr {
        match parse(src).unwrap().body.remove(0) {
            Stmt::Expr(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        match parse_expr("1 + 2 * 3") {
            Expr::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_exponent_is_right_associative() {
        match parse_expr("2 ** 3 ** 2") {
            Expr::Binary { op: BinaryOp::Pow, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Pow, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_arrow_functions() {
        assert!(matches!(parse_expr("x => x * 2"), Expr::Function(def) if def.is_arrow && def.params == ["x"]));
        assert!(matches!(parse_expr("(a, b) => { return a; }"), Expr::Function(def) if def.params.len() == 2));
        assert!(matches!(parse_expr("(1 + 2)"), Expr::Binary { .. }));
    }

    #[test]
    fn test_statements_without_semicolons() {
        let program = parse("let a = 1\nlet b = 2\nconsole.log(a + b)").unwrap();
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_missing_separator_is_error() {
        assert!(parse("let a = 1 let b = 2").is_err());
    }

    #[test]
    fn test_return_followed_by_newline() {
        let program = parse("function f() { return\n42 }").unwrap();
        match &program.body[0] {
            Stmt::FunctionDecl(def) => match &def.body {
                FunctionBody::Block(body) => assert!(matches!(body[0], Stmt::Return(None))),
                _ => panic!("expected block body"),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_for_variants() {
        let program = parse("for (let i = 0; i < 3; i++) {}\nfor (const x of xs) {}\nfor (k in obj) {}").unwrap();
        assert!(matches!(program.body[0], Stmt::For { .. }));
        assert!(matches!(program.body[1], Stmt::ForOf { kind: Some(DeclKind::Const), .. }));
        assert!(matches!(program.body[2], Stmt::ForIn { kind: None, .. }));
    }

    #[test]
    fn test_object_literal_forms() {
        match parse_expr("({ a: 1, 'b c': 2, d, m() { return 1 } })") {
            Expr::Object(props) => {
                let keys: Vec<&str> = props.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["a", "b c", "d", "m"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_template_parts() {
        match parse_expr("`a ${1 + 2} b\\n`") {
            Expr::Template(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(&parts[0], TemplatePart::Literal(s) if s == "a "));
                assert!(matches!(&parts[1], TemplatePart::Expr(Expr::Binary { .. })));
                assert!(matches!(&parts[2], TemplatePart::Literal(s) if s == " b\n"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(parse("1 = 2").is_err());
        assert!(parse("f()++").is_err());
    }

    #[test]
    fn test_try_requires_handler() {
        assert!(parse("try { x() }").is_err());
        assert!(parse("try { x() } catch (e) { }").is_ok());
        assert!(parse("try { x() } finally { }").is_ok());
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let deep = |open: &str, close: &str, n: usize| format!("{}1{}", open.repeat(n), close.repeat(n));
        for src in [
            deep("(", ")", 200_000),
            deep("[", "]", 200_000),
            deep("!", "", 200_000),
            deep("2 ** ", "", 200_000),
            deep("1 + ", "", 200_000),
            format!("a{}", ".b".repeat(200_000)),
            deep("if (x) ", "", 200_000),
        ] {
            match parse(&src) {
                Err(ScriptError::Syntax { message, .. }) => assert_eq!(message, "Maximum nesting depth exceeded"),
                other => panic!("expected depth error, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        assert!(parse(&format!("{}1{}", "(".repeat(100), ")".repeat(100))).is_ok());
        assert!(parse(&vec!["1"; 200].join(" + ")).is_ok());
        assert!(parse("`${`${`${1}`}`}`").is_ok());
    }

    #[test]
    fn test_syntax_error_position() {
        match parse("let x = ;") {
            Err(ScriptError::Syntax { line, column, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
