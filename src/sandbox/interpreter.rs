/// Script Interpreter
///
/// Tree-walking evaluator for parsed scripts. Owns the global scope, the
/// console buffer and the execution counters; host capabilities are
/// reached through the borrowed `ScriptHost`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::console::ConsoleBuffer;
use super::error::{ScriptError, ScriptResult};
use super::host::ScriptHost;
use super::runner::SandboxLimits;
use super::types::*;
use super::value::{format_number, AssignOutcome, Function, ObjectClass, Scope, ScopeRef, Value};

/// Completion of a statement.
pub(super) enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

pub struct Interpreter<'h> {
    pub(super) global: ScopeRef,
    pub(super) host: &'h mut dyn ScriptHost,
    pub(super) console: ConsoleBuffer,
    pub(super) limits: SandboxLimits,
    loop_iterations: u64,
    call_depth: usize,
    eval_depth: usize,
    /// Scopes captured by closures; cleared on drop to break
    /// scope -> closure -> scope cycles.
    captured: Vec<Weak<RefCell<Scope>>>,
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        let scopes = self.captured.drain(..).filter_map(|weak| weak.upgrade());
        for scope in std::iter::once(self.global.clone()).chain(scopes) {
            if let Ok(mut scope) = scope.try_borrow_mut() {
                scope.clear();
            }
        }
    }
}

impl<'h> Interpreter<'h> {
    pub fn new(host: &'h mut dyn ScriptHost, limits: SandboxLimits) -> Self {
        Self {
            global: Scope::new_ref(None),
            host,
            console: ConsoleBuffer::new(),
            limits,
            loop_iterations: 0,
            call_depth: 0,
            eval_depth: 0,
            captured: Vec::new(),
        }
    }

    pub fn into_console(mut self) -> ConsoleBuffer {
        std::mem::take(&mut self.console)
    }

    pub fn run(&mut self, program: &Program) -> ScriptResult<()> {
        let scope = self.global.clone();
        self.hoist(&program.body, &scope);
        for stmt in &program.body {
            if let Flow::Return(_) = self.exec_stmt(stmt, &scope)? {
                break;
            }
        }
        Ok(())
    }

    // ─── Limits ───────────────────────────────────────────

    /// Count one loop iteration, callback invocation or sort comparison.
    pub(super) fn tick(&mut self) -> ScriptResult<()> {
        self.loop_iterations += 1;
        if self.loop_iterations > self.limits.max_loop_iterations {
            return Err(ScriptError::Limit(format!(
                "Loop iteration limit exceeded ({})",
                self.limits.max_loop_iterations
            )));
        }
        Ok(())
    }

    /// Count one level of statement/expression recursion.
    fn descend(&mut self) -> ScriptResult<()> {
        if self.eval_depth >= self.limits.max_eval_depth {
            return Err(ScriptError::Limit("Maximum call stack size exceeded".to_string()));
        }
        self.eval_depth += 1;
        Ok(())
    }

    /// Reject a string result longer than `max_string_length`.
    pub(super) fn check_string(&self, value: Value) -> ScriptResult<Value> {
        match &value {
            Value::Str(s) if s.len() > self.limits.max_string_length => {
                Err(ScriptError::range_error("Invalid string length"))
            }
            _ => Ok(value),
        }
    }

    // ─── Statements ───────────────────────────────────────

    /// Closure over `scope`.
    fn closure(&mut self, def: &Rc<FunctionDef>, scope: &ScopeRef) -> Value {
        let already = self.captured.last().map_or(false, |last| last.as_ptr() == Rc::as_ptr(scope));
        if !already {
            self.captured.push(Rc::downgrade(scope));
        }
        Value::Function(Rc::new(Function::Closure { def: def.clone(), scope: scope.clone() }))
    }

    fn hoist(&mut self, body: &[Stmt], scope: &ScopeRef) {
        for stmt in body {
            if let Stmt::FunctionDecl(def) = stmt {
                if let Some(name) = &def.name {
                    let closure = self.closure(def, scope);
                    scope.borrow_mut().declare(name, closure, true);
                }
            }
        }
    }

    fn exec_block(&mut self, body: &[Stmt], parent: &ScopeRef) -> ScriptResult<Flow> {
        let scope = Scope::new_ref(Some(parent.clone()));
        self.exec_body(body, &scope)
    }

    fn exec_body(&mut self, body: &[Stmt], scope: &ScopeRef) -> ScriptResult<Flow> {
        self.hoist(body, scope);
        for stmt in body {
            match self.exec_stmt(stmt, scope)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &ScopeRef) -> ScriptResult<Flow> {
        self.descend()?;
        let flow = self.exec_stmt_inner(stmt, scope);
        self.eval_depth -= 1;
        flow
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt, scope: &ScopeRef) -> ScriptResult<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr, scope)?;
                Ok(Flow::Normal)
            }
            Stmt::VarDecl { kind, declarations } => {
                for (name, init) in declarations {
                    let value = match init {
                        Some(expr) => self.eval(expr, scope)?,
                        None => Value::Undefined,
                    };
                    scope.borrow_mut().declare(name, value, *kind != DeclKind::Const);
                }
                Ok(Flow::Normal)
            }
            Stmt::FunctionDecl(_) | Stmt::Empty => Ok(Flow::Normal),
            Stmt::If { test, consequent, alternate } => {
                if self.eval(test, scope)?.is_truthy() {
                    self.exec_stmt(consequent, scope)
                } else if let Some(alternate) = alternate {
                    self.exec_stmt(alternate, scope)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { test, body } => {
                while self.eval(test, scope)?.is_truthy() {
                    self.tick()?;
                    match self.exec_stmt(body, scope)? {
                        Flow::Break => break,
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::DoWhile { body, test } => {
                loop {
                    self.tick()?;
                    match self.exec_stmt(body, scope)? {
                        Flow::Break => break,
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if !self.eval(test, scope)?.is_truthy() {
                        break;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For { init, test, update, body } => {
                let loop_scope = Scope::new_ref(Some(scope.clone()));
                if let Some(init) = init {
                    self.exec_stmt(init, &loop_scope)?;
                }
                loop {
                    if let Some(test) = test {
                        if !self.eval(test, &loop_scope)?.is_truthy() {
                            break;
                        }
                    }
                    self.tick()?;
                    match self.exec_stmt(body, &loop_scope)? {
                        Flow::Break => break,
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if let Some(update) = update {
                        self.eval(update, &loop_scope)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::ForOf { kind, name, iterable, body } => {
                let source = self.eval(iterable, scope)?;
                let items = match &source {
                    Value::Array(items) => items.borrow().clone(),
                    Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
                    other => {
                        return Err(ScriptError::type_error(format!("{} is not iterable", other.to_display())))
                    }
                };
                self.run_each(items, *kind, name, body, scope)
            }
            Stmt::ForIn { kind, name, object, body } => {
                let source = self.eval(object, scope)?;
                let keys = self.own_keys(&source).into_iter().map(Value::Str).collect();
                self.run_each(keys, *kind, name, body, scope)
            }
            Stmt::Block(body) => self.exec_block(body, scope),
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
            Stmt::Throw(expr) => {
                let value = self.eval(expr, scope)?;
                Err(ScriptError::Thrown(value))
            }
            Stmt::Try { block, param, handler, finalizer } => {
                let mut result = self.exec_block(block, scope);
                // limits are not catchable; only thrown values reach the handler
                let thrown = match &result {
                    Err(ScriptError::Thrown(value)) => Some(value.clone()),
                    _ => None,
                };
                if let (Some(thrown), Some(handler)) = (thrown, handler) {
                    let catch_scope = Scope::new_ref(Some(scope.clone()));
                    if let Some(param) = param {
                        catch_scope.borrow_mut().declare(param, thrown, true);
                    }
                    result = self.exec_body(handler, &catch_scope);
                }
                if let Some(finalizer) = finalizer {
                    match self.exec_block(finalizer, scope)? {
                        Flow::Normal => {}
                        other => return Ok(other),
                    }
                }
                result
            }
        }
    }

    /// Shared body of `for...of` and `for...in`.
    fn run_each(
        &mut self,
        items: Vec<Value>,
        kind: Option<DeclKind>,
        name: &str,
        body: &Stmt,
        scope: &ScopeRef,
    ) -> ScriptResult<Flow> {
        for item in items {
            self.tick()?;
            let iteration_scope = Scope::new_ref(Some(scope.clone()));
            match kind {
                Some(kind) => iteration_scope.borrow_mut().declare(name, item, kind != DeclKind::Const),
                None => self.assign_name(name, item, scope)?,
            }
            match self.exec_stmt(body, &iteration_scope)? {
                Flow::Break => break,
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Normal | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal)
    }

    pub(super) fn own_keys(&self, value: &Value) -> Vec<String> {
        match value {
            Value::Object(obj) => obj.borrow().props.keys().cloned().collect(),
            Value::Array(items) => (0..items.borrow().len()).map(|i| i.to_string()).collect(),
            Value::Str(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    // ─── Expressions ──────────────────────────────────────

    pub(super) fn eval(&mut self, expr: &Expr, scope: &ScopeRef) -> ScriptResult<Value> {
        self.descend()?;
        let value = self.eval_inner(expr, scope);
        self.eval_depth -= 1;
        value
    }

    fn eval_inner(&mut self, expr: &Expr, scope: &ScopeRef) -> ScriptResult<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Template(parts) => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Literal(s) => text.push_str(s),
                        TemplatePart::Expr(expr) => text.push_str(&self.eval(expr, scope)?.to_display()),
                    }
                }
                self.check_string(Value::Str(text))
            }
            Expr::Ident(name) => self.lookup(name, scope),
            Expr::Array(items) => {
                let values = items.iter().map(|item| self.eval(item, scope)).collect::<ScriptResult<Vec<_>>>()?;
                Ok(Value::array(values))
            }
            Expr::Object(props) => {
                let mut map = IndexMap::new();
                for (key, value) in props {
                    map.insert(key.clone(), self.eval(value, scope)?);
                }
                Ok(Value::object(map))
            }
            Expr::Function(def) => Ok(self.closure(def, scope)),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand, scope),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                self.check_string(binary_op(*op, &left, &right))
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval(left, scope)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Nullish => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval(right, scope)
                }
            }
            Expr::Conditional { test, consequent, alternate } => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(consequent, scope)
                } else {
                    self.eval(alternate, scope)
                }
            }
            Expr::Assign { op, target, value } => {
                let value = match op {
                    AssignOp::Assign => self.eval(value, scope)?,
                    AssignOp::Compound(bin) => {
                        let current = self.eval(target, scope)?;
                        let rhs = self.eval(value, scope)?;
                        self.check_string(binary_op(*bin, &current, &rhs))?
                    }
                };
                self.assign_to(target, value.clone(), scope)?;
                Ok(value)
            }
            Expr::Update { increment, prefix, target } => {
                let old = self.eval(target, scope)?.to_number();
                let new = if *increment { old + 1.0 } else { old - 1.0 };
                self.assign_to(target, Value::Number(new), scope)?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            Expr::Member { object, property } => {
                let object = self.eval(object, scope)?;
                self.get_property(&object, property)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object, scope)?;
                let key = self.eval(index, scope)?.to_property_key();
                self.get_property(&object, &key)
            }
            Expr::Call { callee, args } => self.eval_call(callee, args, scope),
            Expr::New { callee, args } => {
                let constructor = self.eval(callee, scope)?;
                let args = self.eval_args(args, scope)?;
                self.construct(&constructor, args, callee)
            }
        }
    }

    fn lookup(&self, name: &str, scope: &ScopeRef) -> ScriptResult<Value> {
        if let Some(value) = scope.borrow().lookup(name) {
            return Ok(value);
        }
        if name == "this" {
            return Ok(Value::Undefined);
        }
        Err(ScriptError::reference_error(format!("{} is not defined", name)))
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr, scope: &ScopeRef) -> ScriptResult<Value> {
        if op == UnaryOp::Typeof {
            // typeof tolerates undeclared identifiers
            if let Expr::Ident(name) = operand {
                let value = scope.borrow().lookup(name).unwrap_or(Value::Undefined);
                return Ok(Value::str(value.type_of()));
            }
        }
        let value = self.eval(operand, scope)?;
        Ok(match op {
            UnaryOp::Not => Value::Bool(!value.is_truthy()),
            UnaryOp::Neg => Value::Number(-value.to_number()),
            UnaryOp::Pos => Value::Number(value.to_number()),
            UnaryOp::Typeof => Value::str(value.type_of()),
        })
    }

    fn eval_args(&mut self, args: &[Expr], scope: &ScopeRef) -> ScriptResult<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg, scope)).collect()
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], scope: &ScopeRef) -> ScriptResult<Value> {
        let (this, func) = match callee {
            Expr::Member { object, property } => {
                let object = self.eval(object, scope)?;
                let func = self.get_property(&object, property)?;
                (object, func)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object, scope)?;
                let key = self.eval(index, scope)?.to_property_key();
                let func = self.get_property(&object, &key)?;
                (object, func)
            }
            other => (Value::Undefined, self.eval(other, scope)?),
        };
        if !matches!(func, Value::Function(_)) {
            return Err(ScriptError::type_error(format!("{} is not a function", describe(callee))));
        }
        let args = self.eval_args(args, scope)?;
        self.call_function(&func, this, args)
    }

    fn construct(&mut self, constructor: &Value, args: Vec<Value>, callee: &Expr) -> ScriptResult<Value> {
        let Value::Function(func) = constructor else {
            return Err(ScriptError::type_error(format!("{} is not a constructor", describe(callee))));
        };
        match func.as_ref() {
            Function::Closure { def, .. } if !def.is_arrow => {
                let instance = Value::object(IndexMap::new());
                let result = self.call_function(constructor, instance.clone(), args)?;
                Ok(match result {
                    Value::Object(_) | Value::Array(_) => result,
                    _ => instance,
                })
            }
            Function::Native(_) => self.call_function(constructor, Value::Undefined, args),
            _ => Err(ScriptError::type_error(format!("{} is not a constructor", describe(callee)))),
        }
    }

    /// Invoke any callable value.
    pub(super) fn call_function(&mut self, func: &Value, this: Value, args: Vec<Value>) -> ScriptResult<Value> {
        let Value::Function(func) = func else {
            return Err(ScriptError::type_error(format!("{} is not a function", func.to_display())));
        };
        match func.as_ref() {
            Function::Closure { def, scope } => {
                if self.call_depth >= self.limits.max_call_depth {
                    return Err(ScriptError::Limit("Maximum call stack size exceeded".to_string()));
                }
                self.call_depth += 1;
                let result = self.call_closure(def, scope, this, args);
                self.call_depth -= 1;
                result
            }
            Function::Native(native) => self.call_native(*native, this, args),
            Function::Bound { method, receiver } => self.call_method(*method, receiver.clone(), args),
        }
    }

    fn call_closure(&mut self, def: &FunctionDef, closure_scope: &ScopeRef, this: Value, args: Vec<Value>) -> ScriptResult<Value> {
        let scope = Scope::new_ref(Some(closure_scope.clone()));
        {
            let mut frame = scope.borrow_mut();
            if !def.is_arrow {
                frame.declare("this", this, false);
                frame.declare("arguments", Value::array(args.clone()), true);
            }
            let mut args = args.into_iter();
            for param in &def.params {
                frame.declare(param, args.next().unwrap_or(Value::Undefined), true);
            }
        }
        match &def.body {
            FunctionBody::Expr(expr) => self.eval(expr, &scope),
            FunctionBody::Block(body) => match self.exec_body(body, &scope)? {
                Flow::Return(value) => Ok(value),
                _ => Ok(Value::Undefined),
            },
        }
    }

    // ─── Assignment ───────────────────────────────────────

    fn assign_name(&mut self, name: &str, value: Value, scope: &ScopeRef) -> ScriptResult<()> {
        let outcome = scope.borrow_mut().assign(name, value.clone());
        match outcome {
            AssignOutcome::Assigned => Ok(()),
            AssignOutcome::Constant => Err(ScriptError::type_error("Assignment to constant variable.")),
            AssignOutcome::Undeclared => {
                // sloppy-mode implicit global
                self.global.borrow_mut().declare(name, value, true);
                Ok(())
            }
        }
    }

    fn assign_to(&mut self, target: &Expr, value: Value, scope: &ScopeRef) -> ScriptResult<()> {
        match target {
            Expr::Ident(name) => self.assign_name(name, value, scope),
            Expr::Member { object, property } => {
                let object = self.eval(object, scope)?;
                self.set_property(&object, property, value)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object, scope)?;
                let key = self.eval(index, scope)?.to_property_key();
                self.set_property(&object, &key, value)
            }
            _ => Err(ScriptError::syntax("Invalid left-hand side in assignment", 0, 0)),
        }
    }

    // ─── Property access ──────────────────────────────────

    fn set_property(&self, object: &Value, key: &str, value: Value) -> ScriptResult<()> {
        match object {
            Value::Undefined | Value::Null => Err(ScriptError::type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                object.to_display(),
                key
            ))),
            Value::Object(obj) => {
                obj.borrow_mut().props.insert(key.to_string(), value);
                Ok(())
            }
            Value::Array(items) => {
                let max = self.limits.max_array_length;
                let mut items = items.borrow_mut();
                if let Some(index) = array_index(key) {
                    if index >= items.len() {
                        let len = checked_array_length(index as f64 + 1.0, max)?;
                        items.resize(len, Value::Undefined);
                    }
                    items[index] = value;
                } else if key == "length" {
                    let len = checked_array_length(value.to_number(), max)?;
                    items.resize(len, Value::Undefined);
                }
                Ok(())
            }
            // primitives silently drop property writes
            _ => Ok(()),
        }
    }

    pub(super) fn get_property(&self, object: &Value, key: &str) -> ScriptResult<Value> {
        use super::builtins::Method;

        match object {
            Value::Undefined | Value::Null => Err(ScriptError::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                object.to_display(),
                key
            ))),
            Value::Str(s) => {
                if key == "length" {
                    return Ok(Value::Number(s.chars().count() as f64));
                }
                if let Some(index) = array_index(key) {
                    return Ok(s.chars().nth(index).map(|c| Value::Str(c.to_string())).unwrap_or(Value::Undefined));
                }
                Ok(Method::for_string(key).map(|m| Value::bound(m, object.clone())).unwrap_or(Value::Undefined))
            }
            Value::Array(items) => {
                if key == "length" {
                    return Ok(Value::Number(items.borrow().len() as f64));
                }
                if let Some(index) = array_index(key) {
                    return Ok(items.borrow().get(index).cloned().unwrap_or(Value::Undefined));
                }
                Ok(Method::for_array(key).map(|m| Value::bound(m, object.clone())).unwrap_or(Value::Undefined))
            }
            Value::Number(_) => {
                Ok(Method::for_number(key).map(|m| Value::bound(m, object.clone())).unwrap_or(Value::Undefined))
            }
            Value::Object(obj) => {
                if let Some(value) = obj.borrow().props.get(key) {
                    return Ok(value.clone());
                }
                if obj.borrow().class == ObjectClass::Error && key == "stack" {
                    return Ok(Value::Str(object.to_display()));
                }
                Ok(Method::for_object(key).map(|m| Value::bound(m, object.clone())).unwrap_or(Value::Undefined))
            }
            Value::Function(func) => match (func.as_ref(), key) {
                (Function::Closure { def, .. }, "name") => Ok(Value::str(def.name.clone().unwrap_or_default())),
                (Function::Native(native), "name") => Ok(Value::str(native.name())),
                _ => Ok(Value::Undefined),
            },
            Value::Bool(_) => {
                Ok(Method::for_bool(key).map(|m| Value::bound(m, object.clone())).unwrap_or(Value::Undefined))
            }
        }
    }
}

/// `RangeError: Invalid array length` unless `len` is a valid length no
/// larger than `max`.
fn checked_array_length(len: f64, max: usize) -> ScriptResult<usize> {
    let valid = len >= 0.0 && len.fract() == 0.0 && len <= u32::MAX as f64;
    if !valid || len > max as f64 {
        return Err(ScriptError::range_error("Invalid array length"));
    }
    Ok(len as usize)
}

fn array_index(key: &str) -> Option<usize> {
    key.parse::<usize>().ok().filter(|i| i.to_string() == key)
}

/// Source-like rendering of a callee for error messages.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member { object, property } => format!("{}.{}", describe(object), property),
        Expr::Index { object, .. } => format!("{}[...]", describe(object)),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        Expr::Str(s) => format!("\"{}\"", s),
        Expr::Number(n) => format_number(*n),
        _ => "expression".to_string(),
    }
}

/// Evaluate a binary operator on two already-evaluated operands.
pub(super) fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            let stringy = |v: &Value| matches!(v, Value::Str(_) | Value::Array(_) | Value::Object(_) | Value::Function(_));
            if stringy(left) || stringy(right) {
                Value::Str(format!("{}{}", left.to_display(), right.to_display()))
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Mod => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Pow => Value::Number(left.to_number().powf(right.to_number())),
        BinaryOp::Eq => Value::Bool(left.loose_equals(right)),
        BinaryOp::Ne => Value::Bool(!left.loose_equals(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryOp::StrictNe => Value::Bool(!left.strict_equals(right)),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => Value::Bool(compare(op, left, right)),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Gt => a > b,
            BinaryOp::Le => a <= b,
            _ => a >= b,
        };
    }
    let (a, b) = (left.to_number(), right.to_number());
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Gt => a > b,
        BinaryOp::Le => a <= b,
        _ => a >= b,
    }
}
