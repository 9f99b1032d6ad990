/// Script Values
///
/// Runtime value model, lexical scopes and the JavaScript coercion rules
/// (`String(v)`, `Number(v)`, truthiness, equality) the evaluator relies on.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::builtins::{Method, Native};
use super::types::FunctionDef;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<Object>>;
pub type ScopeRef = Rc<RefCell<Scope>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    Plain,
    Error,
}

#[derive(Debug, Clone)]
pub struct Object {
    pub class: ObjectClass,
    pub props: IndexMap<String, Value>,
}

impl Object {
    pub fn plain() -> Self {
        Self { class: ObjectClass::Plain, props: IndexMap::new() }
    }
}

pub enum Function {
    Closure { def: Rc<FunctionDef>, scope: ScopeRef },
    Native(Native),
    /// A built-in method already bound to its receiver (`"abc".slice`).
    Bound { method: Method, receiver: Value },
}

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(Rc<Function>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(props: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(Object { class: ObjectClass::Plain, props })))
    }

    pub fn native(native: Native) -> Self {
        Value::Function(Rc::new(Function::Native(native)))
    }

    pub fn bound(method: Method, receiver: Value) -> Self {
        Value::Function(Rc::new(Function::Bound { method, receiver }))
    }

    /// Build an `Error`-class object with `name` and `message`.
    pub fn error_object(name: &str, message: String) -> Self {
        let mut props = IndexMap::new();
        props.insert("name".to_string(), Value::str(name));
        props.insert("message".to_string(), Value::Str(message));
        Value::Object(Rc::new(RefCell::new(Object { class: ObjectClass::Error, props })))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
        }
    }

    /// `Number(value)`
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&self.to_display()),
            Value::Object(_) | Value::Function(_) => f64::NAN,
        }
    }

    /// `String(value)`
    pub fn to_display(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => {
                // a cyclic array renders as "" the second time round, and so
                // does anything nested past MAX_JOIN_DEPTH
                let id = Rc::as_ptr(items) as usize;
                let skip = JOINING.with(|joining| {
                    let joining = joining.borrow();
                    joining.len() >= MAX_JOIN_DEPTH || joining.contains(&id)
                });
                if skip {
                    return String::new();
                }
                JOINING.with(|joining| joining.borrow_mut().push(id));
                let text = join_array(&items.borrow(), ",");
                JOINING.with(|joining| joining.borrow_mut().pop());
                text
            }
            Value::Object(obj) => {
                let obj = obj.borrow();
                match obj.class {
                    ObjectClass::Error => {
                        let name = obj.props.get("name").map(Value::to_display).unwrap_or_else(|| "Error".to_string());
                        let message = obj.props.get("message").map(Value::to_display).unwrap_or_default();
                        if message.is_empty() {
                            name
                        } else {
                            format!("{}: {}", name, message)
                        }
                    }
                    ObjectClass::Plain => "[object Object]".to_string(),
                }
            }
            Value::Function(func) => match func.as_ref() {
                Function::Closure { def, .. } => format!(
                    "function {}({}) {{ [code] }}",
                    def.name.as_deref().unwrap_or(""),
                    def.params.join(", ")
                ),
                Function::Native(native) => format!("function {}() {{ [native code] }}", native.name()),
                Function::Bound { method, .. } => format!("function {}() {{ [native code] }}", method.name()),
            },
        }
    }

    /// Message used when this value escapes the script as an error.
    pub fn error_message(&self) -> String {
        if let Value::Object(obj) = self {
            let obj = obj.borrow();
            if obj.class == ObjectClass::Error {
                return obj.props.get("message").map(Value::to_display).unwrap_or_default();
            }
        }
        self.to_display()
    }

    /// Property key form of a value (`obj[key]`).
    pub fn to_property_key(&self) -> String {
        self.to_display()
    }

    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::Str(_))
            | (Value::Str(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_)) => {
                let (a, b) = (self.to_number(), other.to_number());
                a == b
            }
            (Value::Array(_) | Value::Object(_), Value::Str(_) | Value::Number(_))
            | (Value::Str(_) | Value::Number(_), Value::Array(_) | Value::Object(_)) => {
                self.to_display() == other.to_display()
            }
            _ => self.strict_equals(other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_display()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

// ─── Coercion helpers ─────────────────────────────────────

const MAX_JOIN_DEPTH: usize = 1_000;

thread_local! {
    /// Arrays currently being stringified on this thread.
    static JOINING: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// Number-to-string conversion following JavaScript's output for common values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// `Number(string)`: whitespace-trimmed decimal, hex or `Infinity`; otherwise `NaN`.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).map(|n| n as f64).unwrap_or(f64::NAN);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// `Array.prototype.join` semantics: nullish elements become empty strings.
pub fn join_array(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|v| if v.is_nullish() { String::new() } else { v.to_display() })
        .collect::<Vec<_>>()
        .join(separator)
}

// ─── Scopes ───────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    mutable: bool,
}

/// One lexical scope; lookups walk the parent chain.
#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<String, Binding>,
    parent: Option<ScopeRef>,
}

pub enum AssignOutcome {
    Assigned,
    Constant,
    Undeclared,
}

impl Scope {
    pub fn new_ref(parent: Option<ScopeRef>) -> ScopeRef {
        Rc::new(RefCell::new(Scope { vars: HashMap::new(), parent }))
    }

    pub fn declare(&mut self, name: &str, value: Value, mutable: bool) {
        self.vars.insert(name.to_string(), Binding { value, mutable });
    }

    /// Drop every binding and the parent link.
    pub fn clear(&mut self) {
        self.vars.clear();
        self.parent = None;
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.vars.get(name) {
            return Some(binding.value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().lookup(name))
    }

    pub fn assign(&mut self, name: &str, value: Value) -> AssignOutcome {
        if let Some(binding) = self.vars.get_mut(name) {
            if !binding.mutable {
                return AssignOutcome::Constant;
            }
            binding.value = value;
            return AssignOutcome::Assigned;
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => AssignOutcome::Undeclared,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Closure { def, .. } => write!(f, "Closure({:?})", def.name),
            Function::Native(native) => write!(f, "Native({})", native.name()),
            Function::Bound { method, .. } => write!(f, "Bound({})", method.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::types::FunctionBody;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(" 12 "), 12.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x10"), 16.0);
        assert_eq!(string_to_number("1e2"), 100.0);
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("inf").is_nan());
    }

    #[test]
    fn test_to_display() {
        assert_eq!(Value::Undefined.to_display(), "undefined");
        assert_eq!(Value::Null.to_display(), "null");
        assert_eq!(Value::from(true).to_display(), "true");
        let arr = Value::array(vec![Value::from(1.0), Value::Null, Value::from("x")]);
        assert_eq!(arr.to_display(), "1,,x");
        assert_eq!(Value::object(IndexMap::new()).to_display(), "[object Object]");
        assert_eq!(Value::error_object("Error", "boom".into()).to_display(), "Error: boom");
    }

    #[test]
    fn test_cyclic_array_display() {
        let arr = Value::array(vec![Value::from(1.0)]);
        if let Value::Array(items) = &arr {
            items.borrow_mut().push(arr.clone());
        }
        assert_eq!(arr.to_display(), "1,");
    }

    #[test]
    fn test_truthiness_and_typeof() {
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::from(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::array(vec![]).type_of(), "object");
    }

    #[test]
    fn test_equality() {
        assert!(Value::from(1.0).loose_equals(&Value::from("1")));
        assert!(!Value::from(1.0).strict_equals(&Value::from("1")));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(!Value::Null.loose_equals(&Value::from(0.0)));
        assert!(Value::from(true).loose_equals(&Value::from(1.0)));
        let a = Value::array(vec![]);
        assert!(a.strict_equals(&a.clone()));
        assert!(!a.strict_equals(&Value::array(vec![])));
    }

    #[test]
    fn test_scope_clear_breaks_closure_cycle() {
        let scope = Scope::new_ref(None);
        let weak = Rc::downgrade(&scope);
        let def = Rc::new(FunctionDef {
            name: None,
            params: Vec::new(),
            body: FunctionBody::Block(Vec::new()),
            is_arrow: false,
        });
        let closure = Value::Function(Rc::new(Function::Closure { def, scope: scope.clone() }));
        scope.borrow_mut().declare("f", closure, true);

        scope.borrow_mut().clear();
        assert!(!scope.borrow().has_own("f"));
        drop(scope);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_scope_chain() {
        let global = Scope::new_ref(None);
        global.borrow_mut().declare("x", Value::from(1.0), true);
        global.borrow_mut().declare("k", Value::from(2.0), false);
        let inner = Scope::new_ref(Some(global.clone()));

        assert!(inner.borrow().lookup("x").is_some());
        assert!(matches!(inner.borrow_mut().assign("x", Value::from(5.0)), AssignOutcome::Assigned));
        assert_eq!(global.borrow().lookup("x").unwrap().to_number(), 5.0);
        assert!(matches!(inner.borrow_mut().assign("k", Value::Null), AssignOutcome::Constant));
        assert!(matches!(inner.borrow_mut().assign("nope", Value::Null), AssignOutcome::Undeclared));
    }
}
