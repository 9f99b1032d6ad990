/// Script Built-ins
///
/// The global environment handed to every script: the console, process
/// and fs shims backed by the `ScriptHost`, plus the small standard
/// library (`Math`, `JSON`, `Object`, string and array methods).

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::error::{ScriptError, ScriptResult};
use super::interpreter::Interpreter;
use super::value::{format_number, join_array, ArrayRef, ObjectClass, Value};
use crate::fs::FsError;

// ─── Native functions ─────────────────────────────────────

/// Free-standing native functions reachable from globals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Native {
    ConsoleLog,
    ConsoleWarn,
    ConsoleError,
    Require,
    Output,
    Env,
    ProcessCwd,
    ProcessExit,
    FsReadFileSync,
    FsWriteFileSync,
    FsUnlinkSync,
    FsMkdirSync,
    FsExistsSync,
    FsReaddirSync,
    MathFloor,
    MathCeil,
    MathRound,
    MathTrunc,
    MathAbs,
    MathSign,
    MathSqrt,
    MathPow,
    MathMin,
    MathMax,
    MathRandom,
    JsonStringify,
    JsonParse,
    ObjectKeys,
    ObjectValues,
    ObjectEntries,
    ObjectAssign,
    ArrayIsArray,
    NumberCtor,
    StringCtor,
    BooleanCtor,
    ParseInt,
    ParseFloat,
    IsNaN,
    IsFinite,
    /// `Error`, `TypeError`, `RangeError`: the payload is the error name.
    ErrorCtor(&'static str),
}

impl Native {
    pub fn name(&self) -> &'static str {
        match self {
            Native::ConsoleLog => "log",
            Native::ConsoleWarn => "warn",
            Native::ConsoleError => "error",
            Native::Require => "require",
            Native::Output => "output",
            Native::Env => "env",
            Native::ProcessCwd => "cwd",
            Native::ProcessExit => "exit",
            Native::FsReadFileSync => "readFileSync",
            Native::FsWriteFileSync => "writeFileSync",
            Native::FsUnlinkSync => "unlinkSync",
            Native::FsMkdirSync => "mkdirSync",
            Native::FsExistsSync => "existsSync",
            Native::FsReaddirSync => "readdirSync",
            Native::MathFloor => "floor",
            Native::MathCeil => "ceil",
            Native::MathRound => "round",
            Native::MathTrunc => "trunc",
            Native::MathAbs => "abs",
            Native::MathSign => "sign",
            Native::MathSqrt => "sqrt",
            Native::MathPow => "pow",
            Native::MathMin => "min",
            Native::MathMax => "max",
            Native::MathRandom => "random",
            Native::JsonStringify => "stringify",
            Native::JsonParse => "parse",
            Native::ObjectKeys => "keys",
            Native::ObjectValues => "values",
            Native::ObjectEntries => "entries",
            Native::ObjectAssign => "assign",
            Native::ArrayIsArray => "isArray",
            Native::NumberCtor => "Number",
            Native::StringCtor => "String",
            Native::BooleanCtor => "Boolean",
            Native::ParseInt => "parseInt",
            Native::ParseFloat => "parseFloat",
            Native::IsNaN => "isNaN",
            Native::IsFinite => "isFinite",
            Native::ErrorCtor(name) => *name,
        }
    }
}

// ─── Bound methods ────────────────────────────────────────

/// Methods of primitive and built-in receivers, resolved by receiver type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    At,
    CharAt,
    CharCodeAt,
    Concat,
    EndsWith,
    Every,
    Filter,
    Find,
    FindIndex,
    ForEach,
    HasOwnProperty,
    Includes,
    IndexOf,
    Join,
    LastIndexOf,
    Map,
    PadEnd,
    PadStart,
    Pop,
    Push,
    Reduce,
    Repeat,
    Replace,
    ReplaceAll,
    Reverse,
    Shift,
    Slice,
    Some,
    Sort,
    Splice,
    Split,
    StartsWith,
    Substring,
    ToFixed,
    ToLowerCase,
    ToString,
    ToUpperCase,
    Trim,
    TrimEnd,
    TrimStart,
    Unshift,
}

const METHOD_NAMES: &[(&str, Method)] = &[
    ("at", Method::At),
    ("charAt", Method::CharAt),
    ("charCodeAt", Method::CharCodeAt),
    ("concat", Method::Concat),
    ("endsWith", Method::EndsWith),
    ("every", Method::Every),
    ("filter", Method::Filter),
    ("find", Method::Find),
    ("findIndex", Method::FindIndex),
    ("forEach", Method::ForEach),
    ("hasOwnProperty", Method::HasOwnProperty),
    ("includes", Method::Includes),
    ("indexOf", Method::IndexOf),
    ("join", Method::Join),
    ("lastIndexOf", Method::LastIndexOf),
    ("map", Method::Map),
    ("padEnd", Method::PadEnd),
    ("padStart", Method::PadStart),
    ("pop", Method::Pop),
    ("push", Method::Push),
    ("reduce", Method::Reduce),
    ("repeat", Method::Repeat),
    ("replace", Method::Replace),
    ("replaceAll", Method::ReplaceAll),
    ("reverse", Method::Reverse),
    ("shift", Method::Shift),
    ("slice", Method::Slice),
    ("some", Method::Some),
    ("sort", Method::Sort),
    ("splice", Method::Splice),
    ("split", Method::Split),
    ("startsWith", Method::StartsWith),
    ("substring", Method::Substring),
    ("toFixed", Method::ToFixed),
    ("toLowerCase", Method::ToLowerCase),
    ("toString", Method::ToString),
    ("toUpperCase", Method::ToUpperCase),
    ("trim", Method::Trim),
    ("trimEnd", Method::TrimEnd),
    ("trimStart", Method::TrimStart),
    ("unshift", Method::Unshift),
];

impl Method {
    pub fn name(&self) -> &'static str {
        METHOD_NAMES
            .iter()
            .find(|(_, m)| m == self)
            .map(|(name, _)| *name)
            .unwrap_or("anonymous")
    }

    fn lookup(name: &str, allowed: &[Method]) -> Option<Method> {
        METHOD_NAMES
            .iter()
            .find(|(n, m)| *n == name && allowed.contains(m))
            .map(|(_, m)| *m)
    }

    pub fn for_string(name: &str) -> Option<Method> {
        use Method::*;
        Self::lookup(
            name,
            &[
                At, CharAt, CharCodeAt, Concat, EndsWith, Includes, IndexOf, LastIndexOf, PadEnd, PadStart, Repeat,
                Replace, ReplaceAll, Slice, Split, StartsWith, Substring, ToLowerCase, ToString, ToUpperCase, Trim,
                TrimEnd, TrimStart,
            ],
        )
    }

    pub fn for_array(name: &str) -> Option<Method> {
        use Method::*;
        Self::lookup(
            name,
            &[
                At, Concat, Every, Filter, Find, FindIndex, ForEach, Includes, IndexOf, Join, LastIndexOf, Map, Pop,
                Push, Reduce, Reverse, Shift, Slice, Some, Sort, Splice, ToString, Unshift,
            ],
        )
    }

    pub fn for_number(name: &str) -> Option<Method> {
        Self::lookup(name, &[Method::ToFixed, Method::ToString])
    }

    pub fn for_object(name: &str) -> Option<Method> {
        Self::lookup(name, &[Method::HasOwnProperty, Method::ToString])
    }

    pub fn for_bool(name: &str) -> Option<Method> {
        Self::lookup(name, &[Method::ToString])
    }
}

// ─── Global environment ───────────────────────────────────

fn namespace(entries: &[(&str, Value)]) -> Value {
    let props: IndexMap<String, Value> = entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    Value::object(props)
}

fn natives(entries: &[Native]) -> Value {
    let props: IndexMap<String, Value> =
        entries.iter().map(|n| (n.name().to_string(), Value::native(*n))).collect();
    Value::object(props)
}

fn fs_module() -> Value {
    natives(&[
        Native::FsReadFileSync,
        Native::FsWriteFileSync,
        Native::FsUnlinkSync,
        Native::FsMkdirSync,
        Native::FsExistsSync,
        Native::FsReaddirSync,
    ])
}

impl Interpreter<'_> {
    /// Populate the global scope.
    pub fn install_globals(&mut self) {
        let console = natives(&[Native::ConsoleLog, Native::ConsoleWarn, Native::ConsoleError]);
        let env: IndexMap<String, Value> = self.host.env().into_iter().map(|(k, v)| (k, Value::Str(v))).collect();
        let process = namespace(&[
            ("env", Value::object(env)),
            ("cwd", Value::native(Native::ProcessCwd)),
            ("exit", Value::native(Native::ProcessExit)),
        ]);
        let require = Value::native(Native::Require);
        let global = namespace(&[
            ("process", process.clone()),
            ("console", console.clone()),
            ("require", require.clone()),
            ("env", Value::native(Native::Env)),
        ]);

        let mut math = IndexMap::new();
        math.insert("PI".to_string(), Value::Number(std::f64::consts::PI));
        math.insert("E".to_string(), Value::Number(std::f64::consts::E));
        for native in [
            Native::MathFloor,
            Native::MathCeil,
            Native::MathRound,
            Native::MathTrunc,
            Native::MathAbs,
            Native::MathSign,
            Native::MathSqrt,
            Native::MathPow,
            Native::MathMin,
            Native::MathMax,
            Native::MathRandom,
        ] {
            math.insert(native.name().to_string(), Value::native(native));
        }

        let globals = [
            ("global", global),
            ("console", console),
            ("require", require),
            ("output", Value::native(Native::Output)),
            ("process", process),
            ("Math", Value::object(math)),
            ("JSON", natives(&[Native::JsonStringify, Native::JsonParse])),
            (
                "Object",
                natives(&[Native::ObjectKeys, Native::ObjectValues, Native::ObjectEntries, Native::ObjectAssign]),
            ),
            ("Array", natives(&[Native::ArrayIsArray])),
            ("Number", Value::native(Native::NumberCtor)),
            ("String", Value::native(Native::StringCtor)),
            ("Boolean", Value::native(Native::BooleanCtor)),
            ("parseInt", Value::native(Native::ParseInt)),
            ("parseFloat", Value::native(Native::ParseFloat)),
            ("isNaN", Value::native(Native::IsNaN)),
            ("isFinite", Value::native(Native::IsFinite)),
            ("Error", Value::native(Native::ErrorCtor("Error"))),
            ("TypeError", Value::native(Native::ErrorCtor("TypeError"))),
            ("RangeError", Value::native(Native::ErrorCtor("RangeError"))),
            ("NaN", Value::Number(f64::NAN)),
            ("Infinity", Value::Number(f64::INFINITY)),
        ];
        let mut scope = self.global.borrow_mut();
        for (name, value) in globals {
            scope.declare(name, value, true);
        }
    }

    // ─── Native dispatch ──────────────────────────────────

    pub(super) fn call_native(&mut self, native: Native, _this: Value, args: Vec<Value>) -> ScriptResult<Value> {
        let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
        let num = |i: usize| arg(i).to_number();
        let strings = || args.iter().map(Value::to_display).collect::<Vec<_>>();

        let result = match native {
            Native::ConsoleLog => {
                self.console.log(&strings());
                Value::Undefined
            }
            Native::ConsoleWarn => {
                self.console.warn(&strings());
                Value::Undefined
            }
            Native::ConsoleError => {
                self.console.error(&strings());
                Value::Undefined
            }
            Native::Output => {
                self.console.raw(&arg(0).to_display());
                Value::Undefined
            }
            Native::Require => {
                let module = arg(0).to_display();
                if module != "fs" {
                    return Err(ScriptError::error(format!("Cannot find module '{}'", module)));
                }
                fs_module()
            }
            Native::Env => {
                let name = arg(0).to_display();
                self.host
                    .env()
                    .into_iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| Value::Str(v))
                    .unwrap_or(Value::Undefined)
            }
            Native::ProcessCwd => Value::Str(self.host.cwd()),
            Native::ProcessExit => {
                return Err(ScriptError::error(format!("Process exited with code {}", arg(0).to_display())));
            }
            Native::FsReadFileSync => Value::Str(self.host.read_file(&arg(0).to_display()).unwrap_or_default()),
            Native::FsWriteFileSync => {
                self.host.write_file(&arg(0).to_display(), &arg(1).to_display()).map_err(fs_error)?;
                Value::Undefined
            }
            Native::FsUnlinkSync => {
                self.host.unlink(&arg(0).to_display()).map_err(fs_error)?;
                Value::Undefined
            }
            Native::FsMkdirSync => {
                self.host.mkdir(&arg(0).to_display()).map_err(fs_error)?;
                Value::Undefined
            }
            Native::FsExistsSync => Value::Bool(self.host.exists(&arg(0).to_display())),
            Native::FsReaddirSync => {
                let names = self.host.read_dir(&arg(0).to_display()).map_err(fs_error)?;
                Value::array(names.into_iter().map(Value::Str).collect())
            }
            Native::MathFloor => Value::Number(num(0).floor()),
            Native::MathCeil => Value::Number(num(0).ceil()),
            Native::MathRound => Value::Number((num(0) + 0.5).floor()),
            Native::MathTrunc => Value::Number(num(0).trunc()),
            Native::MathAbs => Value::Number(num(0).abs()),
            Native::MathSign => {
                let n = num(0);
                Value::Number(if n.is_nan() || n == 0.0 { n } else { n.signum() })
            }
            Native::MathSqrt => Value::Number(num(0).sqrt()),
            Native::MathPow => Value::Number(num(0).powf(num(1))),
            Native::MathMin => Value::Number(fold_numbers(&args, f64::INFINITY, f64::min)),
            Native::MathMax => Value::Number(fold_numbers(&args, f64::NEG_INFINITY, f64::max)),
            Native::MathRandom => Value::Number(rand::random::<f64>()),
            Native::JsonStringify => json_stringify(&arg(0), &arg(2))?,
            Native::JsonParse => {
                let text = arg(0).to_display();
                let parsed: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| ScriptError::Thrown(Value::error_object("SyntaxError", e.to_string())))?;
                from_json(parsed)
            }
            Native::ObjectKeys => {
                let keys = self.own_keys(&arg(0));
                Value::array(keys.into_iter().map(Value::Str).collect())
            }
            Native::ObjectValues | Native::ObjectEntries => {
                let target = arg(0);
                let mut items = Vec::new();
                for key in self.own_keys(&target) {
                    let value = self.get_property(&target, &key)?;
                    items.push(if native == Native::ObjectValues {
                        value
                    } else {
                        Value::array(vec![Value::Str(key), value])
                    });
                }
                Value::array(items)
            }
            Native::ObjectAssign => {
                let target = arg(0);
                if let Value::Object(obj) = &target {
                    for source in args.iter().skip(1) {
                        for key in self.own_keys(source) {
                            let value = self.get_property(source, &key)?;
                            obj.borrow_mut().props.insert(key, value);
                        }
                    }
                }
                target
            }
            Native::ArrayIsArray => Value::Bool(matches!(arg(0), Value::Array(_))),
            Native::NumberCtor => Value::Number(if args.is_empty() { 0.0 } else { num(0) }),
            Native::StringCtor => Value::Str(if args.is_empty() { String::new() } else { arg(0).to_display() }),
            Native::BooleanCtor => Value::Bool(arg(0).is_truthy()),
            Native::ParseInt => Value::Number(parse_int(&arg(0).to_display(), &arg(1))),
            Native::ParseFloat => Value::Number(parse_float(&arg(0).to_display())),
            Native::IsNaN => Value::Bool(num(0).is_nan()),
            Native::IsFinite => Value::Bool(num(0).is_finite()),
            Native::ErrorCtor(name) => {
                let message = match arg(0) {
                    Value::Undefined => String::new(),
                    other => other.to_display(),
                };
                Value::error_object(name, message)
            }
        };
        Ok(result)
    }

    // ─── Method dispatch ──────────────────────────────────

    pub(super) fn call_method(&mut self, method: Method, receiver: Value, args: Vec<Value>) -> ScriptResult<Value> {
        match &receiver {
            Value::Str(s) => {
                let result = string_method(method, s, &args, self.limits.max_string_length)?;
                self.check_string(result)
            }
            Value::Array(items) => self.array_method(method, items, &receiver, &args),
            Value::Number(n) => Ok(number_method(method, *n, &args)),
            Value::Object(obj) => Ok(match method {
                Method::HasOwnProperty => {
                    let key = args.first().map(Value::to_property_key).unwrap_or_default();
                    Value::Bool(obj.borrow().props.contains_key(&key))
                }
                _ => Value::Str(receiver.to_display()),
            }),
            other => Ok(Value::Str(other.to_display())),
        }
    }

    fn callback(&mut self, func: &Value, item: Value, index: usize, array: &Value) -> ScriptResult<Value> {
        self.tick()?;
        self.call_function(func, Value::Undefined, vec![item, Value::Number(index as f64), array.clone()])
    }

    fn array_method(&mut self, method: Method, items: &ArrayRef, receiver: &Value, args: &[Value]) -> ScriptResult<Value> {
        let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
        let snapshot = || items.borrow().clone();
        let len = items.borrow().len();

        let needs_callback = matches!(
            method,
            Method::Map | Method::Filter | Method::ForEach | Method::Find | Method::FindIndex | Method::Some
                | Method::Every | Method::Reduce
        );
        if needs_callback && !matches!(arg(0), Value::Function(_)) {
            return Err(ScriptError::type_error(format!("{} is not a function", arg(0).to_display())));
        }

        let max_len = self.limits.max_array_length;
        let grow = |extra: usize| {
            if len.saturating_add(extra) > max_len {
                Err(ScriptError::range_error("Invalid array length"))
            } else {
                Ok(())
            }
        };

        let result = match method {
            Method::Push => {
                grow(args.len())?;
                items.borrow_mut().extend(args.iter().cloned());
                Value::Number(items.borrow().len() as f64)
            }
            Method::Pop => items.borrow_mut().pop().unwrap_or(Value::Undefined),
            Method::Shift => {
                if len == 0 {
                    Value::Undefined
                } else {
                    items.borrow_mut().remove(0)
                }
            }
            Method::Unshift => {
                grow(args.len())?;
                let mut current = items.borrow_mut();
                for (i, value) in args.iter().enumerate() {
                    current.insert(i, value.clone());
                }
                Value::Number(current.len() as f64)
            }
            Method::Join => {
                let separator = match arg(0) {
                    Value::Undefined => ",".to_string(),
                    other => other.to_display(),
                };
                if (separator.len() as f64) * (len.saturating_sub(1) as f64) > self.limits.max_string_length as f64 {
                    return Err(ScriptError::range_error("Invalid string length"));
                }
                self.check_string(Value::Str(join_array(&items.borrow(), &separator)))?
            }
            Method::ToString => Value::Str(join_array(&items.borrow(), ",")),
            Method::At => {
                let index = relative_index(arg(0).to_number(), len, true);
                index.and_then(|i| items.borrow().get(i).cloned()).unwrap_or(Value::Undefined)
            }
            Method::IndexOf => Value::Number(
                items.borrow().iter().position(|v| v.strict_equals(&arg(0))).map_or(-1.0, |i| i as f64),
            ),
            Method::LastIndexOf => Value::Number(
                items.borrow().iter().rposition(|v| v.strict_equals(&arg(0))).map_or(-1.0, |i| i as f64),
            ),
            Method::Includes => {
                let needle = arg(0);
                let found = items.borrow().iter().any(|v| {
                    v.strict_equals(&needle) || matches!((v, &needle), (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan())
                });
                Value::Bool(found)
            }
            Method::Slice => {
                let (start, end) = slice_bounds(&arg(0), &arg(1), len);
                Value::array(items.borrow()[start..end.max(start)].to_vec())
            }
            Method::Splice => {
                grow(args.len().saturating_sub(2))?;
                let start = relative_index(arg(0).to_number(), len, false).unwrap_or(len);
                let count = match args.get(1) {
                    None => len - start,
                    Some(v) => (to_integer(v.to_number()).max(0.0) as usize).min(len - start),
                };
                let mut current = items.borrow_mut();
                let removed: Vec<Value> = current.splice(start..start + count, args.iter().skip(2).cloned()).collect();
                Value::array(removed)
            }
            Method::Concat => {
                let extra: usize = args
                    .iter()
                    .map(|value| match value {
                        Value::Array(other) => other.borrow().len(),
                        _ => 1,
                    })
                    .sum();
                grow(extra)?;
                let mut combined = snapshot();
                for value in args {
                    match value {
                        Value::Array(other) => combined.extend(other.borrow().iter().cloned()),
                        other => combined.push(other.clone()),
                    }
                }
                Value::array(combined)
            }
            Method::Reverse => {
                items.borrow_mut().reverse();
                receiver.clone()
            }
            Method::Sort => {
                let sorted = self.sort_values(snapshot(), &arg(0))?;
                *items.borrow_mut() = sorted;
                receiver.clone()
            }
            Method::Map => {
                let mut mapped = Vec::with_capacity(len);
                for (i, item) in snapshot().into_iter().enumerate() {
                    mapped.push(self.callback(&arg(0), item, i, receiver)?);
                }
                Value::array(mapped)
            }
            Method::Filter => {
                let mut kept = Vec::new();
                for (i, item) in snapshot().into_iter().enumerate() {
                    if self.callback(&arg(0), item.clone(), i, receiver)?.is_truthy() {
                        kept.push(item);
                    }
                }
                Value::array(kept)
            }
            Method::ForEach => {
                for (i, item) in snapshot().into_iter().enumerate() {
                    self.callback(&arg(0), item, i, receiver)?;
                }
                Value::Undefined
            }
            Method::Find | Method::FindIndex => {
                let mut found = None;
                for (i, item) in snapshot().into_iter().enumerate() {
                    if self.callback(&arg(0), item.clone(), i, receiver)?.is_truthy() {
                        found = Some((i, item));
                        break;
                    }
                }
                match (method, found) {
                    (Method::Find, Some((_, item))) => item,
                    (Method::Find, None) => Value::Undefined,
                    (_, Some((i, _))) => Value::Number(i as f64),
                    (_, None) => Value::Number(-1.0),
                }
            }
            Method::Some | Method::Every => {
                let want = method == Method::Some;
                let mut outcome = !want;
                for (i, item) in snapshot().into_iter().enumerate() {
                    if self.callback(&arg(0), item, i, receiver)?.is_truthy() == want {
                        outcome = want;
                        break;
                    }
                }
                Value::Bool(outcome)
            }
            Method::Reduce => {
                let mut values = snapshot().into_iter().enumerate();
                let mut acc = if args.len() >= 2 {
                    arg(1)
                } else {
                    match values.next() {
                        Some((_, first)) => first,
                        None => return Err(ScriptError::type_error("Reduce of empty array with no initial value")),
                    }
                };
                for (i, item) in values {
                    self.tick()?;
                    acc = self.call_function(
                        &arg(0),
                        Value::Undefined,
                        vec![acc, item, Value::Number(i as f64), receiver.clone()],
                    )?;
                }
                acc
            }
            _ => Value::Undefined,
        };
        Ok(result)
    }

    /// Stable bottom-up merge sort; the comparator may be any script function.
    fn sort_values(&mut self, mut values: Vec<Value>, comparator: &Value) -> ScriptResult<Vec<Value>> {
        let n = values.len();
        let mut width = 1;
        while width < n {
            let mut merged = Vec::with_capacity(n);
            let mut start = 0;
            while start < n {
                let mid = (start + width).min(n);
                let end = (start + 2 * width).min(n);
                let (mut i, mut j) = (start, mid);
                while i < mid && j < end {
                    if self.sorts_after(&values[i], &values[j], comparator)? {
                        merged.push(values[j].clone());
                        j += 1;
                    } else {
                        merged.push(values[i].clone());
                        i += 1;
                    }
                }
                merged.extend_from_slice(&values[i..mid]);
                merged.extend_from_slice(&values[j..end]);
                start = end;
            }
            values = merged;
            width *= 2;
        }
        Ok(values)
    }

    fn sorts_after(&mut self, a: &Value, b: &Value, comparator: &Value) -> ScriptResult<bool> {
        self.tick()?;
        match comparator {
            Value::Function(_) => {
                let result = self.call_function(comparator, Value::Undefined, vec![a.clone(), b.clone()])?;
                Ok(result.to_number() > 0.0)
            }
            _ => Ok(default_order(a, b) == Ordering::Greater),
        }
    }
}

fn default_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => Ordering::Equal,
        (Value::Undefined, _) => Ordering::Greater,
        (_, Value::Undefined) => Ordering::Less,
        _ => a.to_display().cmp(&b.to_display()),
    }
}

fn fs_error(err: FsError) -> ScriptError {
    ScriptError::error(err.to_string())
}

fn fold_numbers(args: &[Value], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return f64::NAN;
        }
        acc = pick(acc, n);
    }
    acc
}

fn to_integer(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

/// Resolve a possibly negative index against `len`. With `strict`, an
/// out-of-range index yields `None`; otherwise it is clamped.
fn relative_index(n: f64, len: usize, strict: bool) -> Option<usize> {
    let n = to_integer(n);
    let resolved = if n < 0.0 { len as f64 + n } else { n };
    if strict {
        (resolved >= 0.0 && resolved < len as f64).then_some(resolved as usize)
    } else {
        Some(resolved.clamp(0.0, len as f64) as usize)
    }
}

fn slice_bounds(start: &Value, end: &Value, len: usize) -> (usize, usize) {
    let start = relative_index(start.to_number(), len, false).unwrap_or(0);
    let end = match end {
        Value::Undefined => len,
        other => relative_index(other.to_number(), len, false).unwrap_or(len),
    };
    (start, end)
}

// ─── Strings ──────────────────────────────────────────────

fn string_method(method: Method, s: &str, args: &[Value], max_len: usize) -> ScriptResult<Value> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
    let text = |i: usize| arg(i).to_display();
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let substring = |start: usize, end: usize| chars[start..end.max(start)].iter().collect::<String>();

    let result = match method {
        Method::At => relative_index(arg(0).to_number(), len, true)
            .map(|i| Value::Str(chars[i].to_string()))
            .unwrap_or(Value::Undefined),
        Method::CharAt => {
            let index = to_integer(arg(0).to_number());
            Value::Str(if index >= 0.0 && (index as usize) < len { chars[index as usize].to_string() } else { String::new() })
        }
        Method::CharCodeAt => {
            let index = to_integer(arg(0).to_number());
            Value::Number(if index >= 0.0 && (index as usize) < len { chars[index as usize] as u32 as f64 } else { f64::NAN })
        }
        Method::IndexOf => Value::Number(char_index(s, s.find(&text(0)))),
        Method::LastIndexOf => Value::Number(char_index(s, s.rfind(&text(0)))),
        Method::Includes => Value::Bool(s.contains(&text(0))),
        Method::StartsWith => Value::Bool(s.starts_with(&text(0))),
        Method::EndsWith => Value::Bool(s.ends_with(&text(0))),
        Method::Slice => {
            let (start, end) = slice_bounds(&arg(0), &arg(1), len);
            Value::Str(substring(start, end))
        }
        Method::Substring => {
            let clamp = |v: Value, default: usize| match v {
                Value::Undefined => default,
                other => to_integer(other.to_number()).clamp(0.0, len as f64) as usize,
            };
            let (a, b) = (clamp(arg(0), 0), clamp(arg(1), len));
            Value::Str(substring(a.min(b), a.max(b)))
        }
        Method::ToUpperCase => Value::Str(s.to_uppercase()),
        Method::ToLowerCase => Value::Str(s.to_lowercase()),
        Method::Trim => Value::Str(s.trim().to_string()),
        Method::TrimStart => Value::Str(s.trim_start().to_string()),
        Method::TrimEnd => Value::Str(s.trim_end().to_string()),
        Method::Split => match arg(0) {
            Value::Undefined => Value::array(vec![Value::str(s)]),
            sep => {
                let sep = sep.to_display();
                let parts: Vec<Value> = if sep.is_empty() {
                    chars.iter().map(|c| Value::Str(c.to_string())).collect()
                } else {
                    s.split(sep.as_str()).map(Value::str).collect()
                };
                Value::array(parts)
            }
        },
        Method::Replace => Value::Str(s.replacen(&text(0), &text(1), 1)),
        Method::ReplaceAll => Value::Str(s.replace(&text(0), &text(1))),
        Method::Repeat => {
            let count = to_integer(arg(0).to_number());
            if count < 0.0 || count.is_infinite() {
                return Err(ScriptError::range_error(format!("Invalid count value: {}", format_number(count))));
            }
            if count * s.len() as f64 > max_len as f64 {
                return Err(ScriptError::range_error("Invalid string length"));
            }
            Value::Str(s.repeat(count as usize))
        }
        Method::PadStart | Method::PadEnd => {
            let target = to_integer(arg(0).to_number()).max(0.0);
            if target > max_len as f64 {
                return Err(ScriptError::range_error("Invalid string length"));
            }
            let target = target as usize;
            let fill = match arg(1) {
                Value::Undefined => " ".to_string(),
                other => other.to_display(),
            };
            if target <= len || fill.is_empty() {
                Value::str(s)
            } else {
                let padding: String = fill.chars().cycle().take(target - len).collect();
                Value::Str(if method == Method::PadStart { padding + s } else { format!("{}{}", s, padding) })
            }
        }
        Method::Concat => Value::Str(args.iter().fold(s.to_string(), |mut acc, v| {
            acc.push_str(&v.to_display());
            acc
        })),
        Method::ToString => Value::str(s),
        _ => Value::Undefined,
    };
    Ok(result)
}

/// Convert a byte offset from `str::find` into a character index.
fn char_index(s: &str, byte_offset: Option<usize>) -> f64 {
    match byte_offset {
        Some(offset) => s[..offset].chars().count() as f64,
        None => -1.0,
    }
}

// ─── Numbers ──────────────────────────────────────────────

fn number_method(method: Method, n: f64, args: &[Value]) -> Value {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
    match method {
        Method::ToFixed => {
            let digits = to_integer(arg(0).to_number()).clamp(0.0, 100.0) as usize;
            Value::Str(to_fixed(n, digits))
        }
        _ => match arg(0) {
            Value::Undefined => Value::Str(format_number(n)),
            radix => Value::Str(to_radix(n, to_integer(radix.to_number()) as u32)),
        },
    }
}

fn to_fixed(n: f64, digits: usize) -> String {
    if !n.is_finite() {
        return format_number(n);
    }
    let scale = 10f64.powi(digits as i32);
    let scaled = n.abs() * scale;
    // exact halves round away from zero
    let value = if scaled.fract() == 0.5 { n.signum() * scaled.ceil() / scale } else { n };
    format!("{:.*}", digits, value)
}

fn to_radix(n: f64, radix: u32) -> String {
    if !(2..=36).contains(&radix) || radix == 10 || n.fract() != 0.0 || !n.is_finite() {
        return format_number(n);
    }
    let mut value = n.abs() as u64;
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(std::char::from_digit((value % radix as u64) as u32, radix).unwrap_or('?'));
        value /= radix as u64;
    }
    if n < 0.0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn parse_int(text: &str, radix: &Value) -> f64 {
    let mut s = text.trim_start();
    let negative = s.starts_with('-');
    if s.starts_with('-') || s.starts_with('+') {
        s = &s[1..];
    }
    let mut radix = match radix {
        Value::Undefined => 10,
        other => to_integer(other.to_number()) as u32,
    };
    if radix == 0 {
        radix = 10;
    }
    if (radix == 10 || radix == 16) && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
        radix = 16;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let digits: Vec<u32> = s.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let value = digits.iter().fold(0f64, |acc, d| acc * radix as f64 + *d as f64);
    if negative {
        -value
    } else {
        value
    }
}

fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let unsigned = s.trim_start_matches(['+', '-']);
    if unsigned.starts_with("Infinity") {
        return if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    // longest prefix that parses as a number
    let candidate: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .collect();
    (1..=candidate.len())
        .rev()
        .filter_map(|end| candidate.get(..end))
        .find_map(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

// ─── JSON ─────────────────────────────────────────────────

const MAX_JSON_DEPTH: usize = 128;

fn json_stringify(value: &Value, indent: &Value) -> ScriptResult<Value> {
    let Some(json) = to_json(value, 0)? else {
        return Ok(Value::Undefined);
    };
    let width = match indent {
        Value::Number(n) => to_integer(*n).clamp(0.0, 10.0) as usize,
        Value::Str(s) => s.len().min(10),
        _ => 0,
    };
    let text = if width == 0 {
        serde_json::to_string(&json).map_err(|e| ScriptError::type_error(e.to_string()))?
    } else {
        let pad = match indent {
            Value::Str(s) => s.chars().take(10).collect::<String>(),
            _ => " ".repeat(width),
        };
        let mut buf = Vec::new();
        {
            let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            serde::Serialize::serialize(&json, &mut serializer).map_err(|e| ScriptError::type_error(e.to_string()))?;
        }
        String::from_utf8_lossy(&buf).into_owned()
    };
    Ok(Value::Str(text))
}

fn to_json(value: &Value, depth: usize) -> ScriptResult<Option<serde_json::Value>> {
    if depth > MAX_JSON_DEPTH {
        return Err(ScriptError::type_error("Converting circular structure to JSON"));
    }
    Ok(match value {
        Value::Undefined | Value::Function(_) => None,
        Value::Null => Some(serde_json::Value::Null),
        Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
        Value::Number(n) => Some(json_number(*n)),
        Value::Str(s) => Some(serde_json::Value::String(s.clone())),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items.borrow().iter() {
                out.push(to_json(item, depth + 1)?.unwrap_or(serde_json::Value::Null));
            }
            Some(serde_json::Value::Array(out))
        }
        Value::Object(obj) => {
            let obj = obj.borrow();
            let mut map = serde_json::Map::new();
            if obj.class == ObjectClass::Plain {
                for (key, item) in &obj.props {
                    if let Some(json) = to_json(item, depth + 1)? {
                        map.insert(key.clone(), json);
                    }
                }
            }
            Some(serde_json::Value::Object(map))
        }
    })
}

fn json_number(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
}

fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::object(map.into_iter().map(|(k, v)| (k, from_json(v))).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_lookup_by_receiver() {
        assert_eq!(Method::for_string("toUpperCase"), Some(Method::ToUpperCase));
        assert_eq!(Method::for_string("push"), None);
        assert_eq!(Method::for_array("push"), Some(Method::Push));
        assert_eq!(Method::for_number("toFixed"), Some(Method::ToFixed));
        assert_eq!(Method::Push.name(), "push");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42px", &Value::Undefined), 42.0);
        assert_eq!(parse_int("  -7", &Value::Undefined), -7.0);
        assert_eq!(parse_int("0x1f", &Value::Undefined), 31.0);
        assert_eq!(parse_int("101", &Value::Number(2.0)), 5.0);
        assert!(parse_int("abc", &Value::Undefined).is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("3.14abc"), 3.14);
        assert_eq!(parse_float("  -2e3"), -2000.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert!(parse_float("x1").is_nan());
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(3.14159, 2), "3.14");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(1.0, 3), "1.000");
        assert_eq!(to_fixed(-1.5, 0), "-2");
    }

    #[test]
    fn test_to_radix() {
        assert_eq!(to_radix(255.0, 16), "ff");
        assert_eq!(to_radix(-5.0, 2), "-101");
        assert_eq!(to_radix(1.5, 2), "1.5");
    }

    #[test]
    fn test_json_numbers_keep_integer_form() {
        let value = Value::array(vec![Value::Number(1.0), Value::Number(1.5), Value::Number(f64::NAN)]);
        let json = json_stringify(&value, &Value::Undefined).unwrap();
        assert_eq!(json.to_display(), "[1,1.5,null]");
    }

    #[test]
    fn test_json_skips_undefined_members() {
        let mut props = IndexMap::new();
        props.insert("b".to_string(), Value::Number(2.0));
        props.insert("a".to_string(), Value::Undefined);
        props.insert("c".to_string(), Value::str("x"));
        let json = json_stringify(&Value::object(props), &Value::Undefined).unwrap();
        assert_eq!(json.to_display(), r#"{"b":2,"c":"x"}"#);
    }

    #[test]
    fn test_json_pretty_print() {
        let mut props = IndexMap::new();
        props.insert("a".to_string(), Value::Number(1.0));
        let json = json_stringify(&Value::object(props), &Value::Number(2.0)).unwrap();
        assert_eq!(json.to_display(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_string_methods() {
        let call = |m, args: &[Value]| string_method(m, "Hello, World", args, 1 << 24).unwrap().to_display();
        assert_eq!(call(Method::Slice, &[Value::Number(-5.0)]), "World");
        assert_eq!(call(Method::Substring, &[Value::Number(5.0), Value::Number(0.0)]), "Hello");
        assert_eq!(call(Method::IndexOf, &[Value::str("World")]), "7");
        assert_eq!(call(Method::Split, &[Value::str(", ")]), "Hello,World");
        assert_eq!(call(Method::PadStart, &[Value::Number(14.0), Value::str("*")]), "**Hello, World");
        assert_eq!(call(Method::Replace, &[Value::str("l"), Value::str("L")]), "HeLlo, World");
        assert_eq!(call(Method::CharAt, &[Value::Number(99.0)]), "");
    }
}
