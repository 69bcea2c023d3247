use std::fmt;

/// A Python argument value as written at the call site.
///
/// Literals are decoded; identifiers and dotted names become [`PyValue::Name`];
/// anything else (calls, arithmetic, subscripts, comprehensions) is kept as
/// opaque source in [`PyValue::Expr`] and can only be decided by asking the
/// real library.
#[derive(Debug, Clone, PartialEq)]
pub enum PyValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<PyValue>),
    Tuple(Vec<PyValue>),
    Set(Vec<PyValue>),
    Dict(Vec<(PyValue, PyValue)>),
    Name(String),
    Expr(String),
}

impl PyValue {
    /// `true` when the value was fully decoded from literal syntax.
    pub fn is_literal(&self) -> bool {
        match self {
            PyValue::Name(_) | PyValue::Expr(_) => false,
            PyValue::List(items) | PyValue::Tuple(items) | PyValue::Set(items) => {
                items.iter().all(PyValue::is_literal)
            }
            PyValue::Dict(entries) => entries.iter().all(|(k, v)| k.is_literal() && v.is_literal()),
            _ => true,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PyValue::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view, following Python's `bool` ⊂ `int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PyValue::Int(i) => Some(*i),
            PyValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PyValue::Int(i) => Some(*i as f64),
            PyValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            PyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Items of a list, tuple or set.
    pub fn as_sequence(&self) -> Option<&[PyValue]> {
        match self {
            PyValue::List(items) | PyValue::Tuple(items) | PyValue::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Python truthiness, when it can be decided from the literal.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            PyValue::None => Some(false),
            PyValue::Bool(b) => Some(*b),
            PyValue::Int(i) => Some(*i != 0),
            PyValue::Float(f) => Some(*f != 0.0),
            PyValue::Str(s) => Some(!s.is_empty()),
            PyValue::List(items) | PyValue::Tuple(items) | PyValue::Set(items) => {
                Some(!items.is_empty())
            }
            PyValue::Dict(entries) => Some(!entries.is_empty()),
            PyValue::Name(_) | PyValue::Expr(_) => None,
        }
    }

    /// Python `==`. Numbers compare across `bool`, `int` and `float`; names
    /// and opaque expressions are equal only when their source matches.
    pub fn py_eq(&self, other: &PyValue) -> bool {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a == b;
        }
        match (self, other) {
            (PyValue::None, PyValue::None) => true,
            (PyValue::Str(a), PyValue::Str(b)) => a == b,
            (PyValue::List(a), PyValue::List(b)) | (PyValue::Tuple(a), PyValue::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y))
            }
            (PyValue::Set(a), PyValue::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.py_eq(y)))
            }
            (PyValue::Dict(a), PyValue::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.iter().any(|(k2, v2)| k.py_eq(k2) && v.py_eq(v2)))
            }
            (PyValue::Name(a), PyValue::Name(b)) | (PyValue::Expr(a), PyValue::Expr(b)) => a == b,
            _ => false,
        }
    }

    /// Python `item in self`: element membership for sequences, key
    /// membership for dicts, substring search for strings. `None` when the
    /// container is not a literal.
    pub fn py_contains(&self, item: &PyValue) -> Option<bool> {
        match self {
            PyValue::List(items) | PyValue::Tuple(items) | PyValue::Set(items) => {
                Some(items.iter().any(|x| x.py_eq(item)))
            }
            PyValue::Dict(entries) => Some(entries.iter().any(|(k, _)| k.py_eq(item))),
            PyValue::Str(haystack) => item.as_str().map(|needle| haystack.contains(needle)),
            _ => None,
        }
    }

    /// The values Python yields when iterating `self`: elements, dict keys,
    /// or single-character strings.
    pub fn members(&self) -> Option<Vec<PyValue>> {
        match self {
            PyValue::List(items) | PyValue::Tuple(items) | PyValue::Set(items) => {
                Some(items.clone())
            }
            PyValue::Dict(entries) => Some(entries.iter().map(|(k, _)| k.clone()).collect()),
            PyValue::Str(s) => Some(s.chars().map(|c| PyValue::Str(c.to_string())).collect()),
            _ => None,
        }
    }

    /// Render the value back to Python source.
    pub fn to_source(&self) -> String {
        match self {
            PyValue::None => "None".to_string(),
            PyValue::Bool(true) => "True".to_string(),
            PyValue::Bool(false) => "False".to_string(),
            PyValue::Int(i) => i.to_string(),
            PyValue::Float(f) => render_float(*f),
            PyValue::Str(s) => quote(s),
            PyValue::List(items) => format!("[{}]", join_sources(items)),
            PyValue::Tuple(items) if items.len() == 1 => format!("({},)", items[0].to_source()),
            PyValue::Tuple(items) => format!("({})", join_sources(items)),
            PyValue::Set(items) if items.is_empty() => "set()".to_string(),
            PyValue::Set(items) => format!("{{{}}}", join_sources(items)),
            PyValue::Dict(entries) => {
                let body: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.to_source(), v.to_source()))
                    .collect();
                format!("{{{}}}", body.join(", "))
            }
            PyValue::Name(name) => name.clone(),
            PyValue::Expr(source) => source.clone(),
        }
    }
}

impl fmt::Display for PyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

fn join_sources(items: &[PyValue]) -> String {
    items.iter().map(PyValue::to_source).collect::<Vec<_>>().join(", ")
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        "float('nan')".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "float('inf')" } else { "float('-inf')" }.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
