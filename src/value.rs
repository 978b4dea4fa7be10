/// A runtime value. Every expression evaluates to one of these.
///
/// `NativeFunction` is the callable capability: a value with a declared
/// arity and an invocation hook. The language has no syntax for declaring
/// callables; natives registered by the host are the only inhabitants. The
/// hook reports failures as bare messages; the call site attributes them to
/// the closing-paren token's line.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    NativeFunction {
        name: String,
        arity: usize,
        func: fn(&[Value]) -> Result<Value, String>,
    },
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

impl Value {
    /// Truthiness: `nil` and numeric zero are falsy, booleans are
    /// themselves, everything else (including the empty string) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Number(n) => *n != 0.0,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::NativeFunction { name, .. } => write!(f, "<native fn {}>", name),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),
        }
    }
}
