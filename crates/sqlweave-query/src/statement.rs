//! Statement buffer and pool.

use parking_lot::Mutex;
use sqlweave_codec::sql::format_datetime;
use sqlweave_reflect::Value;
use std::fmt;
use std::ops::Range;

/// Placeholder style of a dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placeholder {
    /// `?`
    #[default]
    Question,
    /// `$1`, `$2`, ...
    Dollar,
}

/// SQL text and its positional arguments.
///
/// [`Statement::push_arg`] is the only way to add an argument and writes the
/// placeholder in the same call, so placeholders and arguments never drift.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    sql: String,
    args: Vec<Value>,
    marks: Vec<Range<usize>>,
    placeholder: Placeholder,
}

impl Statement {
    pub fn new(placeholder: Placeholder) -> Self {
        Self {
            sql: String::with_capacity(128),
            args: Vec::new(),
            marks: Vec::new(),
            placeholder,
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Write a placeholder and bind `value` to it.
    pub fn push_arg(&mut self, value: Value) {
        let start = self.sql.len();
        match self.placeholder {
            Placeholder::Question => self.sql.push('?'),
            Placeholder::Dollar => {
                self.sql.push('$');
                self.sql.push_str(&(self.args.len() + 1).to_string());
            }
        }
        self.marks.push(start..self.sql.len());
        self.args.push(value);
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }

    /// Clear text and arguments, keeping the allocations.
    pub fn reset(&mut self) {
        self.sql.clear();
        self.args.clear();
        self.marks.clear();
    }

    /// The SQL with every argument inlined, for logs.
    pub fn to_debug_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len() + self.args.len() * 8);
        let mut last = 0;
        for (mark, arg) in self.marks.iter().zip(&self.args) {
            out.push_str(&self.sql[last..mark.start]);
            out.push_str(&format_arg(arg));
            last = mark.end;
        }
        out.push_str(&self.sql[last..]);
        out
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Quote a string literal MySQL-style.
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render an argument as a SQL literal.
pub fn format_arg(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Uint(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => quote_literal(s),
        Value::Bytes(b) => {
            let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
            format!("X'{}'", hex)
        }
        Value::Time(t) => quote_literal(&format_datetime(t)),
        Value::List(items) => items.iter().map(format_arg).collect::<Vec<_>>().join(","),
        Value::Struct(_) | Value::Map(_) => quote_literal(&format!("{:?}", v)),
    }
}

/// Reusable statements for sequential compilations.
pub struct StatementPool {
    placeholder: Placeholder,
    max_idle: usize,
    idle: Mutex<Vec<Statement>>,
}

impl StatementPool {
    pub const DEFAULT_MAX_IDLE: usize = 32;

    pub fn new(placeholder: Placeholder) -> Self {
        Self::with_max_idle(placeholder, Self::DEFAULT_MAX_IDLE)
    }

    pub fn with_max_idle(placeholder: Placeholder, max_idle: usize) -> Self {
        Self {
            placeholder,
            max_idle,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// An empty statement, reused when one is idle.
    pub fn acquire(&self) -> Statement {
        self.idle
            .lock()
            .pop()
            .unwrap_or_else(|| Statement::new(self.placeholder))
    }

    /// Reset `stmt` and keep it for reuse.
    pub fn release(&self, mut stmt: Statement) {
        stmt.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(stmt);
        }
    }

    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}
