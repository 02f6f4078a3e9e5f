//! Message and line formatting
//!
//! A line looks like
//! `[app] [I] [2024/05/01 10:30:45.123456] [src/main.rs:42] message`.
//! The `[app] ` segment is omitted when no application name is configured.

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::fmt::{self, Write as _};
use std::iter::Peekable;
use std::panic::Location;
use std::str::Chars;

/// Timestamp layout used in every line (local time, microsecond precision).
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// Frames above the public logging method that the call site is taken from.
///
/// Every public entry point is `#[track_caller]`, so the location handed to a
/// [`CallerLocator`] is always that of the code calling the logger.
pub const CALLER_FRAME_DEPTH: usize = 1;

/// An argument to a templated log call.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Char(char),
}

impl Value {
    fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Uint(_) | Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Uint(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! impl_value_from {
    ($variant:ident, $target:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )+
    };
}

impl_value_from!(Int, i64: i8, i16, i32, i64, isize);
impl_value_from!(Uint, u64: u8, u16, u32, u64, usize);
impl_value_from!(Float, f64: f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

/// Build the message part of a line.
///
/// - no arguments: the template is returned verbatim
/// - non-empty template: printf-style substitution (`%s %v %d %f %x %X %t %q %c %%`)
/// - empty template and a single string argument: that string verbatim
/// - otherwise the arguments are concatenated, with a single space between two
///   neighbours when neither of them is a string
///
/// ```
/// use rust_leveled_logger::core::formatter::{format_message, Value};
///
/// assert_eq!(format_message("%s-%d", &["a".into(), 3.into()]), "a-3");
/// assert_eq!(format_message("", &["a".into(), "b".into()]), "ab");
/// assert_eq!(format_message("", &[Value::Int(1), Value::Int(2)]), "1 2");
/// ```
pub fn format_message(template: &str, args: &[Value]) -> String {
    if args.is_empty() {
        return template.to_string();
    }
    if template.is_empty() {
        if let [Value::Str(s)] = args {
            return s.clone();
        }
        return concat(args);
    }
    sprintf(template, args)
}

fn concat(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !arg.is_str() && !args[i - 1].is_str() {
            out.push(' ');
        }
        let _ = write!(out, "{}", arg);
    }
    out
}

/// Largest accepted width or precision.
const MAX_WIDTH: usize = 1_000_000;

#[derive(Debug, Default)]
struct Directive {
    left: bool,
    zero: bool,
    plus: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

fn sprintf(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut chars = template.chars().peekable();
    let mut next = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut directive = Directive::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => directive.left = true,
                '0' => directive.zero = true,
                '+' => directive.plus = true,
                _ => break,
            }
            chars.next();
        }
        if chars.peek().is_some_and(char::is_ascii_digit) {
            match parse_number(&mut chars) {
                Some(width) => directive.width = Some(width),
                None => out.push_str("%!(BADWIDTH)"),
            }
        }
        if chars.peek() == Some(&'.') {
            chars.next();
            match parse_number(&mut chars) {
                Some(precision) => directive.precision = Some(precision),
                None => out.push_str("%!(BADPREC)"),
            }
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next) {
            Some(arg) => {
                next += 1;
                let rendered = render(arg, verb, &directive);
                pad(&mut out, &rendered, &directive, arg.is_numeric());
            }
            None => {
                let _ = write!(out, "%!{}(MISSING)", verb);
            }
        }
    }

    if next < args.len() {
        out.push_str("%!(EXTRA ");
        for (i, arg) in args[next..].iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", arg);
        }
        out.push(')');
    }
    out
}

/// Consume a run of digits. `None` when the value exceeds [`MAX_WIDTH`].
fn parse_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut value = Some(0usize);
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        value = value
            .and_then(|v| v.checked_mul(10))
            .and_then(|v| v.checked_add(d as usize))
            .filter(|v| *v <= MAX_WIDTH);
    }
    value
}

fn render(arg: &Value, verb: char, directive: &Directive) -> String {
    let signed = |s: String, negative: bool| {
        if directive.plus && !negative {
            format!("+{}", s)
        } else {
            s
        }
    };

    match (verb, arg) {
        ('s' | 'v', Value::Str(s)) => match directive.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.clone(),
        },
        ('v', Value::Float(v)) => match directive.precision {
            Some(p) => signed(format!("{:.*}", p, v), *v < 0.0),
            None => signed(v.to_string(), *v < 0.0),
        },
        ('s' | 'v', other) => other.to_string(),
        ('d', Value::Int(v)) => signed(v.to_string(), *v < 0),
        ('d', Value::Uint(v)) => signed(v.to_string(), false),
        ('d', Value::Char(c)) => (*c as u32).to_string(),
        ('f' | 'F', Value::Float(v)) => signed(format!("{:.*}", directive.precision.unwrap_or(6), v), *v < 0.0),
        ('f' | 'F', Value::Int(v)) => signed(format!("{:.*}", directive.precision.unwrap_or(6), *v as f64), *v < 0),
        ('f' | 'F', Value::Uint(v)) => signed(format!("{:.*}", directive.precision.unwrap_or(6), *v as f64), false),
        ('x', Value::Int(v)) if *v < 0 => format!("-{:x}", v.unsigned_abs()),
        ('x', Value::Int(v)) => format!("{:x}", v),
        ('x', Value::Uint(v)) => format!("{:x}", v),
        ('X', Value::Int(v)) if *v < 0 => format!("-{:X}", v.unsigned_abs()),
        ('X', Value::Int(v)) => format!("{:X}", v),
        ('X', Value::Uint(v)) => format!("{:X}", v),
        ('x', Value::Str(s)) => s.bytes().map(|b| format!("{:02x}", b)).collect(),
        ('X', Value::Str(s)) => s.bytes().map(|b| format!("{:02X}", b)).collect(),
        ('t', Value::Bool(v)) => v.to_string(),
        ('q', Value::Str(s)) => format!("{:?}", s),
        ('q', Value::Char(c)) => format!("{:?}", c),
        ('c', Value::Char(c)) => c.to_string(),
        ('c', Value::Int(v)) => u32::try_from(*v)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string(),
        ('c', Value::Uint(v)) => u32::try_from(*v)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string(),
        (verb, other) => format!("%!{}({})", verb, other),
    }
}

fn pad(out: &mut String, rendered: &str, directive: &Directive, numeric: bool) {
    let len = rendered.chars().count();
    let fill = directive.width.unwrap_or(0).saturating_sub(len);
    if fill == 0 {
        out.push_str(rendered);
        return;
    }

    if directive.left {
        out.push_str(rendered);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if directive.zero && numeric {
        let (sign, digits) = match rendered.chars().next() {
            Some(c @ ('-' | '+')) => (Some(c), &rendered[1..]),
            _ => (None, rendered),
        };
        if let Some(sign) = sign {
            out.push(sign);
        }
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(rendered);
    }
}

/// Source position of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Resolves the call site of a logging call.
///
/// Returning `None` drops the record without surfacing an error to the caller.
pub trait CallerLocator: Send + Sync {
    fn locate(&self, origin: &'static Location<'static>) -> Option<CallSite>;
}

/// Default locator: trusts the location produced by `#[track_caller]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackCallerLocator;

impl CallerLocator for TrackCallerLocator {
    fn locate(&self, origin: &'static Location<'static>) -> Option<CallSite> {
        Some(CallSite {
            file: origin.file(),
            line: origin.line(),
        })
    }
}

/// Writes complete lines for one application.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {
    app_name: String,
}

impl LineFormatter {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Append one line, newline included, to `buf`.
    pub fn write_line(
        &self,
        buf: &mut String,
        level: LogLevel,
        timestamp: &DateTime<Local>,
        site: &CallSite,
        message: &str,
    ) {
        if !self.app_name.is_empty() {
            buf.push('[');
            buf.push_str(&self.app_name);
            buf.push_str("] ");
        }
        let _ = write!(
            buf,
            "{} [{}] [{}] {}",
            level.prefix(),
            timestamp.format(TIMESTAMP_FORMAT),
            site,
            message
        );
        buf.push('\n');
    }

    pub fn format_line(
        &self,
        level: LogLevel,
        timestamp: &DateTime<Local>,
        site: &CallSite,
        message: &str,
    ) -> String {
        let mut line = String::with_capacity(64 + message.len());
        self.write_line(&mut line, level, timestamp, site, message);
        line
    }
}
