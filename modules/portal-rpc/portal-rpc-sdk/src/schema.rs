//! Schema layer: validating readers over `serde_json::Value`.
//!
//! Every model and procedure input implements [`Schema`]. Parsing never stops
//! at the first problem; all violations are collected with their field path
//! (`memberId`, `serviceClasses[1].code`, `$` for the root value).

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use portal_errors::ValidationViolation;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Claims search range dates, e.g. `01-31-2024`.
pub const CLAIM_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month]-[day]-[year]");

/// ISO calendar dates, e.g. `2024-01-31`.
pub const ISO_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Path used for violations on the root value.
pub const ROOT: &str = "$";

pub type Violations = Vec<ValidationViolation>;

/// A shape that can be validated out of untyped JSON.
pub trait Schema: Sized {
    /// Parse `value`, reporting violations relative to `path` (empty for root).
    ///
    /// # Errors
    /// Every violation found, never empty.
    fn parse_at(value: &Value, path: &str) -> Result<Self, Violations>;

    /// # Errors
    /// Every violation found, never empty.
    fn parse(value: &Value) -> Result<Self, Violations> {
        Self::parse_at(value, "")
    }
}

/// Validate a top-level JSON array of `T`.
///
/// # Errors
/// `$` when the value is not an array, otherwise per-element violations.
pub fn parse_list<T: Schema>(value: &Value) -> Result<Vec<T>, Violations> {
    let Some(items) = value.as_array() else {
        return Err(vec![violation(ROOT, "expected an array", "type")]);
    };
    collect_items(items, "")
}

fn collect_items<T: Schema>(items: &[Value], path: &str) -> Result<Vec<T>, Violations> {
    let mut out = Vec::with_capacity(items.len());
    let mut violations = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match T::parse_at(item, &format!("{path}[{i}]")) {
            Ok(v) => out.push(v),
            Err(mut errs) => violations.append(&mut errs),
        }
    }
    if violations.is_empty() {
        Ok(out)
    } else {
        Err(violations)
    }
}

fn violation(field: &str, message: impl Into<String>, code: &str) -> ValidationViolation {
    ValidationViolation::new(field, message).with_code(code)
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_owned()
    } else {
        format!("{path}.{name}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field reader over one JSON object.
///
/// Each accessor returns `Some` on success and records a violation otherwise;
/// [`Fields::finish`] turns the collected state into a `Result`.
pub struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    path: String,
    violations: Violations,
}

impl<'a> Fields<'a> {
    pub fn new(value: &'a Value, path: &str) -> Self {
        let mut violations = Vec::new();
        let object = value.as_object();
        if object.is_none() {
            let field = if path.is_empty() { ROOT } else { path };
            violations.push(violation(
                field,
                format!("expected an object, found {}", type_name(value)),
                "type",
            ));
        }
        Self {
            object,
            path: path.to_owned(),
            violations,
        }
    }

    fn field(&self, name: &str) -> String {
        join(&self.path, name)
    }

    fn push(&mut self, name: &str, message: impl Into<String>, code: &str) {
        let field = self.field(name);
        self.violations.push(violation(&field, message, code));
    }

    /// Present and non-null value, or `None` without recording anything.
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.object?.get(name).filter(|v| !v.is_null())
    }

    fn require(&mut self, name: &str) -> Option<&'a Value> {
        // a non-object root was already reported once
        self.object?;
        let value = self.get(name);
        if value.is_none() {
            self.push(name, "is required", "required");
        }
        value
    }

    fn as_string(&mut self, name: &str, value: &Value) -> Option<String> {
        if let Some(s) = value.as_str() {
            Some(s.to_owned())
        } else {
            self.push(
                name,
                format!("expected a string, found {}", type_name(value)),
                "type",
            );
            None
        }
    }

    pub fn required_str(&mut self, name: &str) -> Option<String> {
        let value = self.require(name)?;
        self.as_string(name, value)
    }

    /// Required string, trimmed, rejected when blank.
    ///
    /// Ids become backend path segments, so `.` and `..` are refused too.
    pub fn required_id(&mut self, name: &str) -> Option<String> {
        let raw = self.required_str(name)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.push(name, "must not be blank", "blank");
            return None;
        }
        if matches!(trimmed, "." | "..") {
            self.push(name, "must not be a dot segment", "segment");
            return None;
        }
        Some(trimmed.to_owned())
    }

    pub fn optional_str(&mut self, name: &str) -> Option<String> {
        let value = self.get(name)?;
        self.as_string(name, value)
    }

    /// Optional string that is trimmed and dropped when blank.
    pub fn optional_trimmed(&mut self, name: &str) -> Option<String> {
        self.optional_str(name)
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    pub fn required_i64(&mut self, name: &str) -> Option<i64> {
        let value = self.require(name)?;
        if let Some(n) = value.as_i64() {
            Some(n)
        } else {
            self.push(
                name,
                format!("expected an integer, found {}", type_name(value)),
                "type",
            );
            None
        }
    }

    fn as_u32_in(&mut self, name: &str, value: &Value, range: &RangeInclusive<u32>) -> Option<u32> {
        let Some(n) = value.as_u64() else {
            self.push(
                name,
                format!("expected a non-negative integer, found {}", type_name(value)),
                "type",
            );
            return None;
        };
        match u32::try_from(n) {
            Ok(n) if range.contains(&n) => Some(n),
            _ => {
                self.push(
                    name,
                    format!("must be between {} and {}", range.start(), range.end()),
                    "range",
                );
                None
            }
        }
    }

    pub fn required_u32_in(&mut self, name: &str, range: RangeInclusive<u32>) -> Option<u32> {
        let value = self.require(name)?;
        self.as_u32_in(name, value, &range)
    }

    /// Optional bounded integer; `default` when absent.
    pub fn u32_in_or(&mut self, name: &str, range: RangeInclusive<u32>, default: u32) -> Option<u32> {
        match self.get(name) {
            Some(value) => self.as_u32_in(name, value, &range),
            None => Some(default),
        }
    }

    pub fn required_bool(&mut self, name: &str) -> Option<bool> {
        let value = self.require(name)?;
        self.as_bool(name, value)
    }

    /// Optional boolean, `false` when absent.
    pub fn flag(&mut self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(value) => self.as_bool(name, value),
            None => Some(false),
        }
    }

    fn as_bool(&mut self, name: &str, value: &Value) -> Option<bool> {
        if let Some(b) = value.as_bool() {
            Some(b)
        } else {
            self.push(
                name,
                format!("expected a boolean, found {}", type_name(value)),
                "type",
            );
            None
        }
    }

    fn as_decimal(&mut self, name: &str, value: &Value) -> Option<Decimal> {
        let parsed = match value {
            Value::Number(n) => {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
            }
            _ => None,
        };
        if parsed.is_none() {
            self.push(
                name,
                format!("expected a decimal number, found {}", type_name(value)),
                "type",
            );
        }
        parsed
    }

    pub fn required_decimal(&mut self, name: &str) -> Option<Decimal> {
        let value = self.require(name)?;
        self.as_decimal(name, value)
    }

    /// Optional decimal. The outer `Option` is `None` only on a violation.
    pub fn optional_decimal(&mut self, name: &str) -> Option<Option<Decimal>> {
        match self.get(name) {
            Some(value) => self.as_decimal(name, value).map(Some),
            None => Some(None),
        }
    }

    fn as_enum<T>(&mut self, name: &str, value: &Value, allowed: &[T]) -> Option<T>
    where
        T: FromStr + Display + Copy,
    {
        let raw = self.as_string(name, value)?;
        if let Ok(v) = raw.parse::<T>() {
            return Some(v);
        }
        let expected = allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.push(
            name,
            format!("unknown value '{raw}', expected one of: {expected}"),
            "enum",
        );
        None
    }

    pub fn required_enum<T>(&mut self, name: &str, allowed: &[T]) -> Option<T>
    where
        T: FromStr + Display + Copy,
    {
        let value = self.require(name)?;
        self.as_enum(name, value, allowed)
    }

    /// Optional enum; `default` when absent.
    pub fn enum_or<T>(&mut self, name: &str, allowed: &[T], default: T) -> Option<T>
    where
        T: FromStr + Display + Copy,
    {
        match self.get(name) {
            Some(value) => self.as_enum(name, value, allowed),
            None => Some(default),
        }
    }

    fn as_date(
        &mut self,
        name: &str,
        value: &Value,
        format: &[BorrowedFormatItem<'static>],
        pattern: &str,
    ) -> Option<(String, Date)> {
        let raw = self.as_string(name, value)?;
        match parse_date(&raw, format, pattern) {
            Some(date) => Some((raw, date)),
            None => {
                self.push(
                    name,
                    format!("expected a valid date in {pattern} format"),
                    "pattern",
                );
                None
            }
        }
    }

    /// Required `MM-DD-YYYY` date; returns the raw text and the parsed date.
    pub fn required_claim_date(&mut self, name: &str) -> Option<(String, Date)> {
        let value = self.require(name)?;
        self.as_date(name, value, CLAIM_DATE_FORMAT, "MM-DD-YYYY")
    }

    /// Optional `YYYY-MM-DD` date. The outer `Option` is `None` only on a violation.
    pub fn optional_iso_date(&mut self, name: &str) -> Option<Option<String>> {
        match self.get(name) {
            Some(value) => self
                .as_date(name, value, ISO_DATE_FORMAT, "YYYY-MM-DD")
                .map(|(raw, _)| Some(raw)),
            None => Some(None),
        }
    }

    pub fn required_object<T: Schema>(&mut self, name: &str) -> Option<T> {
        let value = self.require(name)?;
        self.nested(name, value)
    }

    /// Optional nested object. The outer `Option` is `None` only on a violation.
    pub fn optional_object<T: Schema>(&mut self, name: &str) -> Option<Option<T>> {
        match self.get(name) {
            Some(value) => self.nested(name, value).map(Some),
            None => Some(None),
        }
    }

    fn nested<T: Schema>(&mut self, name: &str, value: &Value) -> Option<T> {
        match T::parse_at(value, &self.field(name)) {
            Ok(v) => Some(v),
            Err(mut errs) => {
                self.violations.append(&mut errs);
                None
            }
        }
    }

    pub fn required_list<T: Schema>(&mut self, name: &str) -> Option<Vec<T>> {
        let value = self.require(name)?;
        let Some(items) = value.as_array() else {
            self.push(
                name,
                format!("expected an array, found {}", type_name(value)),
                "type",
            );
            return None;
        };
        match collect_items(items, &self.field(name)) {
            Ok(v) => Some(v),
            Err(mut errs) => {
                self.violations.append(&mut errs);
                None
            }
        }
    }

    /// Record a cross-field violation against `name`.
    pub fn reject(&mut self, name: &str, message: impl Into<String>, code: &str) {
        self.push(name, message, code);
    }

    /// Finish reading. `build` runs only when no violation was recorded.
    ///
    /// # Errors
    /// All recorded violations.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, Violations> {
        if !self.violations.is_empty() {
            return Err(self.violations);
        }
        let field = if self.path.is_empty() {
            ROOT.to_owned()
        } else {
            self.path
        };
        build().ok_or_else(|| vec![violation(&field, "incomplete value", "incomplete")])
    }
}

/// Parse a date, checking the digit layout first so that forms like
/// `1-2-2024` are rejected even where the parser would be lenient.
fn parse_date(raw: &str, format: &[BorrowedFormatItem<'static>], pattern: &str) -> Option<Date> {
    let shape_ok = raw.len() == pattern.len()
        && raw.chars().zip(pattern.chars()).all(|(c, p)| {
            if p == '-' {
                c == '-'
            } else {
                c.is_ascii_digit()
            }
        });
    if !shape_ok {
        return None;
    }
    Date::parse(raw, format).ok()
}
