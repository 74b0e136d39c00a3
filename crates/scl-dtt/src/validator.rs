// crates/scl-dtt/src/validator.rs
//! Validation of literal instance values against resolved attributes.

use crate::attribute::AttributeRef;
use crate::error::{Bound, DttError, ValidationReport};
use crate::library::TypeLibrary;
use crate::types::{BasicType, NumericKind, TypeKind};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use core::cmp::Ordering;
use log::trace;

/// Tolerance used when checking that a value sits on a step boundary.
const STEP_EPSILON: f64 = 1e-9;

/// Explicit numeric bounds of a setting (`minVal`, `maxVal`, `stepSize`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericRange {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Values must be whole multiples of this size. Its sign is ignored.
    pub step: Option<f64>,
}

impl NumericRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// `true` when no bound is set, so only the type's own range applies.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.step.is_none()
    }
}

fn out_of_bound(attr: &AttributeRef, value: &str, bound: Bound) -> DttError {
    DttError::OutOfBound {
        value: value.to_string(),
        bound,
        attribute: attr.to_string(),
    }
}

fn not_a_number(attr: &AttributeRef, value: &str) -> DttError {
    DttError::NotANumber {
        value: value.to_string(),
        b_type: attr.b_type,
        attribute: attr.to_string(),
    }
}

/// A parsed numeric literal. Integer kinds stay exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integer `bType`s and the codes of Dbpos and Tcmd.
    Integer(i128),
    /// FLOAT32 and FLOAT64.
    Real(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(n) => n as f64,
            Number::Real(f) => f,
        }
    }

    /// Exact ordering against a bound; integers are not rounded through `f64`.
    fn cmp_bound(&self, bound: f64) -> Option<Ordering> {
        match *self {
            Number::Real(f) => f.partial_cmp(&bound),
            Number::Integer(n) => {
                if bound.is_nan() {
                    return None;
                }
                // `as` saturates, so an out-of-range floor still orders correctly.
                let floor = bound.floor();
                let whole = floor as i128;
                Some(match n.cmp(&whole) {
                    Ordering::Equal if bound > floor => Ordering::Less,
                    other => other,
                })
            }
        }
    }

    fn is_multiple_of(&self, step: f64) -> bool {
        match *self {
            Number::Integer(n) if step.fract() == 0.0 && step < i128::MAX as f64 => {
                n % (step as i128) == 0
            }
            _ => is_whole(self.as_f64() / step),
        }
    }
}

/// `true` for an optionally signed run of ASCII digits.
fn is_integer_literal(literal: &str) -> bool {
    let digits = literal.strip_prefix(['+', '-']).unwrap_or(literal);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses an integer literal, reporting one too large for any integer type
/// as outside `min`/`max` rather than as not a number.
fn parse_integer(
    attr: &AttributeRef,
    value: &str,
    literal: &str,
    min: i128,
    max: i128,
) -> Result<i128, DttError> {
    match literal.parse::<i128>() {
        Ok(n) if n < min => Err(out_of_bound(attr, value, Bound::Min(min.to_string()))),
        Ok(n) if n > max => Err(out_of_bound(attr, value, Bound::Max(max.to_string()))),
        Ok(n) => Ok(n),
        Err(_) if is_integer_literal(literal) && literal.starts_with('-') => {
            Err(out_of_bound(attr, value, Bound::Min(min.to_string())))
        }
        Err(_) if is_integer_literal(literal) => {
            Err(out_of_bound(attr, value, Bound::Max(max.to_string())))
        }
        Err(_) => Err(not_a_number(attr, value)),
    }
}

/// Parses `value` as the numeric kind of `attr`, checking the range of the type itself.
///
/// Returns `Ok(None)` for non-numeric attributes. Dbpos and Tcmd accept their
/// symbolic names as well as their codes.
pub fn parse_number(attr: &AttributeRef, value: &str) -> Result<Option<Number>, DttError> {
    let Some(kind) = attr.b_type.numeric_kind() else {
        return Ok(None);
    };
    let literal = value.trim();
    let number = match kind {
        NumericKind::Integer { min, max } => {
            Number::Integer(parse_integer(attr, value, literal, min, max)?)
        }
        NumericKind::Float32 | NumericKind::Float64 => {
            let f: f64 = literal.parse().map_err(|_| not_a_number(attr, value))?;
            if !f.is_finite() {
                return Err(not_a_number(attr, value));
            }
            let limit = f32::MAX as f64;
            if kind == NumericKind::Float32 && f > limit {
                return Err(out_of_bound(attr, value, Bound::Max(format!("{}", f32::MAX))));
            }
            if kind == NumericKind::Float32 && f < -limit {
                return Err(out_of_bound(attr, value, Bound::Min(format!("{}", f32::MIN))));
            }
            Number::Real(f)
        }
        NumericKind::Coded(names) => match names.iter().position(|n| *n == literal) {
            Some(code) => Number::Integer(code as i128),
            None => {
                let max = (names.len() - 1) as i128;
                Number::Integer(parse_integer(attr, value, literal, 0, max)?)
            }
        },
    };
    Ok(Some(number))
}

/// Like `parse_number`, widened to `f64`.
pub fn parse_numeric(attr: &AttributeRef, value: &str) -> Result<Option<f64>, DttError> {
    Ok(parse_number(attr, value)?.map(|n| n.as_f64()))
}

/// Enum-membership and numeric checks over one `TypeLibrary`.
#[derive(Debug, Clone, Copy)]
pub struct ValueValidator<'a> {
    library: &'a TypeLibrary,
}

impl<'a> ValueValidator<'a> {
    pub fn new(library: &'a TypeLibrary) -> Self {
        Self { library }
    }

    /// Checks `value` against the attribute's EnumType or numeric kind.
    ///
    /// A missing EnumType is `NotFoundInTypeLibrary`, which callers must treat as fatal.
    pub fn check(&self, attr: &AttributeRef, value: &str) -> Result<(), DttError> {
        if let Some(enum_id) = attr.enum_type_id() {
            let enum_type = self.library.require_enum_type(enum_id)?;
            if !enum_type.contains(value) {
                return Err(DttError::UnknownEnumValue {
                    value: value.to_string(),
                    enum_id: enum_id.to_string(),
                    attribute: attr.to_string(),
                });
            }
            return Ok(());
        }
        if attr.b_type == BasicType::Enum {
            return Err(DttError::MissingTypeId {
                kind: TypeKind::EnumType,
                attribute: attr.to_string(),
            });
        }
        parse_numeric(attr, value).map(|_| ())
    }

    /// Like `check`, then checks a numeric value against `range`.
    pub fn check_in_range(
        &self,
        attr: &AttributeRef,
        value: &str,
        range: &NumericRange,
    ) -> Result<(), DttError> {
        self.check(attr, value)?;
        if range.is_unbounded() {
            return Ok(());
        }
        let Some(number) = parse_number(attr, value)? else {
            return Ok(());
        };
        if let Some(min) = range.min {
            if number.cmp_bound(min) == Some(Ordering::Less) {
                return Err(out_of_bound(attr, value, Bound::Min(format!("{}", min))));
            }
        }
        if let Some(max) = range.max {
            if number.cmp_bound(max) == Some(Ordering::Greater) {
                return Err(out_of_bound(attr, value, Bound::Max(format!("{}", max))));
            }
        }
        // Steps are counted from zero, not from `min`.
        if let Some(step) = range.step.map(f64::abs).filter(|s| *s > 0.0) {
            if !number.is_multiple_of(step) {
                return Err(out_of_bound(attr, value, Bound::Step(format!("{}", step))));
            }
        }
        Ok(())
    }

    /// Checks every setting-group value of an attribute.
    ///
    /// Value errors are collected; a missing type aborts with `Err`.
    pub fn check_values(
        &self,
        attr: &AttributeRef,
        values: &BTreeMap<u32, String>,
        range: Option<&NumericRange>,
    ) -> Result<ValidationReport, DttError> {
        let mut report = ValidationReport::new();
        for (s_group, value) in values {
            trace!("Checking {} (sGroup {}) = '{}'", attr, s_group, value);
            let result = match range {
                Some(range) => self.check_in_range(attr, value, range),
                None => self.check(attr, value),
            };
            collect(&mut report, result)?;
        }
        Ok(report)
    }

    /// Checks a batch of (attribute, value) pairs, collecting every value error.
    pub fn check_batch<'b, I>(&self, items: I) -> Result<ValidationReport, DttError>
    where
        I: IntoIterator<Item = (&'b AttributeRef, &'b str)>,
    {
        let mut report = ValidationReport::new();
        for (attr, value) in items {
            collect(&mut report, self.check(attr, value))?;
        }
        Ok(report)
    }
}

/// `true` when `x` is an integer up to `STEP_EPSILON`, relative to its magnitude.
fn is_whole(x: f64) -> bool {
    let magnitude = if x < 0.0 { -x } else { x };
    let nearest = (if x < 0.0 { (x - 0.5) as i128 } else { (x + 0.5) as i128 }) as f64;
    let diff = if x > nearest { x - nearest } else { nearest - x };
    diff <= STEP_EPSILON * magnitude.max(1.0)
}

fn collect(report: &mut ValidationReport, result: Result<(), DttError>) -> Result<(), DttError> {
    match result {
        Err(e) if !e.is_value_error() => Err(e),
        other => {
            report.record(other);
            Ok(())
        }
    }
}
