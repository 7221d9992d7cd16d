use std::fmt;

/// An unsigned fraction as stored by the `RATIONAL` type.
///
/// A zero denominator is kept as is; conversions then produce an infinite or NaN float and it is
/// up to the caller to decide what that means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator.
    pub numerator: u32,
    /// Denominator.
    pub denominator: u32,
}

impl Rational {
    /// Create a new fraction.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Swap numerator and denominator.
    pub fn reciprocal(&self) -> Self {
        Self::new(self.denominator, self.numerator)
    }

    /// Convert to `f32`.
    pub fn to_f32(&self) -> f32 {
        self.numerator as f32 / self.denominator as f32
    }

    /// Convert to `f64`.
    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// The integer part of the fraction, or `None` when the denominator is zero.
    pub fn to_integer(&self) -> Option<u32> {
        self.numerator.checked_div(self.denominator)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A signed fraction as stored by the `SRATIONAL` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SRational {
    /// Numerator.
    pub numerator: i32,
    /// Denominator.
    pub denominator: i32,
}

impl SRational {
    /// Create a new fraction.
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Swap numerator and denominator.
    pub fn reciprocal(&self) -> Self {
        Self::new(self.denominator, self.numerator)
    }

    /// Convert to `f32`.
    pub fn to_f32(&self) -> f32 {
        self.numerator as f32 / self.denominator as f32
    }

    /// Convert to `f64`.
    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// The integer part of the fraction, or `None` when the denominator is zero.
    pub fn to_integer(&self) -> Option<i32> {
        self.numerator.checked_div(self.denominator)
    }
}

impl fmt::Display for SRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A decoded directory entry value.
///
/// Entries holding a single element decode to the scalar variant, entries with several elements to
/// [`Value::List`]. ASCII entries may hold several NUL-terminated strings; each becomes one
/// [`Value::Ascii`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// `BYTE` or `UNDEFINED`.
    Byte(u8),
    /// `SBYTE`.
    SignedByte(i8),
    /// `SHORT`.
    Short(u16),
    /// `SSHORT`.
    SignedShort(i16),
    /// `LONG`.
    Unsigned(u32),
    /// `SLONG`.
    Signed(i32),
    /// `FLOAT`.
    Float(f32),
    /// `DOUBLE`.
    Double(f64),
    /// `RATIONAL`.
    Rational(Rational),
    /// `SRATIONAL`.
    SRational(SRational),
    /// `ASCII`.
    Ascii(String),
    /// Several elements.
    List(Vec<Value>),
}

impl Value {
    /// The first element: the value itself for scalars, the head of a list otherwise.
    pub fn first(&self) -> Option<&Value> {
        match self {
            Value::List(values) => values.first(),
            value => Some(value),
        }
    }

    /// All elements as a slice-like iterator.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        let values = match self {
            Value::List(values) => values.as_slice(),
            value => std::slice::from_ref(value),
        };
        values.iter()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Value::List(values) => values.len(),
            _ => 1,
        }
    }

    /// Returns `true` for an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first element as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self.first()? {
            Value::Ascii(s) => Some(s),
            _ => None,
        }
    }

    /// The first element as an unsigned fraction, if it is one.
    pub fn as_rational(&self) -> Option<Rational> {
        match self.first()? {
            Value::Rational(r) => Some(*r),
            _ => None,
        }
    }

    /// All elements as unsigned fractions. `None` if any element is of another type.
    pub fn to_rationals(&self) -> Option<Vec<Rational>> {
        self.iter()
            .map(|value| match value {
                Value::Rational(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// The first element widened to `i64`, for any integer type.
    pub fn as_i64(&self) -> Option<i64> {
        match *self.first()? {
            Value::Byte(v) => Some(v.into()),
            Value::SignedByte(v) => Some(v.into()),
            Value::Short(v) => Some(v.into()),
            Value::SignedShort(v) => Some(v.into()),
            Value::Unsigned(v) => Some(v.into()),
            Value::Signed(v) => Some(v.into()),
            _ => None,
        }
    }

    /// The first element as `f64`, for any numeric type.
    pub fn as_f64(&self) -> Option<f64> {
        match *self.first()? {
            Value::Float(v) => Some(v.into()),
            Value::Double(v) => Some(v),
            Value::Rational(r) => Some(r.to_f64()),
            Value::SRational(r) => Some(r.to_f64()),
            _ => self.as_i64().map(|v| v as f64),
        }
    }
}
