//! Shared vocabulary types for squill.
//!
//! This is the leaf crate of the workspace: source positions ([`Span`]),
//! SQLSTATE condition codes ([`SqlState`]), and the parameterized type
//! specification model ([`TypeSpec`]) with its construction-time bounds
//! validation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Pos / Span — source location tracking
// ---------------------------------------------------------------------------

/// A line/column position in the original SQL source text.
///
/// Lines and columns are 1-based; the zero position is used as a placeholder
/// for synthesized nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Pos {
    /// Create a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source range attached to every AST node for diagnostics.
///
/// Spans are attached at node creation and never mutated afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// First position covered (inclusive).
    pub start: Pos,
    /// Last position covered (inclusive).
    pub end: Pos,
}

impl Span {
    /// A placeholder span for synthesized nodes.
    pub const ZERO: Self = Self {
        start: Pos { line: 0, column: 0 },
        end: Pos { line: 0, column: 0 },
    };

    /// Create a new span from start to end position.
    #[must_use]
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// Convenience constructor from raw line/column numbers.
    #[must_use]
    pub const fn at(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: Pos::new(line, start_col),
            end: Pos::new(line, end_col),
        }
    }

    /// Merge two spans into one that covers both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// SqlState — fixed-length condition codes
// ---------------------------------------------------------------------------

/// A five-character SQLSTATE condition code, as used by condition
/// declarations, handlers, and SIGNAL/RESIGNAL.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqlState([u8; 5]);

impl SqlState {
    /// Create a SQLSTATE from its textual form.
    ///
    /// Returns `None` unless the value is exactly five ASCII alphanumeric
    /// characters (SQLSTATE values are fixed-length by definition).
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        if bytes.len() != 5 || !bytes.iter().all(u8::is_ascii_alphanumeric) {
            return None;
        }
        let mut code = [0u8; 5];
        code.copy_from_slice(bytes);
        Some(Self(code))
    }

    /// The textual form of the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Constructor guarantees ASCII.
        std::str::from_utf8(&self.0).unwrap_or("?????")
    }

    /// The two-character SQLSTATE class (e.g. `"02"` for no-data).
    #[must_use]
    pub fn class(&self) -> &str {
        &self.as_str()[..2]
    }

    /// Whether this code is in the warning class (`01xxx`).
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.class() == "01"
    }

    /// Whether this code is in the no-data class (`02xxx`).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.class() == "02"
    }
}

impl fmt::Debug for SqlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SqlState({})", self.as_str())
    }
}

impl fmt::Display for SqlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SqlState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Type vocabulary
// ---------------------------------------------------------------------------

/// The SQL data types a [`TypeSpec`] can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SqlType {
    Char,
    Varchar,
    Clob,
    Blob,
    Binary,
    Varbinary,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    Time,
    Timestamp,
    Interval,
}

impl SqlType {
    /// The canonical keyword spelling for this type.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Clob => "CLOB",
            Self::Blob => "BLOB",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Interval => "INTERVAL",
        }
    }

    /// Whether this is a large-object type whose length may carry a unit.
    #[must_use]
    pub const fn is_lob(self) -> bool {
        matches!(self, Self::Clob | Self::Blob)
    }

    /// Whether this type stores character data (and so may carry an
    /// explicit character set).
    #[must_use]
    pub const fn is_character(self) -> bool {
        matches!(self, Self::Char | Self::Varchar | Self::Clob)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Unit of measure for a large-object length parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LengthUnit {
    /// No unit: the length is in code units directly.
    #[default]
    None,
    /// `K` — multiples of 1,024.
    Kilo,
    /// `M` — multiples of 1,048,576.
    Mega,
    /// `G` — multiples of 1,073,741,824.
    Giga,
}

impl LengthUnit {
    /// The multiplier this unit applies to the declared length.
    #[must_use]
    pub const fn multiplier(self) -> u64 {
        match self {
            Self::None => 1,
            Self::Kilo => 1 << 10,
            Self::Mega => 1 << 20,
            Self::Giga => 1 << 30,
        }
    }

    /// The suffix as written in SQL, empty for [`LengthUnit::None`].
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Kilo => "K",
            Self::Mega => "M",
            Self::Giga => "G",
        }
    }
}

/// A character set a character type can be declared with.
///
/// The code-unit width feeds the large-object bounds table: a double-byte
/// set halves the maximum declarable character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CharSet {
    /// 7-bit ASCII (single-byte).
    Ascii,
    /// ISO-8859-1 (single-byte).
    Latin1,
    /// UCS-2 (double-byte).
    Ucs2,
    /// UTF-16 (double-byte code units).
    Utf16,
}

impl CharSet {
    /// Bytes per code unit.
    #[must_use]
    pub const fn code_unit_width(self) -> u64 {
        match self {
            Self::Ascii | Self::Latin1 => 1,
            Self::Ucs2 | Self::Utf16 => 2,
        }
    }

    /// The character set name as written in SQL.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Latin1 => "LATIN1",
            Self::Ucs2 => "UCS2",
            Self::Utf16 => "UTF16",
        }
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An explicit storage format on a character type.
///
/// Mutually exclusive with an explicit [`CharSet`]: `FOR BIT DATA` bypasses
/// character-set semantics entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StorageFormat {
    /// `FOR BIT DATA` — store the value as uninterpreted bytes.
    BitData,
}

impl StorageFormat {
    /// The clause as written in SQL.
    #[must_use]
    pub const fn clause(self) -> &'static str {
        match self {
            Self::BitData => "FOR BIT DATA",
        }
    }
}

// ---------------------------------------------------------------------------
// Bounds table
// ---------------------------------------------------------------------------

/// Maximum large-object capacity in single-byte code units: 2^31 - 1.
pub const LOB_CAPACITY: u64 = 2_147_483_647;

/// Maximum length of a CHAR column.
pub const CHAR_MAX: u64 = 254;

/// Maximum length of a VARCHAR / VARBINARY column.
pub const VARCHAR_MAX: u64 = 32_672;

/// Maximum DECIMAL precision.
pub const DECIMAL_MAX_PRECISION: u32 = 38;

/// Inclusive (min, max) bounds for a declared length, keyed by type, unit,
/// and character set.
///
/// Returns `None` for types that do not take a length parameter.
#[must_use]
pub fn length_bounds(ty: SqlType, unit: LengthUnit, charset: Option<CharSet>) -> Option<(u64, u64)> {
    let width = charset.map_or(1, CharSet::code_unit_width);
    match ty {
        SqlType::Char | SqlType::Binary => Some((1, CHAR_MAX)),
        SqlType::Varchar | SqlType::Varbinary => Some((1, VARCHAR_MAX)),
        SqlType::Clob => Some((1, LOB_CAPACITY / width / unit.multiplier())),
        SqlType::Blob => Some((1, LOB_CAPACITY / unit.multiplier())),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// TypeSpec — validated parameterized type specifications
// ---------------------------------------------------------------------------

/// Errors raised when constructing a [`TypeSpec`].
///
/// These are the construction-time failures of the bounds validator; the AST
/// layer wraps them with the span of the offending specification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeSpecError {
    /// The declared length falls outside the bounds table entry.
    #[error("length {value}{unit} out of range for {ty} (must be between {min} and {max})",
            unit = .unit.suffix())]
    LengthOutOfRange {
        ty: SqlType,
        value: u64,
        unit: LengthUnit,
        min: u64,
        max: u64,
    },

    /// A length of zero is invalid regardless of unit.
    #[error("length 0 is not valid for {ty}")]
    ZeroLength { ty: SqlType },

    /// The type does not take a length parameter.
    #[error("{ty} does not take a length parameter")]
    LengthNotAllowed { ty: SqlType },

    /// A length unit was given on a type that does not accept one.
    #[error("length unit '{unit}' is not valid for {ty}", unit = .unit.suffix())]
    UnitNotAllowed { ty: SqlType, unit: LengthUnit },

    /// A character set was given on a non-character type.
    #[error("{ty} cannot be declared with a character set")]
    CharSetNotAllowed { ty: SqlType },

    /// An explicit character set and an explicit storage format cannot
    /// co-occur on one specification.
    #[error("CHARACTER SET {charset} cannot be combined with {clause}",
            clause = .storage.clause())]
    ConflictingOptions {
        charset: CharSet,
        storage: StorageFormat,
    },

    /// DECIMAL precision outside 1..=38.
    #[error("precision {value} out of range (must be between 1 and {max})",
            max = DECIMAL_MAX_PRECISION)]
    PrecisionOutOfRange { value: u32 },

    /// DECIMAL scale larger than its precision.
    #[error("scale {scale} exceeds precision {precision}")]
    ScaleExceedsPrecision { scale: u32, precision: u32 },
}

/// A validated, parameterized type specification.
///
/// Instances can only be created through the checked constructors, so a
/// `TypeSpec` in hand always satisfies the bounds table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeSpec {
    ty: SqlType,
    length: Option<u64>,
    unit: LengthUnit,
    charset: Option<CharSet>,
    storage: Option<StorageFormat>,
    precision: Option<u32>,
    scale: Option<u32>,
}

impl TypeSpec {
    /// A type with no parameters (INTEGER, DATE, BOOLEAN, ...).
    #[must_use]
    pub const fn simple(ty: SqlType) -> Self {
        Self {
            ty,
            length: None,
            unit: LengthUnit::None,
            charset: None,
            storage: None,
            precision: None,
            scale: None,
        }
    }

    /// A character or binary type with a plain length: `CHAR(n)`,
    /// `VARCHAR(n)`, `BINARY(n)`, `VARBINARY(n)`.
    pub fn with_length(ty: SqlType, length: u64) -> Result<Self, TypeSpecError> {
        Self::build(ty, Some(length), LengthUnit::None, None, None)
    }

    /// A character large object: `CLOB(n [K|M|G]) [CHARACTER SET cs]`.
    pub fn clob(
        length: u64,
        unit: LengthUnit,
        charset: Option<CharSet>,
    ) -> Result<Self, TypeSpecError> {
        Self::build(SqlType::Clob, Some(length), unit, charset, None)
    }

    /// A binary large object: `BLOB(n [K|M|G])`.
    pub fn blob(length: u64, unit: LengthUnit) -> Result<Self, TypeSpecError> {
        Self::build(SqlType::Blob, Some(length), unit, None, None)
    }

    /// A character type with explicit options. This is the general entry
    /// point the parser uses; it enforces the mutual-exclusion rule between
    /// character set and storage format.
    pub fn character(
        ty: SqlType,
        length: u64,
        unit: LengthUnit,
        charset: Option<CharSet>,
        storage: Option<StorageFormat>,
    ) -> Result<Self, TypeSpecError> {
        Self::build(ty, Some(length), unit, charset, storage)
    }

    /// A DECIMAL with precision and scale.
    pub fn decimal(precision: u32, scale: u32) -> Result<Self, TypeSpecError> {
        if precision == 0 || precision > DECIMAL_MAX_PRECISION {
            return Err(TypeSpecError::PrecisionOutOfRange { value: precision });
        }
        if scale > precision {
            return Err(TypeSpecError::ScaleExceedsPrecision { scale, precision });
        }
        Ok(Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::simple(SqlType::Decimal)
        })
    }

    fn build(
        ty: SqlType,
        length: Option<u64>,
        unit: LengthUnit,
        charset: Option<CharSet>,
        storage: Option<StorageFormat>,
    ) -> Result<Self, TypeSpecError> {
        if let (Some(cs), Some(sf)) = (charset, storage) {
            return Err(TypeSpecError::ConflictingOptions {
                charset: cs,
                storage: sf,
            });
        }
        if charset.is_some() && !ty.is_character() {
            return Err(TypeSpecError::CharSetNotAllowed { ty });
        }
        if unit != LengthUnit::None && !ty.is_lob() {
            return Err(TypeSpecError::UnitNotAllowed { ty, unit });
        }
        if let Some(value) = length {
            let Some((min, max)) = length_bounds(ty, unit, charset) else {
                return Err(TypeSpecError::LengthNotAllowed { ty });
            };
            if value == 0 {
                return Err(TypeSpecError::ZeroLength { ty });
            }
            if value < min || value > max {
                return Err(TypeSpecError::LengthOutOfRange {
                    ty,
                    value,
                    unit,
                    min,
                    max,
                });
            }
        }
        Ok(Self {
            ty,
            length,
            unit,
            charset,
            storage,
            precision: None,
            scale: None,
        })
    }

    /// The underlying SQL type.
    #[must_use]
    pub const fn sql_type(&self) -> SqlType {
        self.ty
    }

    /// The declared length parameter, if any.
    #[must_use]
    pub const fn length(&self) -> Option<u64> {
        self.length
    }

    /// The length unit (meaningful only when a length is present).
    #[must_use]
    pub const fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// The explicit character set, if any.
    #[must_use]
    pub const fn charset(&self) -> Option<CharSet> {
        self.charset
    }

    /// The explicit storage format, if any.
    #[must_use]
    pub const fn storage(&self) -> Option<StorageFormat> {
        self.storage
    }

    /// DECIMAL precision and scale, if this is a DECIMAL spec.
    #[must_use]
    pub const fn precision_scale(&self) -> Option<(u32, u32)> {
        match (self.precision, self.scale) {
            (Some(p), Some(s)) => Some((p, s)),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.keyword())?;
        if let Some(len) = self.length {
            write!(f, "({len}{})", self.unit.suffix())?;
        }
        if let Some((p, s)) = self.precision_scale() {
            write!(f, "({p}, {s})")?;
        }
        if let Some(cs) = self.charset {
            write!(f, " CHARACTER SET {cs}")?;
        }
        if let Some(sf) = self.storage {
            write!(f, " {}", sf.clause())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
