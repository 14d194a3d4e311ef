//! Record-side traits
//!
//! A record type implements [`SheetRecord`]: it declares its schema and
//! exposes get/set access by field key. [`FieldValue`] converts individual
//! Rust field types to and from [`CellValue`].
//!
//! ```
//! use sheetmap::{CellValue, FieldBinding, FieldValue, RecordSchema, SheetError, SheetRecord, SheetResult};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! impl SheetRecord for Person {
//!     fn schema() -> RecordSchema {
//!         RecordSchema::new()
//!             .field(FieldBinding::of::<String>("name").with_column_name("Name").with_order(0))
//!             .field(FieldBinding::of::<i32>("age").with_column_name("Age").with_order(1))
//!     }
//!
//!     fn field(&self, key: &str) -> SheetResult<CellValue> {
//!         match key {
//!             "name" => Ok(self.name.to_cell_value()),
//!             "age" => Ok(self.age.to_cell_value()),
//!             _ => Err(SheetError::UnknownField(key.to_string())),
//!         }
//!     }
//!
//!     fn set_field(&mut self, key: &str, value: CellValue) -> SheetResult<()> {
//!         match key {
//!             "name" => self.name = FieldValue::from_cell_value(value)?,
//!             "age" => self.age = FieldValue::from_cell_value(value)?,
//!             _ => return Err(SheetError::UnknownField(key.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::codec;
use crate::error::{ConversionError, SheetResult};
use crate::schema::RecordSchema;
use crate::types::{CellValue, ValueType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

/// A record type that can be projected to and from sheet rows
pub trait SheetRecord: Default {
    /// Declared schema; resolved again on every export/import call
    fn schema() -> RecordSchema;

    /// Read a field by key. Errors here abort an export.
    fn field(&self, key: &str) -> SheetResult<CellValue>;

    /// Assign a decoded value; an empty cell arrives as [`CellValue::Null`].
    /// A [`ConversionError`] leaves the field at its default during import;
    /// any other error aborts it.
    fn set_field(&mut self, key: &str, value: CellValue) -> SheetResult<()>;
}

/// Conversion between a Rust field type and [`CellValue`]
///
/// [`CellValue::Null`] converts to the type's default value (`None` for
/// `Option<T>`).
pub trait FieldValue: Sized {
    /// Type the codec decodes into for this field
    const VALUE_TYPE: ValueType;

    fn to_cell_value(&self) -> CellValue;

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError>;
}

fn mismatch(value: &CellValue, target: ValueType) -> ConversionError {
    ConversionError::new(
        codec::encode(value).raw,
        target,
        format!("expected {} value, got {}", target, value.type_name()),
    )
}

macro_rules! impl_integer_field {
    ($($ty:ty),+) => {
        $(
            impl FieldValue for $ty {
                const VALUE_TYPE: ValueType = ValueType::Integer;

                fn to_cell_value(&self) -> CellValue {
                    CellValue::Int(i64::from(*self))
                }

                fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
                    match value {
                        CellValue::Null => Ok(<$ty>::default()),
                        CellValue::Int(i) => <$ty>::try_from(i).map_err(|e| {
                            ConversionError::new(i.to_string(), Self::VALUE_TYPE, e.to_string())
                        }),
                        other => Err(mismatch(&other, Self::VALUE_TYPE)),
                    }
                }
            }
        )+
    };
}

impl_integer_field!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for u64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn to_cell_value(&self) -> CellValue {
        // Values above i64::MAX do not fit an integer cell value
        match i64::try_from(*self) {
            Ok(i) => CellValue::Int(i),
            Err(_) => CellValue::Decimal(Decimal::from(*self)),
        }
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(0),
            CellValue::Int(i) => u64::try_from(i)
                .map_err(|e| ConversionError::new(i.to_string(), Self::VALUE_TYPE, e.to_string())),
            CellValue::Decimal(d) if d.fract().is_zero() => u64::try_from(d)
                .map_err(|e| ConversionError::new(d.to_string(), Self::VALUE_TYPE, e.to_string())),
            other => Err(mismatch(&other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldValue for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn to_cell_value(&self) -> CellValue {
        CellValue::Float(*self)
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(0.0),
            CellValue::Float(f) => Ok(f),
            CellValue::Int(i) => Ok(i as f64),
            other => Err(mismatch(&other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldValue for f32 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn to_cell_value(&self) -> CellValue {
        CellValue::Float(f64::from(*self))
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        f64::from_cell_value(value).map(|f| f as f32)
    }
}

impl FieldValue for Decimal {
    const VALUE_TYPE: ValueType = ValueType::Decimal;

    fn to_cell_value(&self) -> CellValue {
        CellValue::Decimal(*self)
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(Decimal::ZERO),
            CellValue::Decimal(d) => Ok(d),
            CellValue::Int(i) => Ok(Decimal::from(i)),
            other => Err(mismatch(&other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldValue for bool {
    const VALUE_TYPE: ValueType = ValueType::Boolean;

    fn to_cell_value(&self) -> CellValue {
        CellValue::Bool(*self)
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(false),
            CellValue::Bool(b) => Ok(b),
            other => Err(mismatch(&other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldValue for String {
    const VALUE_TYPE: ValueType = ValueType::Text;

    fn to_cell_value(&self) -> CellValue {
        CellValue::Text(self.clone())
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(String::new()),
            CellValue::Text(s) => Ok(s),
            other => Err(mismatch(&other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldValue for NaiveDate {
    const VALUE_TYPE: ValueType = ValueType::Date;

    fn to_cell_value(&self) -> CellValue {
        CellValue::Date(*self)
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(NaiveDate::default()),
            CellValue::Date(d) => Ok(d),
            CellValue::DateTime(dt) => Ok(dt.date_naive()),
            other => Err(mismatch(&other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    const VALUE_TYPE: ValueType = ValueType::DateTime;

    fn to_cell_value(&self) -> CellValue {
        CellValue::DateTime(*self)
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(DateTime::<Utc>::default()),
            CellValue::DateTime(dt) => Ok(dt),
            CellValue::Date(d) => Ok(d.and_time(chrono::NaiveTime::MIN).and_utc()),
            other => Err(mismatch(&other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldValue for NaiveDateTime {
    const VALUE_TYPE: ValueType = ValueType::DateTime;

    fn to_cell_value(&self) -> CellValue {
        CellValue::DateTime(self.and_utc())
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        DateTime::<Utc>::from_cell_value(value).map(|dt| dt.naive_utc())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;

    fn to_cell_value(&self) -> CellValue {
        match self {
            Some(value) => value.to_cell_value(),
            None => CellValue::Null,
        }
    }

    fn from_cell_value(value: CellValue) -> Result<Self, ConversionError> {
        match value {
            CellValue::Null => Ok(None),
            other => T::from_cell_value(other).map(Some),
        }
    }
}
