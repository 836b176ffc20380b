use bit_vec::BitVec;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use jiff::civil::{Date, DateTime, Time};
use pgshape_driver::Error::{ConversionError, UnsupportedColumnType};
use pgshape_driver::{ColumnDescriptor, Result, Row as ValueRow, Value};
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgColumn, PgRow};
use sqlx::{Column, ColumnIndex, Decode, Row, Type, TypeInfo};
use uuid::Uuid;

/// Column names and database type names, in result order
pub(crate) fn describe_columns(columns: &[PgColumn]) -> Vec<ColumnDescriptor> {
    columns
        .iter()
        .map(|column| ColumnDescriptor::new(column.name(), column.type_info().name()))
        .collect()
}

pub(crate) fn convert_row(row: &PgRow) -> Result<ValueRow> {
    row.columns()
        .iter()
        .map(|column| convert_to_value(row, column))
        .collect()
}

#[expect(clippy::too_many_lines)]
pub(crate) fn convert_to_value(row: &PgRow, column: &PgColumn) -> Result<Value> {
    let column_type = column.type_info();
    let postgresql_type = &**column_type;
    let column_type = format!("{postgresql_type:?}");
    let column_type_parts: Vec<&str> = column_type.split('(').collect();
    let column_name = column.name();

    let Some(column_type_first_part) = column_type_parts.first() else {
        return Err(UnsupportedColumnType {
            column_name: column.name().to_string(),
            column_type: column_type.to_string(),
        });
    };

    let value = match *column_type_first_part {
        "Bool" => get_value(row, column_name, |v: bool| Value::Bool(v))?,
        "BoolArray" => get_value(row, column_name, |v: Vec<bool>| {
            Value::Array(v.into_iter().map(Value::Bool).collect())
        })?,
        "Bpchar" | "Char" | "Name" | "Text" | "Varchar" => {
            get_value(row, column_name, |v: String| Value::String(v))?
        }
        "BpcharArray" | "CharArray" | "NameArray" | "TextArray" | "VarcharArray" => {
            get_value(row, column_name, |v: Vec<String>| {
                Value::Array(v.into_iter().map(Value::String).collect())
            })?
        }
        "Bytea" => get_value(row, column_name, |v: Vec<u8>| Value::Bytes(v))?,
        "ByteaArray" => get_value(row, column_name, |v: Vec<Vec<u8>>| {
            Value::Array(v.into_iter().map(Value::Bytes).collect())
        })?,
        "Int2" => get_value(row, column_name, |v: i16| Value::I16(v))?,
        "Int2Array" => get_value(row, column_name, |v: Vec<i16>| {
            Value::Array(v.into_iter().map(Value::I16).collect())
        })?,
        "Int4" => get_value(row, column_name, |v: i32| Value::I32(v))?,
        "Int4Array" => get_value(row, column_name, |v: Vec<i32>| {
            Value::Array(v.into_iter().map(Value::I32).collect())
        })?,
        "Int8" => get_value(row, column_name, |v: i64| Value::I64(v))?,
        "Int8Array" => get_value(row, column_name, |v: Vec<i64>| {
            Value::Array(v.into_iter().map(Value::I64).collect())
        })?,
        "Oid" => get_value(row, column_name, |v: Oid| Value::U32(v.0))?,
        "OidArray" => get_value(row, column_name, |v: Vec<Oid>| {
            Value::Array(v.into_iter().map(|v| Value::U32(v.0)).collect())
        })?,
        "Json" | "Jsonb" => get_value(row, column_name, |v: serde_json::Value| Value::from(v))?,
        "JsonArray" | "JsonbArray" => get_value(row, column_name, |v: Vec<serde_json::Value>| {
            Value::Array(v.into_iter().map(Value::from).collect())
        })?,
        "Float4" => get_value(row, column_name, |v: f32| Value::F32(v))?,
        "Float4Array" => get_value(row, column_name, |v: Vec<f32>| {
            Value::Array(v.into_iter().map(Value::F32).collect())
        })?,
        "Float8" => get_value(row, column_name, |v: f64| Value::F64(v))?,
        "Float8Array" => get_value(row, column_name, |v: Vec<f64>| {
            Value::Array(v.into_iter().map(Value::F64).collect())
        })?,
        "Date" => get_value(row, column_name, naive_date_to_value)?,
        "DateArray" => get_value(row, column_name, |v: Vec<NaiveDate>| {
            Value::Array(v.into_iter().map(naive_date_to_value).collect())
        })?,
        "Time" => get_value(row, column_name, naive_time_to_value)?,
        "TimeArray" => get_value(row, column_name, |v: Vec<NaiveTime>| {
            Value::Array(v.into_iter().map(naive_time_to_value).collect())
        })?,
        "Timestamp" => get_value(row, column_name, naive_date_time_to_value)?,
        "TimestampArray" => get_value(row, column_name, |v: Vec<NaiveDateTime>| {
            Value::Array(v.into_iter().map(naive_date_time_to_value).collect())
        })?,
        "Timestamptz" => get_value(row, column_name, |v: chrono::DateTime<Utc>| {
            naive_date_time_to_value(v.naive_utc())
        })?,
        "TimestamptzArray" => get_value(row, column_name, |v: Vec<chrono::DateTime<Utc>>| {
            Value::Array(
                v.into_iter()
                    .map(|v| naive_date_time_to_value(v.naive_utc()))
                    .collect(),
            )
        })?,
        "Bit" | "Varbit" => get_value(row, column_name, |v: BitVec| Value::String(bit_string(&v)))?,
        "BitArray" | "VarbitArray" => get_value(row, column_name, |v: Vec<BitVec>| {
            Value::Array(
                v.into_iter()
                    .map(|v| Value::String(bit_string(&v)))
                    .collect(),
            )
        })?,
        "Numeric" => get_value(row, column_name, |v: rust_decimal::Decimal| {
            Value::Decimal(v)
        })?,
        "NumericArray" => get_value(row, column_name, |v: Vec<rust_decimal::Decimal>| {
            Value::Array(v.into_iter().map(Value::Decimal).collect())
        })?,
        "Uuid" => get_value(row, column_name, |v: Uuid| Value::Uuid(v))?,
        "UuidArray" => get_value(row, column_name, |v: Vec<Uuid>| {
            Value::Array(v.into_iter().map(Value::Uuid).collect())
        })?,
        "Void" => Value::Null, // pg_sleep() returns void
        _ => {
            return Err(UnsupportedColumnType {
                column_name: column.name().to_string(),
                column_type: column_type.to_string(),
            });
        }
    };

    Ok(value)
}

fn get_value<'r, T, I>(row: &'r PgRow, index: I, to_value: impl Fn(T) -> Value) -> Result<Value>
where
    T: Decode<'r, <PgRow as Row>::Database> + Type<<PgRow as Row>::Database>,
    I: ColumnIndex<PgRow>,
{
    match row
        .try_get::<Option<T>, I>(index)
        .map_err(|error| ConversionError(error.to_string()))?
        .map(to_value)
    {
        Some(value) => Ok(value),
        None => Ok(Value::Null),
    }
}

fn bit_string(value: &BitVec) -> String {
    value
        .iter()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

fn naive_date_to_value(date: NaiveDate) -> Value {
    let Ok(year) = i16::try_from(date.year()) else {
        return Value::Null;
    };
    let Ok(month) = i8::try_from(date.month()) else {
        return Value::Null;
    };
    let Ok(day) = i8::try_from(date.day()) else {
        return Value::Null;
    };
    let Ok(date) = Date::new(year, month, day) else {
        return Value::Null;
    };
    Value::Date(date)
}

fn naive_time_to_value(time: NaiveTime) -> Value {
    let Ok(hour) = i8::try_from(time.hour()) else {
        return Value::Null;
    };
    let Ok(minute) = i8::try_from(time.minute()) else {
        return Value::Null;
    };
    let Ok(second) = i8::try_from(time.second()) else {
        return Value::Null;
    };
    let Ok(nanosecond) = i32::try_from(time.nanosecond()) else {
        return Value::Null;
    };
    let Ok(time) = Time::new(hour, minute, second, nanosecond) else {
        return Value::Null;
    };
    Value::Time(time)
}

fn naive_date_time_to_value(date_time: NaiveDateTime) -> Value {
    let (Value::Date(date), Value::Time(time)) = (
        naive_date_to_value(date_time.date()),
        naive_time_to_value(date_time.time()),
    ) else {
        return Value::Null;
    };
    Value::DateTime(DateTime::from_parts(date, time))
}

#[cfg(test)]
mod test {
    use super::*;
    use jiff::civil;

    #[test]
    fn test_bit_string() {
        let bits = BitVec::from_bytes(&[0b1010_0000]);
        assert_eq!(bit_string(&bits), "10100000");
    }

    #[test]
    fn test_naive_date_to_value() {
        let date = NaiveDate::from_ymd_opt(2022, 5, 1).expect("date");
        assert_eq!(naive_date_to_value(date), Value::Date(civil::date(2022, 5, 1)));
    }

    #[test]
    fn test_naive_date_out_of_range() {
        let date = NaiveDate::from_ymd_opt(100_000, 1, 1).expect("date");
        assert_eq!(naive_date_to_value(date), Value::Null);
    }

    #[test]
    fn test_naive_time_to_value() {
        let time = NaiveTime::from_hms_opt(1, 23, 45).expect("time");
        assert_eq!(naive_time_to_value(time), Value::Time(civil::time(1, 23, 45, 0)));
    }

    #[test]
    fn test_naive_date_time_to_value() {
        let date_time = NaiveDate::from_ymd_opt(1983, 1, 1)
            .and_then(|date| date.and_hms_opt(1, 23, 45))
            .expect("date time");
        assert_eq!(
            naive_date_time_to_value(date_time),
            Value::DateTime(civil::datetime(1983, 1, 1, 1, 23, 45, 0))
        );
    }
}
