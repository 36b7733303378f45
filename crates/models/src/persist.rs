//! Column mappings for grid types stored as JSON text

use crate::{grid::Grid, slot::SlotCatalog};
use sea_orm::{
    ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value,
    sea_query::{ArrayType, ColumnType, Nullable, ValueType, ValueTypeErr},
};

macro_rules! json_text_column {
    ($ty:ty, $name:literal) => {
        impl ValueType for $ty {
            fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
                match v {
                    Value::String(Some(s)) => serde_json::from_str(&s).map_err(|_| ValueTypeErr),
                    _ => Err(ValueTypeErr),
                }
            }

            fn type_name() -> String {
                $name.to_string()
            }

            fn array_type() -> ArrayType {
                ArrayType::String
            }

            fn column_type() -> ColumnType {
                ColumnType::Text
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                // Both types serialize to plain lists of strings and objects
                let json = serde_json::to_string(&value).unwrap_or_else(|_| "[]".to_string());
                Value::String(Some(Box::new(json)))
            }
        }

        impl TryGetable for $ty {
            fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
                let val: String = res.try_get_by(index)?;

                serde_json::from_str(&val).map_err(|e| {
                    TryGetError::DbErr(DbErr::Type(format!(
                        concat!("Failed to deserialize ", $name, ": {}"),
                        e
                    )))
                })
            }
        }

        impl Nullable for $ty {
            fn null() -> Value {
                Value::String(None)
            }
        }
    };
}

json_text_column!(Grid, "Grid");
json_text_column!(SlotCatalog, "SlotCatalog");
