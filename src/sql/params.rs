//! Typed bind values that sqlx can encode on any backend.

use crate::config::FieldType;
use sqlx::any::{Any, AnyTypeInfo};
use sqlx::encode::{Encode, IsNull};
use sqlx::{Database, Type};

/// A value bound to a query. Nulls keep their column type so PostgreSQL accepts them.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null(FieldType),
    BigInt(i64),
    Text(String),
}

impl<'q> Encode<'q, Any> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Any as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            BindValue::Null(FieldType::BigInt) => <Option<i64> as Encode<Any>>::encode_by_ref(&None, buf),
            BindValue::Null(FieldType::Text | FieldType::Date) => {
                <Option<String> as Encode<Any>>::encode_by_ref(&None, buf)
            }
            BindValue::BigInt(n) => <i64 as Encode<Any>>::encode_by_ref(n, buf),
            BindValue::Text(s) => <String as Encode<Any>>::encode_by_ref(s, buf),
        }
    }
}

impl Type<Any> for BindValue {
    fn type_info() -> AnyTypeInfo {
        <String as Type<Any>>::type_info()
    }
}
