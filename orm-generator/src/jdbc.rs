//! Natively supported column types

use crate::descriptor::TypeRef;
use orm_api::{Engine, TermType};
use serde::{Deserialize, Serialize};

/// A column type with a direct native Rust counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JdbcType {
    Boolean,
    Int,
    Long,
    Short,
    Byte,
    Float,
    Double,
    String,
    Bytes,
    Date,
    Time,
    Timestamp,
}

impl JdbcType {
    pub const ALL: [JdbcType; 12] = [
        JdbcType::Boolean,
        JdbcType::Int,
        JdbcType::Long,
        JdbcType::Short,
        JdbcType::Byte,
        JdbcType::Float,
        JdbcType::Double,
        JdbcType::String,
        JdbcType::Bytes,
        JdbcType::Date,
        JdbcType::Time,
        JdbcType::Timestamp,
    ];

    /// The native type bound to this column type.
    pub fn native_type(self) -> &'static str {
        match self {
            JdbcType::Boolean => "bool",
            JdbcType::Int => "i32",
            JdbcType::Long => "i64",
            JdbcType::Short => "i16",
            JdbcType::Byte => "i8",
            JdbcType::Float => "f32",
            JdbcType::Double => "f64",
            JdbcType::String => "String",
            JdbcType::Bytes => "Vec<u8>",
            JdbcType::Date => "chrono::NaiveDate",
            JdbcType::Time => "chrono::NaiveTime",
            JdbcType::Timestamp => "chrono::NaiveDateTime",
        }
    }

    pub fn find_by_native_type(ty: &TypeRef) -> Option<JdbcType> {
        let found = match (ty.simple_name(), ty.args()) {
            ("bool", []) => JdbcType::Boolean,
            ("i32", []) => JdbcType::Int,
            ("i64", []) => JdbcType::Long,
            ("i16", []) => JdbcType::Short,
            ("i8", []) => JdbcType::Byte,
            ("f32", []) => JdbcType::Float,
            ("f64", []) => JdbcType::Double,
            ("String" | "str", []) => JdbcType::String,
            ("Vec", [element]) if element.path() == "u8" => JdbcType::Bytes,
            ("NaiveDate", []) => JdbcType::Date,
            ("NaiveTime", []) => JdbcType::Time,
            ("NaiveDateTime", []) => JdbcType::Timestamp,
            ("DateTime", [zone]) if zone.simple_name() == "Utc" => JdbcType::Timestamp,
            _ => return None,
        };
        Some(found)
    }

    /// Result-set accessor name, `getInt` for `Int`.
    pub fn getter_method(self) -> String {
        format!("get{self:?}")
    }

    pub fn term_type(self) -> TermType {
        match self {
            JdbcType::Boolean => TermType::Bool,
            JdbcType::Int
            | JdbcType::Long
            | JdbcType::Short
            | JdbcType::Byte
            | JdbcType::Float
            | JdbcType::Double => TermType::Number,
            JdbcType::String => TermType::String,
            JdbcType::Date | JdbcType::Time | JdbcType::Timestamp => TermType::Time,
            JdbcType::Bytes => TermType::Wildcard,
        }
    }

    /// The column type used in `CREATE TABLE`.
    pub fn sql_type(self, engine: Engine) -> &'static str {
        match (self, engine) {
            (JdbcType::Boolean, Engine::Oracle) => "NUMBER(1)",
            (JdbcType::Boolean, Engine::MsSqlServer | Engine::Sybase) => "BIT",
            (JdbcType::Boolean, _) => "BOOLEAN",
            (JdbcType::Int, _) => "INTEGER",
            (JdbcType::Long, Engine::Oracle) => "NUMBER(19)",
            (JdbcType::Long, _) => "BIGINT",
            (JdbcType::Short, Engine::Oracle) => "NUMBER(5)",
            (JdbcType::Short, _) => "SMALLINT",
            (JdbcType::Byte, Engine::Oracle) => "NUMBER(3)",
            (JdbcType::Byte, Engine::PostgreSQL | Engine::Derby) => "SMALLINT",
            (JdbcType::Byte, _) => "TINYINT",
            (JdbcType::Float, _) => "REAL",
            (JdbcType::Double, Engine::MySQL | Engine::MariaDB) => "DOUBLE",
            (JdbcType::Double, Engine::MsSqlServer | Engine::Sybase) => "FLOAT",
            (JdbcType::Double, _) => "DOUBLE PRECISION",
            (JdbcType::String, Engine::PostgreSQL | Engine::SQLite) => "TEXT",
            (JdbcType::String, Engine::Oracle) => "VARCHAR2(4000)",
            (JdbcType::String, _) => "VARCHAR(4096)",
            (JdbcType::Bytes, Engine::PostgreSQL) => "BYTEA",
            (JdbcType::Bytes, Engine::MsSqlServer | Engine::Sybase) => "VARBINARY(MAX)",
            (JdbcType::Bytes, _) => "BLOB",
            (JdbcType::Date, _) => "DATE",
            (JdbcType::Time, Engine::Oracle) => "TIMESTAMP",
            (JdbcType::Time, _) => "TIME",
            (JdbcType::Timestamp, Engine::MsSqlServer) => "DATETIME2",
            (JdbcType::Timestamp, _) => "TIMESTAMP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(text: &str) -> Option<JdbcType> {
        JdbcType::find_by_native_type(&TypeRef::parse(text).unwrap())
    }

    #[test]
    fn test_every_type_finds_itself() {
        for jdbc in JdbcType::ALL {
            assert_eq!(native(jdbc.native_type()), Some(jdbc), "{jdbc:?}");
        }
    }

    #[test]
    fn test_native_aliases() {
        assert_eq!(native("&str"), Some(JdbcType::String));
        assert_eq!(native("NaiveDate"), Some(JdbcType::Date));
        assert_eq!(native("chrono::DateTime<chrono::Utc>"), Some(JdbcType::Timestamp));
        assert_eq!(native("Vec<i32>"), None);
        assert_eq!(native("Option<i32>"), None);
        assert_eq!(native("u64"), None);
    }

    #[test]
    fn test_getter_and_term_type() {
        assert_eq!(JdbcType::Int.getter_method(), "getInt");
        assert_eq!(JdbcType::Timestamp.getter_method(), "getTimestamp");
        assert_eq!(JdbcType::Long.term_type(), TermType::Number);
        assert_eq!(JdbcType::Date.term_type(), TermType::Time);
        assert_eq!(JdbcType::Bytes.term_type(), TermType::Wildcard);
    }

    #[test]
    fn test_sql_types() {
        assert_eq!(JdbcType::String.sql_type(Engine::PostgreSQL), "TEXT");
        assert_eq!(JdbcType::String.sql_type(Engine::H2), "VARCHAR(4096)");
        assert_eq!(JdbcType::Boolean.sql_type(Engine::Oracle), "NUMBER(1)");
        assert_eq!(JdbcType::Bytes.sql_type(Engine::PostgreSQL), "BYTEA");
        for engine in Engine::ALL {
            for jdbc in JdbcType::ALL {
                assert!(!jdbc.sql_type(engine).is_empty());
            }
        }
    }
}
