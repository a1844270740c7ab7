//! Database engines and their SQL dialect differences

use serde::{Deserialize, Serialize};

/// The DBMS behind a connection. Unsupported engines map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    Derby,
    H2,
    HyperSQL,
    MariaDB,
    MsSqlServer,
    MySQL,
    Oracle,
    PostgreSQL,
    SQLite,
    Sybase,
    Unknown,
}

impl Engine {
    pub const ALL: [Engine; 11] = [
        Engine::Derby,
        Engine::H2,
        Engine::HyperSQL,
        Engine::MariaDB,
        Engine::MsSqlServer,
        Engine::MySQL,
        Engine::Oracle,
        Engine::PostgreSQL,
        Engine::SQLite,
        Engine::Sybase,
        Engine::Unknown,
    ];

    /// The subprotocol used in `jdbc:<type>:...` connection URLs.
    pub fn jdbc_type(self) -> &'static str {
        match self {
            Engine::Derby => "derby",
            Engine::H2 => "h2",
            Engine::HyperSQL => "hsqldb",
            Engine::MariaDB => "mariadb",
            Engine::MsSqlServer => "sqlserver",
            Engine::MySQL => "mysql",
            Engine::Oracle => "oracle",
            Engine::PostgreSQL => "postgresql",
            Engine::SQLite => "sqlite",
            Engine::Sybase => "sybase",
            Engine::Unknown => "",
        }
    }

    pub fn from_jdbc_type(jdbc_type: &str) -> Engine {
        Self::ALL
            .into_iter()
            .find(|engine| *engine != Engine::Unknown && engine.jdbc_type() == jdbc_type)
            .unwrap_or(Engine::Unknown)
    }

    /// Maps the product name reported by database metadata.
    pub fn from_product_name(name: &str) -> Engine {
        match name {
            "Apache Derby" => Engine::Derby,
            "H2" => Engine::H2,
            "HSQL Database Engine" => Engine::HyperSQL,
            "Microsoft SQL Server" => Engine::MsSqlServer,
            "MariaDB" => Engine::MariaDB,
            "MySQL" => Engine::MySQL,
            "Oracle" => Engine::Oracle,
            "PostgreSQL" => Engine::PostgreSQL,
            "SQLite" => Engine::SQLite,
            "Sybase Anywhere" | "ASE" | "Adaptive Server Enterprise" => Engine::Sybase,
            _ => Engine::Unknown,
        }
    }

    pub fn is_one_of(self, engines: &[Engine]) -> bool {
        engines.contains(&self)
    }

    /// Whether the dialect has `LIMIT ?`; the rest use `FETCH NEXT ? ROWS ONLY`.
    pub fn supports_limit(self) -> bool {
        !self.is_one_of(&[Engine::MsSqlServer, Engine::Oracle, Engine::Derby])
    }

    /// Whether `CREATE TABLE IF NOT EXISTS` and `DROP TABLE IF EXISTS` are understood.
    pub fn supports_if_exists(self) -> bool {
        !self.is_one_of(&[Engine::MsSqlServer, Engine::Oracle, Engine::Derby, Engine::Sybase])
    }
}
