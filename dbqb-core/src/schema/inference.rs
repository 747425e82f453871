//! Maps driver type codes to canonical scalar kinds.

use dbqb_api::prelude::{ColumnDescriptor, Connection, Dialect, TypeCode};
use serde::Serialize;

/// Default precision assumed for a decimal column that does not report one.
pub const DEFAULT_DECIMAL_PRECISION: u32 = 10;
/// Default scale assumed for a decimal column that does not report one.
pub const DEFAULT_DECIMAL_SCALE: u32 = 5;

/// Canonical scalar kind of a projected field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// 32-bit integer backed by an identity generator.
    Auto,
    /// 64-bit integer backed by an identity generator.
    BigAuto,
    BigInteger,
    Binary,
    Boolean,
    /// Text bounded by a maximum length.
    Char,
    Date,
    DateTime,
    Decimal,
    Duration,
    Float,
    Integer,
    IpAddress,
    Json,
    /// 16-bit integer backed by an identity generator.
    SmallAuto,
    SmallInteger,
    Text,
    Time,
    Uuid,
}

impl ScalarKind {
    /// Returns whether the kind is an integer, identity-backed or not.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::Auto
                | ScalarKind::BigAuto
                | ScalarKind::SmallAuto
                | ScalarKind::Integer
                | ScalarKind::BigInteger
                | ScalarKind::SmallInteger
        )
    }

    /// Returns whether the kind is backed by an identity generator.
    pub fn is_auto(&self) -> bool {
        matches!(
            self,
            ScalarKind::Auto | ScalarKind::BigAuto | ScalarKind::SmallAuto
        )
    }

    /// Returns whether the kind holds text and may carry a collation.
    pub fn is_text(&self) -> bool {
        matches!(self, ScalarKind::Char | ScalarKind::Text)
    }

    /// Returns the identity-backed counterpart of an integer kind.
    fn to_auto(self) -> Self {
        match self {
            ScalarKind::Integer => ScalarKind::Auto,
            ScalarKind::BigInteger => ScalarKind::BigAuto,
            ScalarKind::SmallInteger => ScalarKind::SmallAuto,
            other => other,
        }
    }
}

/// Refinement parameters of a projected field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
}

/// Result of inferring one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inferred {
    pub kind: ScalarKind,
    pub params: FieldParams,
    pub notes: Vec<String>,
}

/// Infers the scalar kind of `column` using the lookup table of `connection`'s dialect.
pub fn infer<C>(connection: &C, table: &str, column: &ColumnDescriptor) -> Inferred
where
    C: Connection + ?Sized,
{
    TypeInferencer::new(connection.dialect()).infer(table, column)
}

/// Type inferencer bound to one dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeInferencer {
    dialect: Dialect,
}

impl TypeInferencer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Looks `code` up in the dialect's table.
    pub fn lookup(&self, code: &TypeCode) -> Option<ScalarKind> {
        match (self.dialect, code) {
            (Dialect::Postgres, TypeCode::Oid(oid)) => postgres_oid(*oid),
            (_, TypeCode::Oid(_)) => None,
            (_, TypeCode::Name(name)) => declared_name(&DeclaredType::parse(name).base),
        }
    }

    /// Infers the kind and parameters of `column`; never fails.
    ///
    /// An unknown type code falls back to [`ScalarKind::Text`] with a note.
    pub fn infer(&self, table: &str, column: &ColumnDescriptor) -> Inferred {
        let mut notes = Vec::new();
        let mut params = FieldParams::default();

        let mut kind = match self.lookup(&column.type_code) {
            Some(kind) => kind,
            None => {
                tracing::debug!(
                    table,
                    column = %column.name,
                    type_code = %column.type_code,
                    "unknown type code, falling back to text"
                );
                notes.push("This field type is a guess.".to_string());
                ScalarKind::Text
            }
        };

        let is_serial = column.is_autofield
            || column
                .default
                .as_deref()
                .is_some_and(|default| default.contains("nextval"));
        if is_serial {
            kind = kind.to_auto();
        }

        let declared = match &column.type_code {
            TypeCode::Name(name) => Some(DeclaredType::parse(name)),
            TypeCode::Oid(_) => None,
        };

        if kind == ScalarKind::Char {
            params.max_length = column
                .display_size
                .filter(|size| *size > 0)
                .or_else(|| declared.as_ref().and_then(|d| d.args.first().copied()));
        }

        if kind.is_text() {
            params.collation = column.collation.clone();
        }

        if kind == ScalarKind::Decimal {
            let declared_args = declared.as_ref().map(|d| d.args.as_slice()).unwrap_or(&[]);
            let precision = column.precision.or_else(|| declared_args.first().copied());
            let scale = column.scale.or_else(|| declared_args.get(1).copied());
            if precision.is_none() || scale.is_none() {
                notes.push(
                    "max_digits and decimal_places have been guessed, as this database handles decimal fields as float"
                        .to_string(),
                );
            }
            params.max_digits = Some(precision.unwrap_or(DEFAULT_DECIMAL_PRECISION));
            params.decimal_places = Some(scale.unwrap_or(DEFAULT_DECIMAL_SCALE));
        }

        Inferred {
            kind,
            params,
            notes,
        }
    }
}

/// Postgres built-in type OIDs.
fn postgres_oid(oid: u32) -> Option<ScalarKind> {
    let kind = match oid {
        16 => ScalarKind::Boolean,
        17 => ScalarKind::Binary,
        20 => ScalarKind::BigInteger,
        21 => ScalarKind::SmallInteger,
        23 => ScalarKind::Integer,
        25 => ScalarKind::Text,
        700 | 701 => ScalarKind::Float,
        869 => ScalarKind::IpAddress,
        1042 | 1043 => ScalarKind::Char,
        1082 => ScalarKind::Date,
        1083 | 1266 => ScalarKind::Time,
        1114 | 1184 => ScalarKind::DateTime,
        1186 => ScalarKind::Duration,
        1700 => ScalarKind::Decimal,
        2950 => ScalarKind::Uuid,
        3802 => ScalarKind::Json,
        _ => return None,
    };
    Some(kind)
}

/// Declared type names, as SQLite-like drivers report them.
fn declared_name(base: &str) -> Option<ScalarKind> {
    let kind = match base {
        "bool" | "boolean" => ScalarKind::Boolean,
        "smallint" | "smallinteger" | "int2" => ScalarKind::SmallInteger,
        "int" | "integer" | "int4" | "mediumint" => ScalarKind::Integer,
        "bigint" | "int8" | "biginteger" => ScalarKind::BigInteger,
        "text" | "clob" => ScalarKind::Text,
        "char" | "character" | "varchar" | "character varying" | "nchar" | "nvarchar" => {
            ScalarKind::Char
        }
        "blob" | "bytea" => ScalarKind::Binary,
        "date" => ScalarKind::Date,
        "datetime" | "timestamp" | "timestamptz" => ScalarKind::DateTime,
        "time" => ScalarKind::Time,
        "decimal" | "numeric" => ScalarKind::Decimal,
        "real" | "float" | "double" | "double precision" => ScalarKind::Float,
        "uuid" => ScalarKind::Uuid,
        "json" | "jsonb" => ScalarKind::Json,
        _ => return None,
    };
    Some(kind)
}

/// A declared type name split into its lowercase base and numeric arguments:
/// `VARCHAR(30)` -> (`varchar`, [30]).
#[derive(Debug, PartialEq, Eq)]
struct DeclaredType {
    base: String,
    args: Vec<u32>,
}

impl DeclaredType {
    fn parse(declared: &str) -> Self {
        let declared = declared.trim().to_lowercase();
        match declared.split_once('(') {
            Some((base, rest)) => Self {
                base: base.trim().to_string(),
                args: rest
                    .trim_end_matches(')')
                    .split(',')
                    .filter_map(|arg| arg.trim().parse().ok())
                    .collect(),
            },
            None => Self {
                base: declared,
                args: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn postgres() -> TypeInferencer {
        TypeInferencer::new(Dialect::Postgres)
    }

    #[test]
    fn test_should_lookup_postgres_oids() {
        let inferencer = postgres();
        assert_eq!(
            inferencer.lookup(&TypeCode::Oid(23)),
            Some(ScalarKind::Integer)
        );
        assert_eq!(
            inferencer.lookup(&TypeCode::Oid(1043)),
            Some(ScalarKind::Char)
        );
        assert_eq!(inferencer.lookup(&TypeCode::Oid(99999)), None);
    }

    #[test]
    fn test_should_not_lookup_oids_outside_postgres() {
        let inferencer = TypeInferencer::new(Dialect::Sqlite);
        assert_eq!(inferencer.lookup(&TypeCode::Oid(23)), None);
        assert_eq!(
            inferencer.lookup(&TypeCode::Name("INTEGER".to_string())),
            Some(ScalarKind::Integer)
        );
    }

    #[test]
    fn test_should_fall_back_to_text() {
        let column = ColumnDescriptor::new("geom", TypeCode::Oid(600_001));
        let inferred = postgres().infer("places", &column);
        assert_eq!(inferred.kind, ScalarKind::Text);
        assert_eq!(inferred.notes, vec!["This field type is a guess."]);
    }

    #[test]
    fn test_should_set_max_length_from_display_size() {
        let column = ColumnDescriptor::new("name", TypeCode::Oid(1043)).display_size(50);
        let inferred = postgres().infer("customers", &column);
        assert_eq!(inferred.kind, ScalarKind::Char);
        assert_eq!(inferred.params.max_length, Some(50));
        assert!(inferred.notes.is_empty());
    }

    #[test]
    fn test_should_ignore_non_positive_display_size() {
        let column = ColumnDescriptor::new("name", TypeCode::Oid(1043)).display_size(0);
        let inferred = postgres().infer("customers", &column);
        assert_eq!(inferred.params.max_length, None);
    }

    #[test]
    fn test_should_parse_declared_length() {
        let column = ColumnDescriptor::new("code", TypeCode::Name("VARCHAR(12)".to_string()));
        let inferred = TypeInferencer::new(Dialect::Sqlite).infer("items", &column);
        assert_eq!(inferred.kind, ScalarKind::Char);
        assert_eq!(inferred.params.max_length, Some(12));
    }

    #[test]
    fn test_should_inherit_collation_for_text() {
        let column = ColumnDescriptor::new("title", TypeCode::Oid(25)).collation("C");
        let inferred = postgres().infer("posts", &column);
        assert_eq!(inferred.params.collation.as_deref(), Some("C"));

        let column = ColumnDescriptor::new("count", TypeCode::Oid(23)).collation("C");
        let inferred = postgres().infer("posts", &column);
        assert_eq!(inferred.params.collation, None);
    }

    #[test]
    fn test_should_copy_decimal_params() {
        let column = ColumnDescriptor::new("total", TypeCode::Oid(1700)).numeric(10, 2);
        let inferred = postgres().infer("orders", &column);
        assert_eq!(inferred.kind, ScalarKind::Decimal);
        assert_eq!(inferred.params.max_digits, Some(10));
        assert_eq!(inferred.params.decimal_places, Some(2));
        assert!(inferred.notes.is_empty());
    }

    #[test]
    fn test_should_guess_missing_decimal_params() {
        let column = ColumnDescriptor::new("ratio", TypeCode::Oid(1700));
        let inferred = postgres().infer("stats", &column);
        assert_eq!(inferred.params.max_digits, Some(DEFAULT_DECIMAL_PRECISION));
        assert_eq!(inferred.params.decimal_places, Some(DEFAULT_DECIMAL_SCALE));
        assert_eq!(inferred.notes.len(), 1);

        let mut column = ColumnDescriptor::new("ratio", TypeCode::Oid(1700));
        column.precision = Some(8);
        let inferred = postgres().infer("stats", &column);
        assert_eq!(inferred.params.max_digits, Some(8));
        assert_eq!(inferred.params.decimal_places, Some(DEFAULT_DECIMAL_SCALE));
        assert_eq!(inferred.notes.len(), 1);
    }

    #[test]
    fn test_should_detect_identity_columns() {
        let column = ColumnDescriptor::new("id", TypeCode::Oid(23)).autofield();
        assert_eq!(postgres().infer("t", &column).kind, ScalarKind::Auto);

        let column = ColumnDescriptor::new("id", TypeCode::Oid(20))
            .default_expr("nextval('t_id_seq'::regclass)");
        assert_eq!(postgres().infer("t", &column).kind, ScalarKind::BigAuto);

        let column = ColumnDescriptor::new("flag", TypeCode::Oid(16)).autofield();
        assert_eq!(postgres().infer("t", &column).kind, ScalarKind::Boolean);
    }

    #[test]
    fn test_should_infer_through_connection_dialect() {
        let mut database = crate::memory::MemoryDatabase::new(Dialect::Postgres);
        database.add_table(crate::memory::MemoryTable::new("t"));
        let driver = crate::memory::MemoryDriver::default().with_database("db", database);
        let connection = driver
            .open("db")
            .expect("failed to open memory connection");
        let column = ColumnDescriptor::new("id", TypeCode::Oid(23));
        assert_eq!(infer(&connection, "t", &column).kind, ScalarKind::Integer);
    }

    #[test]
    fn test_should_parse_declared_types() {
        assert_eq!(
            DeclaredType::parse(" Decimal(10, 2) "),
            DeclaredType {
                base: "decimal".to_string(),
                args: vec![10, 2]
            }
        );
        assert_eq!(
            DeclaredType::parse("TEXT"),
            DeclaredType {
                base: "text".to_string(),
                args: vec![]
            }
        );
    }
}
