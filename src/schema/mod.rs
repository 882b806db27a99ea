//! Persisted record shapes and their secondary indexes

mod sql;
mod validator;

use serde_json::Value;

use crate::error::{Error, Result};

pub use sql::*;
pub use validator::*;

/// Table holding user profiles
pub const USER_PROFILES: &str = "userProfiles";
/// Table holding items
pub const ITEMS: &str = "items";
/// Platform table holding users
pub const USERS: &str = "users";

/// Index on `userId`, present on both app tables
pub const BY_USER: &str = "by_user";
/// Index on `(userId, completed)` for items
pub const BY_USER_COMPLETED: &str = "by_user_completed";

/// A secondary index over one or more fields
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub fields: Vec<&'static str>,
}

/// A logical table: document shape, indexes, and ownership
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub name: &'static str,
    pub document: Validator,
    pub indexes: Vec<IndexDefinition>,
    /// Field naming the owning user, if rows belong to one
    pub owner_field: Option<&'static str>,
    /// Managed by the auth platform; opaque to this crate
    pub platform_managed: bool,
}

impl TableDefinition {
    /// A table with the given document fields
    pub fn new(name: &'static str, fields: Vec<(&'static str, Validator)>) -> Self {
        Self {
            name,
            document: v::object(fields),
            indexes: Vec::new(),
            owner_field: None,
            platform_managed: false,
        }
    }

    /// Add a secondary index
    pub fn index(mut self, name: &'static str, fields: &[&'static str]) -> Self {
        self.indexes.push(IndexDefinition {
            name,
            fields: fields.to_vec(),
        });
        self
    }

    /// Rows are owned by the user named in `field`
    pub fn owned_by(mut self, field: &'static str) -> Self {
        self.owner_field = Some(field);
        self
    }

    fn platform(mut self) -> Self {
        self.platform_managed = true;
        self
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[(&'static str, Validator)] {
        match &self.document {
            Validator::Object(fields) => fields,
            _ => &[],
        }
    }

    /// Look up an index by name
    pub fn find_index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|index| index.name == name)
    }
}

/// The full set of tables
#[derive(Debug, Clone)]
pub struct Schema {
    tables: Vec<TableDefinition>,
}

impl Schema {
    /// Build a schema from table definitions
    pub fn new(tables: Vec<TableDefinition>) -> Self {
        Self { tables }
    }

    /// Tables of the starter app, including the auth platform's tables
    pub fn app() -> Self {
        let mut tables = auth_tables();

        tables.push(
            TableDefinition::new(
                USER_PROFILES,
                vec![
                    ("userId", v::id(USERS)),
                    ("displayName", v::optional(v::string())),
                    ("avatarUrl", v::optional(v::string())),
                    ("bio", v::optional(v::string())),
                    (
                        "settings",
                        v::optional(v::object(vec![
                            (
                                "theme",
                                v::optional(v::union(vec![
                                    v::literal("light"),
                                    v::literal("dark"),
                                    v::literal("system"),
                                ])),
                            ),
                            ("notifications", v::optional(v::boolean())),
                        ])),
                    ),
                    ("loginCount", v::optional(v::number())),
                    ("createdAt", v::string()),
                    ("updatedAt", v::string()),
                ],
            )
            .index(BY_USER, &["userId"])
            .owned_by("userId"),
        );

        tables.push(
            TableDefinition::new(
                ITEMS,
                vec![
                    ("userId", v::id(USERS)),
                    ("title", v::string()),
                    ("description", v::optional(v::string())),
                    ("completed", v::boolean()),
                    ("createdAt", v::string()),
                    ("updatedAt", v::string()),
                ],
            )
            .index(BY_USER, &["userId"])
            .index(BY_USER_COMPLETED, &["userId", "completed"])
            .owned_by("userId"),
        );

        Self::new(tables)
    }

    /// All tables
    pub fn tables(&self) -> &[TableDefinition] {
        &self.tables
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Check a document against its table's shape
    pub fn validate_document(&self, table: &str, document: &Value) -> Result<()> {
        let definition = self
            .table(table)
            .ok_or_else(|| Error::database(format!("unknown table {}", table)))?;
        definition.document.validate_document(document)
    }
}

/// Tables owned by the auth platform. Only `users` is read here.
fn auth_tables() -> Vec<TableDefinition> {
    vec![
        TableDefinition::new(
            USERS,
            vec![
                ("name", v::optional(v::string())),
                ("image", v::optional(v::string())),
                ("email", v::optional(v::string())),
                ("emailVerificationTime", v::optional(v::number())),
                ("phone", v::optional(v::string())),
                ("phoneVerificationTime", v::optional(v::number())),
                ("isAnonymous", v::optional(v::boolean())),
            ],
        )
        .index("email", &["email"])
        .index("phone", &["phone"])
        .platform(),
        TableDefinition::new("authSessions", vec![("userId", v::id(USERS)), ("expirationTime", v::number())])
            .index("userId", &["userId"])
            .platform(),
        TableDefinition::new(
            "authAccounts",
            vec![
                ("userId", v::id(USERS)),
                ("provider", v::string()),
                ("providerAccountId", v::string()),
                ("secret", v::optional(v::string())),
                ("emailVerified", v::optional(v::string())),
                ("phoneVerified", v::optional(v::string())),
            ],
        )
        .index("userIdAndProvider", &["userId", "provider"])
        .index("providerAndAccountId", &["provider", "providerAccountId"])
        .platform(),
    ]
}
