//! Postgres DDL and row level security for the app tables

use std::fmt;

use super::{Schema, TableDefinition, Validator};

/// The SQL command an RLS policy restricts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlsCommand {
    All,
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for RlsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RlsCommand::All => write!(f, "ALL"),
            RlsCommand::Select => write!(f, "SELECT"),
            RlsCommand::Insert => write!(f, "INSERT"),
            RlsCommand::Update => write!(f, "UPDATE"),
            RlsCommand::Delete => write!(f, "DELETE"),
        }
    }
}

/// The role an RLS policy applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlsRole {
    Authenticated,
    Anon,
    ServiceRole,
    Public,
    Custom(String),
}

impl fmt::Display for RlsRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RlsRole::Authenticated => write!(f, "authenticated"),
            RlsRole::Anon => write!(f, "anon"),
            RlsRole::ServiceRole => write!(f, "service_role"),
            RlsRole::Public => write!(f, "public"),
            RlsRole::Custom(role) => write!(f, "\"{}\"", role),
        }
    }
}

/// A row level security policy
#[derive(Debug, Clone)]
pub struct RlsPolicy {
    pub name: String,
    pub table: String,
    pub command: RlsCommand,
    pub role: RlsRole,
    /// `USING` expression: which rows are visible or modifiable
    pub using: String,
    /// `WITH CHECK` expression: which rows may be written
    pub check: Option<String>,
    pub schema: String,
}

impl RlsPolicy {
    /// Owner-only access to every row of `table`
    pub fn owner_only(schema: &str, table: &str, owner_field: &str) -> Self {
        let rule = format!("auth.uid()::text = \"{}\"", owner_field);
        Self {
            name: format!("{}_owner", table),
            table: table.to_string(),
            command: RlsCommand::All,
            role: RlsRole::Authenticated,
            using: rule.clone(),
            check: Some(rule),
            schema: schema.to_string(),
        }
    }

    /// The `CREATE POLICY` statement
    pub fn create_policy_sql(&self) -> String {
        let check_clause = self
            .check
            .as_ref()
            .map_or(String::new(), |c| format!(" WITH CHECK ({})", c));
        format!(
            "CREATE POLICY \"{name}\" ON \"{schema}\".\"{table}\" FOR {command} TO {role} USING ({using}){check};",
            name = self.name,
            schema = self.schema,
            table = self.table,
            command = self.command,
            role = self.role,
            using = self.using,
            check = check_clause
        )
    }

    /// The `DROP POLICY` statement
    pub fn drop_policy_sql(&self) -> String {
        format!(
            "DROP POLICY IF EXISTS \"{}\" ON \"{}\".\"{}\";",
            self.name, self.schema, self.table
        )
    }
}

/// `ALTER TABLE ... ENABLE ROW LEVEL SECURITY`
pub fn enable_rls_sql(schema: &str, table: &str) -> String {
    format!("ALTER TABLE \"{}\".\"{}\" ENABLE ROW LEVEL SECURITY;", schema, table)
}

fn column_type(validator: &Validator) -> (&'static str, bool) {
    match validator {
        Validator::Optional(inner) => (column_type(inner).0, true),
        Validator::String | Validator::Id(_) | Validator::Literal(_) => ("text", false),
        Validator::Boolean => ("boolean", false),
        Validator::Float64 => ("double precision", false),
        Validator::Union(members) if members.iter().all(|m| matches!(m, Validator::Literal(_))) => ("text", false),
        Validator::Union(_) | Validator::Object(_) => ("jsonb", false),
        Validator::Any => ("jsonb", true),
    }
}

impl TableDefinition {
    /// `CREATE TABLE` plus one `CREATE INDEX` per secondary index
    pub fn create_sql(&self, schema: &str) -> Vec<String> {
        let mut columns = vec!["  \"_id\" text PRIMARY KEY DEFAULT gen_random_uuid()::text".to_string()];
        for (name, validator) in self.fields() {
            let (sql_type, nullable) = column_type(validator);
            let null = if nullable { "" } else { " NOT NULL" };
            columns.push(format!("  \"{}\" {}{}", name, sql_type, null));
        }

        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS \"{}\".\"{}\" (\n{}\n);",
            schema,
            self.name,
            columns.join(",\n")
        )];

        for index in &self.indexes {
            let fields: Vec<String> = index.fields.iter().map(|f| format!("\"{}\"", f)).collect();
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS \"{}_{}\" ON \"{}\".\"{}\" ({});",
                self.name,
                index.name,
                schema,
                self.name,
                fields.join(", ")
            ));
        }

        if let Some(owner) = self.owner_field {
            statements.push(enable_rls_sql(schema, self.name));
            statements.push(RlsPolicy::owner_only(schema, self.name, owner).create_policy_sql());
        }

        statements
    }
}

impl Schema {
    /// DDL for every app table; platform tables are left to the platform
    pub fn to_sql(&self, schema: &str) -> String {
        self.tables()
            .iter()
            .filter(|table| !table.platform_managed)
            .flat_map(|table| table.create_sql(schema))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
