//! Predicate-based select queries.
//!
//! [`SelectQuery`] is the composed predicate set handed to the persistence
//! collaborator: source tables (with optional aliases), conjoined
//! [`Predicate`]s, ordering and a limit/offset window. It renders to
//! placeholder SQL for SQL-speaking collaborators, and exposes its structure
//! so in-memory collaborators can evaluate it directly.

use serde_json::Value;

/// One FROM source: a table, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// The name predicates should qualify columns with.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// One conjoined WHERE predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `qualifier.column = value`
    Eq {
        qualifier: String,
        column: String,
        value: Value,
    },
    /// `qualifier.column IS NULL`
    IsNull { qualifier: String, column: String },
    /// `qualifier.column IN (values...)`, optionally OR'd with an IS NULL
    /// check when the original criteria array contained a null member.
    In {
        qualifier: String,
        column: String,
        values: Vec<Value>,
        or_null: bool,
    },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::Eq { column, .. }
            | Predicate::IsNull { column, .. }
            | Predicate::In { column, .. } => column,
        }
    }
}

/// A read query over one or more tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    from: Vec<TableRef>,
    predicates: Vec<Predicate>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQuery {
    /// A query over a single table with no alias.
    pub fn new(table: impl Into<String>) -> Self {
        Self::default().from(table, None)
    }

    /// Append a FROM source.
    pub fn from(mut self, table: impl Into<String>, alias: Option<String>) -> Self {
        self.from.push(TableRef {
            table: table.into(),
            alias,
        });
        self
    }

    /// The qualifier to use for `table` if the query already references it.
    pub fn qualifier_for(&self, table: &str) -> Option<&str> {
        self.from
            .iter()
            .find(|f| f.table == table)
            .map(|f| f.qualifier())
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by.push(clause.into());
        self
    }

    pub fn limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub fn offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    pub fn sources(&self) -> &[TableRef] {
        &self.from
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn window(&self) -> (Option<u64>, Option<u64>) {
        (self.limit, self.offset)
    }

    /// Render to `?`-placeholder SQL plus the bound parameters, in order.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT * FROM ");
        let mut params = Vec::new();

        for (i, source) in self.from.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&quote_ident(&source.table));
            if let Some(alias) = &source.alias {
                sql.push_str(" AS ");
                sql.push_str(&quote_ident(alias));
            }
        }

        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            render_predicate(predicate, &mut sql, &mut params);
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&offset.to_string());
        }

        (sql, params)
    }
}

fn render_predicate(predicate: &Predicate, sql: &mut String, params: &mut Vec<Value>) {
    match predicate {
        Predicate::Eq {
            qualifier,
            column,
            value,
        } => {
            push_column(sql, qualifier, column);
            sql.push_str(" = ?");
            params.push(value.clone());
        }
        Predicate::IsNull { qualifier, column } => {
            push_column(sql, qualifier, column);
            sql.push_str(" IS NULL");
        }
        Predicate::In {
            qualifier,
            column,
            values,
            or_null,
        } => {
            if values.is_empty() {
                if *or_null {
                    // Only nulls were asked for; an empty IN list is invalid SQL.
                    push_column(sql, qualifier, column);
                    sql.push_str(" IS NULL");
                } else {
                    // Empty IN list can never match.
                    sql.push_str("1=0");
                }
                return;
            }

            if *or_null {
                sql.push('(');
                push_column(sql, qualifier, column);
                sql.push_str(" IS NULL OR ");
            }
            push_column(sql, qualifier, column);
            sql.push_str(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push('?');
                params.push(value.clone());
            }
            sql.push(')');
            if *or_null {
                sql.push(')');
            }
        }
    }
}

fn push_column(sql: &mut String, qualifier: &str, column: &str) {
    sql.push_str(&quote_ident(qualifier));
    sql.push('.');
    sql.push_str(&quote_ident(column));
}

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_predicate_renders_with_placeholder() {
        let mut q = SelectQuery::new("user");
        q.push(Predicate::Eq {
            qualifier: "user".into(),
            column: "status".into(),
            value: json!("active"),
        });
        let (sql, params) = q.to_sql();
        assert_eq!(sql, "SELECT * FROM `user` WHERE `user`.`status` = ?");
        assert_eq!(params, vec![json!("active")]);
    }

    #[test]
    fn null_criteria_becomes_is_null() {
        let mut q = SelectQuery::new("user");
        q.push(Predicate::IsNull {
            qualifier: "user".into(),
            column: "deleted_at".into(),
        });
        let (sql, params) = q.to_sql();
        assert!(sql.ends_with("`user`.`deleted_at` IS NULL"));
        assert!(params.is_empty());
    }

    #[test]
    fn in_list_with_null_member_ors_is_null() {
        let mut q = SelectQuery::new("user");
        q.push(Predicate::In {
            qualifier: "user".into(),
            column: "group_id".into(),
            values: vec![json!(1), json!(2)],
            or_null: true,
        });
        let (sql, params) = q.to_sql();
        assert!(sql.contains("(`user`.`group_id` IS NULL OR `user`.`group_id` IN (?, ?))"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_in_list_never_matches() {
        let mut q = SelectQuery::new("user");
        q.push(Predicate::In {
            qualifier: "user".into(),
            column: "id".into(),
            values: Vec::new(),
            or_null: false,
        });
        let (sql, _) = q.to_sql();
        assert!(sql.ends_with("WHERE 1=0"));
    }

    #[test]
    fn all_null_in_list_renders_only_is_null() {
        let mut q = SelectQuery::new("user");
        q.push(Predicate::In {
            qualifier: "user".into(),
            column: "group_id".into(),
            values: Vec::new(),
            or_null: true,
        });
        let (sql, params) = q.to_sql();
        assert!(sql.ends_with("WHERE `user`.`group_id` IS NULL"));
        assert!(!sql.contains("IN"));
        assert!(params.is_empty());
    }

    #[test]
    fn predicates_are_conjoined() {
        let mut q = SelectQuery::new("user");
        q.push(Predicate::Eq {
            qualifier: "user".into(),
            column: "a".into(),
            value: json!(1),
        });
        q.push(Predicate::Eq {
            qualifier: "user".into(),
            column: "b".into(),
            value: json!(2),
        });
        let (sql, _) = q.to_sql();
        assert!(sql.contains("`user`.`a` = ? AND `user`.`b` = ?"));
    }

    #[test]
    fn alias_is_reported_as_qualifier() {
        let q = SelectQuery::default().from("user", Some("u".into()));
        assert_eq!(q.qualifier_for("user"), Some("u"));
        assert_eq!(q.qualifier_for("order"), None);
    }

    #[test]
    fn window_renders_limit_offset() {
        let mut q = SelectQuery::new("user");
        q.limit(12);
        q.offset(24);
        let (sql, _) = q.to_sql();
        assert!(sql.ends_with("LIMIT 12 OFFSET 24"));
    }
}
