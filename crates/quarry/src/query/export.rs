//! Simplified key-value export for adapters that cannot express full SQL.
//!
//! REST-style backends take a flat filter list, not arbitrary SQL. A query
//! exports only when it is structurally flat: one named table, AND-connected
//! column/value predicates, ordering, and a limit window. Everything else is
//! an [`OrmError::ExportUnsupported`].

use crate::condition::{Connector, ExportClause, Operand, Operator, QuoteMode};
use crate::error::{OrmError, OrmResult};
use crate::query::{Query, TableRef};
use serde::Serialize;

/// One exported predicate.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFilter {
    pub column: String,
    pub op: String,
    pub value: serde_json::Value,
}

/// One exported ordering entry.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOrder {
    pub column: String,
    pub direction: String,
}

/// The flat, adapter-neutral form of a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryExport {
    pub table: String,
    pub filters: Vec<ExportFilter>,
    pub order: Vec<ExportOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Query {
    /// Export this query as a flat key-value representation.
    ///
    /// Fails with [`OrmError::ExportUnsupported`] when the query carries
    /// joins, extra tables, grouping, having, distinct, OR-connected
    /// clauses, or operands that are not plain column/value predicates.
    pub fn export(&self) -> OrmResult<QueryExport> {
        if !self.joins.is_empty() {
            return Err(OrmError::ExportUnsupported("query has joins".into()));
        }
        if !self.extra_tables.is_empty() {
            return Err(OrmError::ExportUnsupported("query has extra tables".into()));
        }
        if !self.group_by.is_empty() {
            return Err(OrmError::ExportUnsupported("query has grouping".into()));
        }
        if self.having.is_some() {
            return Err(OrmError::ExportUnsupported(
                "query has a having clause".into(),
            ));
        }
        if self.distinct {
            return Err(OrmError::ExportUnsupported("query is distinct".into()));
        }

        let table = match &self.table {
            Some(TableRef::Name(ident)) => ident.to_sql(),
            Some(_) => {
                return Err(OrmError::ExportUnsupported(
                    "only a named table can be exported".into(),
                ));
            }
            None => return Err(OrmError::missing_table("query has no table set")),
        };

        let mut filters = Vec::new();
        for clause in self.where_clause.export_clauses() {
            let ExportClause::Predicate {
                connector,
                left,
                operator,
                right,
                quote,
            } = clause
            else {
                return Err(OrmError::ExportUnsupported(
                    "nested conditions and raw fragments cannot be exported".into(),
                ));
            };
            if connector == Connector::Or {
                return Err(OrmError::ExportUnsupported(
                    "OR-connected clauses cannot be exported".into(),
                ));
            }
            if quote != QuoteMode::Right {
                return Err(OrmError::ExportUnsupported(
                    "only value-binding predicates can be exported".into(),
                ));
            }
            let Operand::Column(column) = left else {
                return Err(OrmError::ExportUnsupported(
                    "only column left-hand operands can be exported".into(),
                ));
            };
            let value = match right {
                Operand::Value(v) => serde_json::Value::from(v),
                Operand::List(vs) => {
                    serde_json::Value::Array(vs.iter().map(serde_json::Value::from).collect())
                }
                _ => {
                    return Err(OrmError::ExportUnsupported(
                        "sub-queries and fragments cannot be exported".into(),
                    ));
                }
            };
            filters.push(ExportFilter {
                column: column.clone(),
                op: export_op(operator).to_string(),
                value,
            });
        }

        let order = self
            .order_by
            .iter()
            .map(|(column, direction)| ExportOrder {
                column: column.clone(),
                direction: (*direction)
                    .map(|d| d.as_sql())
                    .unwrap_or("ASC")
                    .to_string(),
            })
            .collect();

        Ok(QueryExport {
            table,
            filters,
            order,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

fn export_op(operator: Operator) -> &'static str {
    match operator {
        Operator::Equal => "eq",
        Operator::NotEqual | Operator::AltNotEqual => "ne",
        Operator::GreaterThan => "gt",
        Operator::GreaterEqual => "gte",
        Operator::LessThan => "lt",
        Operator::LessEqual => "lte",
        Operator::Like => "like",
        Operator::NotLike => "not_like",
        Operator::In => "in",
        Operator::NotIn => "not_in",
        Operator::Between => "between",
        Operator::IsNull => "is_null",
        Operator::IsNotNull => "is_not_null",
        Operator::Contains => "contains",
        Operator::BeginsWith => "begins_with",
        Operator::EndsWith => "ends_with",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_query_exports() {
        let export = Query::new("users")
            .and_eq("active", true)
            .and_greater("age", 18)
            .order_by_dir("name", "desc")
            .unwrap()
            .set_limit_offset(10, 20)
            .unwrap()
            .export()
            .unwrap();

        assert_eq!(export.table, "users");
        assert_eq!(export.filters.len(), 2);
        assert_eq!(export.filters[0].column, "active");
        assert_eq!(export.filters[0].op, "eq");
        assert_eq!(export.filters[0].value, serde_json::json!(true));
        assert_eq!(export.filters[1].op, "gt");
        assert_eq!(export.order[0].direction, "DESC");
        assert_eq!(export.limit, Some(10));
        assert_eq!(export.offset, 20);
    }

    #[test]
    fn in_list_exports_as_array() {
        let export = Query::new("users")
            .and_in("id", vec![1, 2, 3])
            .export()
            .unwrap();
        assert_eq!(export.filters[0].op, "in");
        assert_eq!(export.filters[0].value, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn join_is_not_exportable() {
        let err = Query::new("users")
            .add_join("users.id", "orders.user_id")
            .export()
            .unwrap_err();
        assert!(err.is_export_unsupported());
    }

    #[test]
    fn or_clause_is_not_exportable() {
        let err = Query::new("users")
            .and_eq("a", 1)
            .or_eq("b", 2)
            .export()
            .unwrap_err();
        assert!(err.is_export_unsupported());
    }

    #[test]
    fn grouping_is_not_exportable() {
        let err = Query::new("users").group_by("role").export().unwrap_err();
        assert!(err.is_export_unsupported());
    }

    #[test]
    fn null_value_exports() {
        let export = Query::new("users").and_null("deleted_at").export().unwrap();
        assert_eq!(export.filters[0].op, "is_null");
        assert_eq!(export.filters[0].value, serde_json::Value::Null);
    }

    #[test]
    fn serializes_to_json() {
        let export = Query::new("users").and_eq("id", 7).export().unwrap();
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["table"], "users");
        assert_eq!(json["filters"][0]["op"], "eq");
    }
}
