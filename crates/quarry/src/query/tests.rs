use super::*;
use crate::adapter::GenericDialect;
use crate::condition::Condition;

fn dialect() -> GenericDialect {
    GenericDialect::new()
}

#[test]
fn test_simple_select() {
    let stmt = Query::new("users").get_select_query(&dialect()).unwrap();
    assert_eq!(stmt.text(), "SELECT users.* FROM users");
    assert!(stmt.params().is_empty());
}

#[test]
fn test_select_with_columns() {
    let stmt = Query::new("users")
        .set_columns(["id", "name", "email"])
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT id, name, email FROM users");
}

#[test]
fn test_select_with_alias_uses_alias_star() {
    let stmt = Query::empty()
        .set_table("users", Some("u"))
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT u.* FROM users AS u");
}

#[test]
fn test_round_trip_scenario() {
    let d = dialect();
    let stmt = Query::new("users")
        .and_eq("active", true)
        .and_greater("age", 18)
        .order_by_dir("name", "ASC")
        .unwrap()
        .set_limit_offset(10, 20)
        .unwrap()
        .get_select_query(&d)
        .unwrap();

    assert_eq!(
        stmt.text(),
        "SELECT users.* FROM users WHERE active = ? AND age > ? ORDER BY name ASC LIMIT 10 OFFSET 20"
    );
    assert_eq!(stmt.params(), vec![Value::Bool(true), Value::Int(18)]);

    // The boolean coerces to 1 when the statement is rendered with literals.
    let rendered = stmt.render(&d).unwrap();
    assert_eq!(
        rendered,
        "SELECT users.* FROM users WHERE active = 1 AND age > 18 ORDER BY name ASC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_in_list_scenario() {
    let stmt = Query::new("t")
        .and_in("id", vec![1, 2, 3])
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT t.* FROM t WHERE id IN (?,?,?)");
    assert_eq!(
        stmt.params(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn test_delete_ignores_columns_and_order() {
    let stmt = Query::new("users")
        .add_column("name")
        .and_eq("id", 7)
        .order_by_dir("name", "DESC")
        .unwrap()
        .get_delete_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "DELETE FROM users WHERE id = ?");
    assert_eq!(stmt.params(), vec![Value::Int(7)]);
}

#[test]
fn test_missing_table_is_rejected() {
    let err = Query::empty().get_select_query(&dialect()).unwrap_err();
    assert!(err.is_missing_table());
}

// ==================== COUNT ====================

#[test]
fn test_plain_count_is_not_wrapped() {
    let stmt = Query::new("users")
        .and_eq("active", true)
        .get_count_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT count(0) FROM users WHERE active = ?");
}

#[test]
fn test_count_ignores_order_by() {
    let stmt = Query::new("users")
        .order_by_dir("name", "ASC")
        .unwrap()
        .get_count_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT count(0) FROM users");
}

#[test]
fn test_grouped_count_wraps_and_selects_group_columns() {
    let stmt = Query::new("orders")
        .group_by("customer_id")
        .get_count_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT count(0) FROM (SELECT customer_id FROM orders GROUP BY customer_id) AS a"
    );
}

#[test]
fn test_distinct_count_wraps() {
    let stmt = Query::new("users")
        .set_columns(["role"])
        .set_distinct(true)
        .get_count_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT count(0) FROM (SELECT DISTINCT role FROM users) AS a"
    );
}

#[test]
fn test_having_count_wraps_with_params() {
    let stmt = Query::new("orders")
        .group_by("customer_id")
        .set_having(Condition::new().and_greater("count(id)", 5))
        .get_count_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT count(0) FROM (SELECT customer_id FROM orders GROUP BY customer_id HAVING count(id) > ?) AS a"
    );
    assert_eq!(stmt.params(), vec![Value::Int(5)]);
}

#[test]
fn test_aggregate_column_count_keeps_aggregate_expressions() {
    let stmt = Query::new("orders")
        .set_columns(["sum(total)"])
        .get_count_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT count(0) FROM (SELECT sum(total) FROM orders) AS a"
    );
}

#[test]
fn test_needs_complex_count() {
    assert!(!Query::new("t").needs_complex_count());
    assert!(Query::new("t").group_by("a").needs_complex_count());
    assert!(Query::new("t").set_distinct(true).needs_complex_count());
    assert!(
        Query::new("t")
            .set_having(Condition::new().and_eq("a", 1))
            .needs_complex_count()
    );
    assert!(Query::new("t").add_column("max(a)").has_aggregates());
    assert!(!Query::new("t").add_column("a").has_aggregates());
}

// ==================== Joins ====================

#[test]
fn test_join_shorthand_detection() {
    let stmt = Query::new("orders")
        .add_join("orders.customer_id", "customers.id")
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT orders.* FROM orders JOIN customers ON orders.customer_id = customers.id"
    );
}

#[test]
fn test_join_without_shorthand_uses_raw_on() {
    let stmt = Query::new("users")
        .left_join("orders", "users.id = orders.user_id AND orders.open = 1")
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT users.* FROM users LEFT JOIN orders ON users.id = orders.user_id AND orders.open = 1"
    );
}

#[test]
fn test_join_degrades_to_comma_join() {
    let stmt = Query::new("users")
        .add_join_on("orders", OnClause::None, JoinKind::Inner)
        .unwrap()
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT users.* FROM users, orders");
}

#[test]
fn test_left_join_without_on_keeps_join_keyword() {
    let stmt = Query::new("users")
        .add_join_on("orders", OnClause::None, JoinKind::Left)
        .unwrap()
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT users.* FROM users LEFT JOIN orders ON 1 = 1"
    );
}

#[test]
fn test_joins_render_in_registration_order() {
    let stmt = Query::new("a")
        .add_join("a.b_id", "b.id")
        .add_join("a.c_id", "c.id")
        .get_select_query(&dialect())
        .unwrap();
    let b = stmt.text().find("JOIN b").unwrap();
    let c = stmt.text().find("JOIN c").unwrap();
    assert!(b < c);
}

// ==================== Extra tables ====================

#[test]
fn test_add_table_comma_separated() {
    let stmt = Query::new("users")
        .add_table("orders", Some("o"))
        .unwrap()
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT users.* FROM users, orders AS o");
}

#[test]
fn test_add_table_alias_matching_name_is_skipped() {
    let stmt = Query::new("users")
        .add_table("orders", Some("orders"))
        .unwrap()
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT users.* FROM users, orders");
}

#[test]
fn test_duplicate_alias_is_rejected() {
    let err = Query::new("users").add_table("users", None).unwrap_err();
    assert!(matches!(err, OrmError::DuplicateAlias(_)));

    let err = Query::empty()
        .set_table("users", Some("u"))
        .add_table("orders", Some("u"))
        .unwrap_err();
    assert!(matches!(err, OrmError::DuplicateAlias(_)));
}

// ==================== Nested queries ====================

#[test]
fn test_subquery_from_target_requires_alias() {
    let inner = Query::new("orders").and_eq("open", true);
    let err = Query::new(inner).get_select_query(&dialect()).unwrap_err();
    assert!(err.is_missing_table());
}

#[test]
fn test_subquery_from_target_with_alias() {
    let inner = Query::new("orders").and_eq("open", true);
    let stmt = Query::empty()
        .set_table(inner, Some("o"))
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT o.* FROM (SELECT orders.* FROM orders WHERE open = ?) AS o"
    );
    assert_eq!(stmt.params(), vec![Value::Bool(true)]);
}

#[test]
fn test_subquery_operand_needs_no_alias() {
    let sub = Query::new("orders").set_columns(["customer_id"]);
    let stmt = Query::new("customers")
        .and_subquery("id", Operator::In, sub)
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT customers.* FROM customers WHERE id IN (SELECT customer_id FROM orders)"
    );
}

#[test]
fn test_subquery_operand_without_table_is_rejected() {
    let sub = Query::empty();
    let err = Query::new("customers")
        .and_subquery("id", Operator::In, sub)
        .get_select_query(&dialect())
        .unwrap_err();
    assert!(err.is_missing_table());
}

#[test]
fn test_multi_row_subquery_rewrites_equality_to_in() {
    let sub = Query::new("orders").set_columns(["customer_id"]);
    let stmt = Query::new("customers")
        .and_subquery("id", Operator::Equal, sub)
        .get_select_query(&dialect())
        .unwrap();
    assert!(stmt.text().contains("id IN (SELECT"));
}

#[test]
fn test_single_row_subquery_keeps_equality() {
    let sub = Query::new("orders")
        .set_columns(["max(id)"])
        .set_limit(1)
        .unwrap();
    let stmt = Query::new("customers")
        .and_subquery("last_order_id", Operator::Equal, sub)
        .get_select_query(&dialect())
        .unwrap();
    assert!(stmt.text().contains("last_order_id = (SELECT"));
}

// ==================== Parameter ordering ====================

#[test]
fn test_params_follow_placeholder_order_across_clauses() {
    let on = Condition::new()
        .and_columns("orders.customer_id", Operator::Equal, "customers.id")
        .and_eq("orders.status", "open");
    let stmt = Query::new("customers")
        .add_join_object(Join::new("orders", on, JoinKind::Inner))
        .and_eq("customers.active", true)
        .group_by("customers.id")
        .set_having(Condition::new().and_greater("count(orders.id)", 3))
        .get_select_query(&dialect())
        .unwrap();

    assert_eq!(
        stmt.params(),
        vec![
            Value::Text("open".to_string()),
            Value::Bool(true),
            Value::Int(3)
        ]
    );
    assert_eq!(stmt.placeholder_count(), stmt.param_count());
}

#[test]
fn test_render_is_idempotent() {
    let query = Query::new("users").and_eq("id", 1);
    let first = query.render(&dialect()).unwrap();
    let second = query.render(&dialect()).unwrap();
    assert_eq!(first, second);
}

// ==================== Validation ====================

#[test]
fn test_invalid_sort_direction() {
    let err = Query::new("users")
        .order_by_dir("name", "sideways")
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidSortDirection(_)));
}

#[test]
fn test_sort_direction_is_case_insensitive() {
    let stmt = Query::new("users")
        .order_by_dir("name", "desc")
        .unwrap()
        .get_select_query(&dialect())
        .unwrap();
    assert!(stmt.text().ends_with("ORDER BY name DESC"));
}

#[test]
fn test_negative_limit_and_offset_are_rejected() {
    assert!(matches!(
        Query::new("users").set_limit(-1).unwrap_err(),
        OrmError::InvalidArgument(_)
    ));
    assert!(matches!(
        Query::new("users").set_offset(-5).unwrap_err(),
        OrmError::InvalidArgument(_)
    ));
    assert!(matches!(
        Query::new("users").paginate(0, 10).unwrap_err(),
        OrmError::InvalidArgument(_)
    ));
}

#[test]
fn test_paginate() {
    let stmt = Query::new("users")
        .paginate(3, 25)
        .unwrap()
        .get_select_query(&dialect())
        .unwrap();
    assert!(stmt.text().ends_with("LIMIT 25 OFFSET 50"));
}

#[test]
fn test_distinct_select() {
    let stmt = Query::new("users")
        .set_columns(["role"])
        .set_distinct(true)
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(stmt.text(), "SELECT DISTINCT role FROM users");
}

#[test]
fn test_raw_from_fragment_passes_through() {
    let stmt = Query::new("users u, profiles p")
        .and_columns("u.id", Operator::Equal, "p.user_id")
        .get_select_query(&dialect())
        .unwrap();
    assert_eq!(
        stmt.text(),
        "SELECT * FROM users u, profiles p WHERE u.id = p.user_id"
    );
}
