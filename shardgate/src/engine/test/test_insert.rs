use super::setup::*;
use crate::router::RouteType;
use crate::statement::*;

#[test]
fn test_split_rows_between_units() {
    let engine = engine(SINGLE);
    let sql = Sql::new("INSERT INTO t_order (order_id, status) VALUES (?, ?), (?, ?), (?, ?)");
    let statement = Statement::Insert(sql.insert("t_order", &["order_id", "status"]));
    let parameters = vec![
        Value::Integer(1),
        Value::from("a"),
        Value::Integer(2),
        Value::from("b"),
        Value::Integer(5),
        Value::from("c"),
    ];

    let context = process(&engine, &sql, statement, parameters).unwrap();

    assert_eq!(context.route_context.route_type, RouteType::Standard);
    assert_eq!(context.units.len(), 2);

    let first = &context.units[0].sql_unit;
    assert_eq!(
        first.sql,
        "INSERT INTO t_order_1 (order_id, status) VALUES (?, ?), (?, ?)"
    );
    assert_eq!(
        first.parameters,
        vec![
            Value::Integer(1),
            Value::from("a"),
            Value::Integer(5),
            Value::from("c"),
        ]
    );

    let second = &context.units[1].sql_unit;
    assert_eq!(second.sql, "INSERT INTO t_order_2 (order_id, status) VALUES (?, ?)");
    assert_eq!(second.parameters, vec![Value::Integer(2), Value::from("b")]);
}

#[test]
fn test_split_literal_rows() {
    let engine = engine(SINGLE);
    let sql = Sql::new("INSERT INTO t_order (order_id, status) VALUES (4, 'x'), (7, 'y'), (8, 'z')");
    let statement = Statement::Insert(sql.insert("t_order", &["order_id", "status"]));

    let context = process(&engine, &sql, statement, vec![]).unwrap();

    assert_eq!(
        sqls(&context),
        vec![
            "INSERT INTO t_order_0 (order_id, status) VALUES (4, 'x'), (8, 'z')",
            "INSERT INTO t_order_3 (order_id, status) VALUES (7, 'y')",
        ]
    );
}

#[test]
fn test_rows_on_one_unit() {
    let engine = engine(SINGLE);
    let sql = Sql::new("INSERT INTO t_order (order_id, status) VALUES (1, 'x'), (5, 'y')");
    let statement = Statement::Insert(sql.insert("t_order", &["order_id", "status"]));

    let context = process(&engine, &sql, statement, vec![]).unwrap();

    assert_eq!(
        sqls(&context),
        vec!["INSERT INTO t_order_1 (order_id, status) VALUES (1, 'x'), (5, 'y')"]
    );
}

#[test]
fn test_generated_key_literal() {
    let engine = engine(SINGLE);
    let sql = Sql::new("INSERT INTO t_order_item (order_id, status) VALUES (1, 'x')");
    let statement = Statement::Insert(sql.insert("t_order_item", &["order_id", "status"]));

    let context = process(&engine, &sql, statement, vec![]).unwrap();

    let generated = context.route_context.generated_keys.as_ref().unwrap();
    assert_eq!(generated.column, "item_id");
    assert_eq!(generated.values.len(), 1);
    assert_eq!(
        sqls(&context),
        vec![format!(
            "INSERT INTO t_order_item_1 (order_id, status, item_id) VALUES (1, 'x', {})",
            generated.values[0]
        )]
    );
}

#[test]
fn test_generated_key_parameter() {
    let engine = engine(SINGLE);
    let sql = Sql::new("INSERT INTO t_order_item (order_id, status) VALUES (?, ?)");
    let statement = Statement::Insert(sql.insert("t_order_item", &["order_id", "status"]));

    let context = process(
        &engine,
        &sql,
        statement,
        vec![Value::Integer(2), Value::from("x")],
    )
    .unwrap();

    let generated = context.route_context.generated_keys.as_ref().unwrap();
    let unit = &context.units[0].sql_unit;
    assert_eq!(
        unit.sql,
        "INSERT INTO t_order_item_2 (order_id, status, item_id) VALUES (?, ?, ?)"
    );
    assert_eq!(
        unit.parameters,
        vec![Value::Integer(2), Value::from("x"), generated.values[0].clone()]
    );
}

#[test]
fn test_generated_sharding_key() {
    let engine = engine(SINGLE);
    let sql = Sql::new("INSERT INTO t_order (status) VALUES ('x')");
    let statement = Statement::Insert(sql.insert("t_order", &["status"]));

    let context = process(&engine, &sql, statement, vec![]).unwrap();

    let generated = context.route_context.generated_keys.as_ref().unwrap();
    let Value::Integer(key) = generated.values[0] else {
        panic!("snowflake keys are integers");
    };
    assert!(key > 0);
    assert_eq!(
        sqls(&context),
        vec![format!(
            "INSERT INTO t_order_{} (status, order_id) VALUES ('x', {})",
            key % 4,
            key
        )]
    );
}

#[test]
fn test_broadcast_insert() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new("INSERT INTO t_config (name) VALUES ('x')");
    let statement = Statement::Insert(sql.insert("t_config", &["name"]));

    // Not a broadcast table here: default data source.
    let context = process(&engine, &sql, statement.clone(), vec![]).unwrap();
    assert_eq!(context.route_context.route_type, RouteType::Default);
    assert_eq!(context.units.len(), 1);

    let engine = engine_with(ENCRYPT, |config| {
        config.broadcast_tables.push("t_config".into())
    });
    let context = process(&engine, &sql, statement, vec![]).unwrap();
    assert_eq!(context.route_context.route_type, RouteType::DatabaseBroadcast);
    assert_eq!(
        context
            .units
            .iter()
            .map(|u| u.data_source.as_str())
            .collect::<Vec<_>>(),
        vec!["ds_0", "ds_1"]
    );
    assert_eq!(
        sqls(&context),
        vec![
            "INSERT INTO t_config (name) VALUES ('x')",
            "INSERT INTO t_config (name) VALUES ('x')",
        ]
    );
}

#[test]
fn test_insert_across_data_sources() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new(
        "INSERT INTO t_order (user_id, order_id) VALUES (?, ?), (?, ?), (?, ?)",
    );
    let statement = Statement::Insert(sql.insert("t_order", &["user_id", "order_id"]));
    let parameters = [1, 10, 2, 11, 3, 13].map(Value::Integer).to_vec();

    let context = process(&engine, &sql, statement, parameters).unwrap();

    let routed: Vec<(&str, &str)> = context
        .units
        .iter()
        .map(|u| (u.data_source.as_str(), u.sql_unit.sql.as_str()))
        .collect();
    assert_eq!(
        routed,
        vec![
            ("ds_1", "INSERT INTO t_order_0 (user_id, order_id) VALUES (?, ?)"),
            ("ds_1", "INSERT INTO t_order_1 (user_id, order_id) VALUES (?, ?)"),
            ("ds_0", "INSERT INTO t_order_1 (user_id, order_id) VALUES (?, ?)"),
        ]
    );
    assert_eq!(
        context.units[2].sql_unit.parameters,
        vec![Value::Integer(2), Value::Integer(11)]
    );
}
