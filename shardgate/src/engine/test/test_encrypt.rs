use super::setup::*;
use crate::engine::Engine;
use crate::rewrite;
use crate::statement::*;
use crate::Error;

fn aes(engine: &Engine, plain: &str) -> Value {
    engine
        .rules()
        .encrypt
        .column("t_user", "pwd")
        .unwrap()
        .encrypt(&Value::from(plain))
        .unwrap()
}

fn md5(engine: &Engine, plain: &str) -> Value {
    let (_, assisted) = engine
        .rules()
        .encrypt
        .column("t_user", "name")
        .unwrap()
        .assisted(&Value::from(plain))
        .unwrap()
        .unwrap();
    assisted
}

fn select(sql: &Sql, projections: ProjectionsSegment, condition: Expression) -> Statement {
    Statement::Select(SelectStatement {
        projections,
        from: vec![TableSource::Table(sql.table("t_user", 0))],
        where_clause: sql.where_clause(condition),
        ..Default::default()
    })
}

#[test]
fn test_equality_and_projection() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new("SELECT pwd FROM t_user WHERE pwd = 'a'");
    let projections = sql.projections(vec![Projection::Column {
        column: sql.column("pwd", 0),
        alias: None,
    }]);
    let statement = select(
        &sql,
        projections,
        sql.eq(sql.col("pwd", 1), sql.string("a", 0)),
    );

    let context = process(&engine, &sql, statement, vec![]).unwrap();

    assert_eq!(context.units[0].data_source, "ds_0");
    assert_eq!(
        sqls(&context),
        vec![format!(
            "SELECT pwd_cipher AS pwd FROM t_user WHERE pwd_cipher = {}",
            aes(&engine, "a")
        )]
    );
}

#[test]
fn test_in_list_keeps_order() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new("SELECT * FROM t_user WHERE pwd IN ('b', 'a')");
    let statement = select(
        &sql,
        sql.star(),
        sql.in_list(
            sql.col("pwd", 0),
            vec![sql.string("b", 0), sql.string("a", 0)],
            false,
        ),
    );

    let context = process(&engine, &sql, statement, vec![]).unwrap();

    assert_eq!(
        sqls(&context),
        vec![format!(
            "SELECT * FROM t_user WHERE pwd_cipher IN ({}, {})",
            aes(&engine, "b"),
            aes(&engine, "a")
        )]
    );
}

#[test]
fn test_assisted_query_parameter() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new("SELECT * FROM t_user WHERE name = ? AND user_id = ?");
    let condition = Expression::and(
        sql.eq(sql.col("name", 0), sql.param(0)),
        sql.eq(sql.col("user_id", 0), sql.param(1)),
    );
    let statement = select(&sql, sql.star(), condition);

    let context = process(
        &engine,
        &sql,
        statement,
        vec![Value::from("bob"), Value::Integer(7)],
    )
    .unwrap();

    let unit = &context.units[0].sql_unit;
    assert_eq!(
        unit.sql,
        "SELECT * FROM t_user WHERE name_assisted = ? AND user_id = ?"
    );
    assert_eq!(unit.parameters, vec![md5(&engine, "bob"), Value::Integer(7)]);
}

#[test]
fn test_is_null() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new("SELECT * FROM t_user WHERE pwd IS NULL");
    let null = Expression::Literal {
        value: Value::Null,
        span: sql.span("NULL", 0),
    };
    let statement = select(&sql, sql.star(), sql.compare(sql.col("pwd", 0), "IS", null));

    let context = process(&engine, &sql, statement, vec![]).unwrap();
    assert_eq!(
        sqls(&context),
        vec!["SELECT * FROM t_user WHERE pwd_cipher IS NULL"]
    );
}

#[test]
fn test_unsupported_predicates() {
    let engine = engine(ENCRYPT);

    let sql = Sql::new("SELECT * FROM t_user WHERE pwd LIKE 'a'");
    let statement = select(
        &sql,
        sql.star(),
        sql.compare(sql.col("pwd", 0), "LIKE", sql.string("a", 0)),
    );
    let err = process(&engine, &sql, statement, vec![]).unwrap_err();
    assert!(matches!(
        err,
        Error::Rewrite(rewrite::Error::UnsupportedEncryptPredicate { ref operator, .. })
            if operator == "LIKE"
    ));

    let sql = Sql::new("SELECT * FROM t_user WHERE 'a' = pwd");
    let statement = select(
        &sql,
        sql.star(),
        sql.eq(sql.string("a", 0), sql.col("pwd", 0)),
    );
    let err = process(&engine, &sql, statement, vec![]).unwrap_err();
    assert!(matches!(
        err,
        Error::Rewrite(rewrite::Error::UnsupportedEncryptPredicate { .. })
    ));
}

#[test]
fn test_update_assignment() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new("UPDATE t_user SET name = ? WHERE user_id = ?");
    let assignment = AssignmentSegment {
        column: sql.column("name", 0),
        value: sql.param(0),
        span: Span::new(sql.span("name", 0).start, sql.span("?", 0).stop),
    };
    let statement = Statement::Update(UpdateStatement {
        table: sql.table("t_user", 0),
        assignments: vec![assignment],
        where_clause: sql.where_clause(sql.eq(sql.col("user_id", 0), sql.param(1))),
    });

    let context = process(
        &engine,
        &sql,
        statement,
        vec![Value::from("bob"), Value::Integer(7)],
    )
    .unwrap();

    let unit = &context.units[0].sql_unit;
    assert_eq!(
        unit.sql,
        "UPDATE t_user SET name_cipher = ?, name_assisted = ? WHERE user_id = ?"
    );
    let cipher = engine
        .rules()
        .encrypt
        .column("t_user", "name")
        .unwrap()
        .encrypt(&Value::from("bob"))
        .unwrap();
    assert_eq!(
        unit.parameters,
        vec![cipher, md5(&engine, "bob"), Value::Integer(7)]
    );
}

#[test]
fn test_insert_encrypted_columns() {
    let engine = engine(ENCRYPT);
    let sql = Sql::new("INSERT INTO t_user (user_id, name) VALUES (1, 'bob')");
    let statement = Statement::Insert(sql.insert("t_user", &["user_id", "name"]));

    let context = process(&engine, &sql, statement, vec![]).unwrap();

    let cipher = engine
        .rules()
        .encrypt
        .column("t_user", "name")
        .unwrap()
        .encrypt(&Value::from("bob"))
        .unwrap();
    assert_eq!(
        sqls(&context),
        vec![format!(
            "INSERT INTO t_user (user_id, name_cipher, name_assisted) VALUES (1, {}, {})",
            cipher,
            md5(&engine, "bob")
        )]
    );
}

#[test]
fn test_decrypt_roundtrip() {
    let engine = engine(ENCRYPT);
    let rule = engine.rules().encrypt.column("t_user", "pwd").unwrap();
    let cipher = rule.encrypt(&Value::from("secret")).unwrap();
    assert_eq!(rule.encryptor.decrypt(&cipher).unwrap(), Value::from("secret"));
}
