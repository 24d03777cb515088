use ingot::{
    extract, flatten, ingest, ingest_reader, resolve, ColumnType, ExtractError, IngestConfig,
    JsonKind, Scalar, TypedCell,
};
use serde_json::{json, Value};
use std::fs::File;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn column_names(table: &ingot::TypedTable) -> Vec<&str> {
    table.columns().iter().map(|c| c.name()).collect()
}

#[test]
fn nested_records_resolve_end_to_end() {
    let input = json!([
        {"id": 1, "addr": {"city": "NYC", "zip": null}},
        {"id": 2, "addr": {"city": "LA", "zip": "90001"}}
    ]);

    let records = extract(input).unwrap();
    assert_eq!(records.len(), 2);

    let flat = flatten(records);
    assert_eq!(flat.columns(), &["id", "addr.city", "addr.zip"]);

    let table = resolve(flat);
    assert_eq!(table.column_type("id"), Some(ColumnType::Integer));
    assert_eq!(table.column_type("addr.city"), Some(ColumnType::String));
    assert_eq!(table.column_type("addr.zip"), Some(ColumnType::String));

    let zip = table.column("addr.zip").unwrap();
    assert_eq!(zip.get(0), Some(&TypedCell::Null));
    assert_eq!(zip.get(1), Some(&TypedCell::String("90001".to_string())));
}

#[test]
fn single_object_with_all_null_column() {
    let input = json!({"name": "x", "score": null});

    let records = extract(input).unwrap();
    assert_eq!(records.len(), 1);

    let flat = flatten(records);
    assert_eq!(flat.columns(), &["name", "score"]);
    assert_eq!(flat.get(0, "score"), Some(&Scalar::Null));

    let table = resolve(flat);
    let score = table.column("score").unwrap();
    assert_eq!(score.column_type(), ColumnType::String);
    assert_eq!(score.cells(), &[TypedCell::Null]);
}

#[test]
fn data_envelope_takes_precedence() {
    let records = extract(json!({"data": [{"a": 1}]})).unwrap();
    let records = records.into_inner();
    assert_eq!(records.len(), 1);
    assert_eq!(Value::Object(records[0].clone()), json!({"a": 1}));
}

#[test]
fn unrecognized_shape_reports_kind() {
    let err = ingest(json!(true), &IngestConfig::default()).unwrap_err();
    assert_eq!(err, ExtractError::UnrecognizedShape(JsonKind::Boolean));
    assert!(err.to_string().contains("boolean"));
}

#[test]
fn sample_api_response_fixture() {
    let file = File::open(fixture("sample_api_response.json")).unwrap();
    let table = ingest_reader(file, &IngestConfig::default()).unwrap();

    assert_eq!(table.num_rows(), 3);
    assert_eq!(
        column_names(&table),
        vec![
            "id",
            "name",
            "active",
            "profile.email",
            "profile.address.city",
            "profile.address.zipcode",
            "profile.address.geo.lat",
            "profile.address.geo.lng",
            "tags.0",
            "tags.1",
            "last_login",
        ]
    );

    assert_eq!(table.column_type("active"), Some(ColumnType::Boolean));
    assert_eq!(table.column_type("profile.address.geo.lat"), Some(ColumnType::Float));
    // -34 next to fractional longitudes
    assert_eq!(table.column_type("profile.address.geo.lng"), Some(ColumnType::Float));
    assert_eq!(
        table.column("profile.address.geo.lng").unwrap().get(1),
        Some(&TypedCell::Float(-34.0))
    );
    // 90566 next to "92998-3874"
    assert_eq!(table.column_type("profile.address.zipcode"), Some(ColumnType::String));
    assert_eq!(
        table.column("profile.address.zipcode").unwrap().get(1),
        Some(&TypedCell::String("90566".to_string()))
    );
    assert_eq!(table.column_type("last_login"), Some(ColumnType::String));
    assert_eq!(table.column("last_login").unwrap().null_count(), 3);
    assert_eq!(
        table.column("tags.1").unwrap().cells(),
        &[
            TypedCell::String("beta".to_string()),
            TypedCell::Null,
            TypedCell::Null
        ]
    );
}

#[test]
fn every_non_null_cell_matches_its_column_type() {
    let file = File::open(fixture("sample_api_response.json")).unwrap();
    let table = ingest_reader(file, &IngestConfig::default()).unwrap();

    for column in table.columns() {
        assert_eq!(column.cells().len(), table.num_rows());
        for cell in column.cells() {
            let matches = match (column.column_type(), cell) {
                (_, TypedCell::Null) => true,
                (ColumnType::Boolean, TypedCell::Boolean(_)) => true,
                (ColumnType::Integer, TypedCell::Integer(_)) => true,
                (ColumnType::Float, TypedCell::Float(_)) => true,
                (ColumnType::String, TypedCell::String(_)) => true,
                _ => false,
            };
            assert!(matches, "{} holds {:?}", column.name(), cell);
        }
    }
}
