use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prop_schema::host::{Scalar, Vector};
use prop_schema::*;
use serde_json::json;

const TABLE_SCHEMA: &str = include_str!("../tests/fixtures/table_schema.json");

fn table_props() -> Value {
    let mut props = Value::from(json!({
        "id": "table",
        "optionalString": "bananas",
        "optionalEnum": "Photos",
        "optionalAny": {"a": [1, 2, 3]},
        "optionalObjectOf": {"one": 1, "two": 2, "three": 3},
        "optionalObjectWithShapeAndNestedDescription": {
            "color": "#431234",
            "fontSize": 2,
            "figure": {
                "data": [{"x": [1, 2, 3]}, {"y": [4, 5, 6]}],
                "layout": {"title": "bench"}
            }
        },
        "data-row": "7"
    }));
    if let Value::Map(map) = &mut props {
        let numbers: Vec<Value> = (0..1000).map(|i| Scalar::F64(i as f64).into()).collect();
        map.insert("optionalArrayOf".into(), Value::object(Vector { values: numbers }));
        map.insert("optionalNumber".into(), Scalar::I32(7).into());
    }
    props
}

fn load(c: &mut Criterion) {
    c.bench_function("load table schema", |b| {
        b.iter(|| Schema::from_json(black_box(TABLE_SCHEMA)))
    });
}

fn validate(c: &mut Criterion) {
    let schema = match Schema::from_json(TABLE_SCHEMA) {
        Ok(schema) => schema,
        Err(e) => panic!("bad fixture: {}", e),
    };
    let validator = match Validator::new(schema) {
        Ok(v) => v,
        Err(e) => panic!("bad fixture: {}", e),
    };
    let props = table_props();
    assert!(validator.validate_value(&props).is_ok());

    c.bench_function("validate table props", |b| {
        b.iter(|| validator.validate_value(black_box(&props)))
    });

    let children: Vec<Value> = (0..200)
        .map(|i| {
            Value::from(
                Component::new("Table", "TableComponents")
                    .prop("id", format!("row-{}", i))
                    .prop("children", vec![Value::from(i), "cell".into()]),
            )
        })
        .collect();
    let layout = Value::from(Component::new("Table", "TableComponents").prop("children", children));
    let registry = ComponentRegistry::new().register("TableComponents.Table", validator);
    assert!(registry.validate_layout(&layout).is_ok());

    c.bench_function("validate 200-row layout", |b| {
        b.iter(|| registry.validate_layout(black_box(&layout)))
    });
}

criterion_group!(benches, load, validate);
criterion_main!(benches);
