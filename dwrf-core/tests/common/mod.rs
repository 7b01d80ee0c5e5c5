#![allow(dead_code)]

use std::path::Path;

use dwrf_core::codec::CompressionKind;
use dwrf_core::{DataType, Field, Row, Value, Writer, WriterOptions};

fn inner_type() -> DataType {
    DataType::Struct(vec![
        Field::new("int1", DataType::Int),
        Field::new("string1", DataType::String),
    ])
}

/// Six columns mixing scalars with nested lists, maps and structs.
pub fn really_big_row_fields() -> Vec<Field> {
    vec![
        Field::new("boolean1", DataType::Boolean),
        Field::new("long1", DataType::Long),
        Field::new("bytes1", DataType::Binary),
        Field::new(
            "middle",
            DataType::Struct(vec![Field::new("list", DataType::list(inner_type()))]),
        ),
        Field::new("list", DataType::list(inner_type())),
        Field::new("map", DataType::map(DataType::String, inner_type())),
    ]
}

fn inner(i: i64, j: i64) -> Value {
    Value::Struct(vec![
        Value::Int((i * 10 + j) as i32),
        Value::String(format!("row {i} item {j}")),
    ])
}

pub fn really_big_row(i: i64) -> Row {
    Row::from_values(vec![
        Value::Boolean(i % 2 == 0),
        Value::Long(i),
        Value::Binary(vec![(i % 256) as u8; (i % 7) as usize]),
        Value::Struct(vec![Value::List(vec![inner(i, 0), inner(i, 1)])]),
        Value::List((0..i % 3).map(|j| inner(i, j)).collect()),
        Value::Map(vec![(Value::String(format!("key{i}")), inner(i, 9))]),
    ])
}

/// Write `rows` really-big rows, `stripe_rows` per stripe. Returns the file length.
pub fn write_fixture(path: &Path, rows: i64, stripe_rows: usize, compression: CompressionKind) -> u64 {
    let opts = WriterOptions {
        stripe_rows,
        compression,
        deterministic: true,
        ..Default::default()
    };
    let mut w = Writer::create(path, really_big_row_fields(), opts).unwrap();
    for i in 0..rows {
        w.add_row(&really_big_row(i)).unwrap();
    }
    w.close().unwrap()
}
