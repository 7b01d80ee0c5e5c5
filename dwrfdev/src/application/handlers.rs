use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use dwrf_core::codec::CompressionKind;
use dwrf_core::error::Result;
use dwrf_core::projection::READ_COLUMN_IDS_CONF_STR;
use dwrf_core::sniff;
use dwrf_core::types::TypeKind;
use dwrf_core::{
    DataType, DwrfInputFormat, Field, FileSplit, Opened, Reader, RecordReader, Row, ScanConf,
    TypeTree, Value, Writer, WriterOptions,
};
use rayon::prelude::*;
use tracing::info;

fn sample_fields() -> Vec<Field> {
    vec![
        Field::new("id", DataType::Long),
        Field::new("name", DataType::String),
        Field::new("score", DataType::Double),
        Field::new("tags", DataType::list(DataType::String)),
        Field::new("attrs", DataType::map(DataType::String, DataType::Int)),
        Field::new(
            "point",
            DataType::Struct(vec![
                Field::new("x", DataType::Int),
                Field::new("y", DataType::Int),
            ]),
        ),
    ]
}

fn sample_row(i: u64) -> Row {
    let n = i as i64;
    Row::from_values(vec![
        Value::Long(n),
        if i % 10 == 9 {
            Value::Null
        } else {
            Value::String(format!("name-{i}"))
        },
        Value::Double(n as f64 / 8.0),
        Value::List((0..i % 4).map(|t| Value::String(format!("t{t}"))).collect()),
        Value::Map(vec![(Value::String("bucket".into()), Value::Int((i % 16) as i32))]),
        Value::Struct(vec![Value::Int((n % 100) as i32), Value::Int((n / 100) as i32)]),
    ])
}

pub fn handle_gen(
    out: PathBuf,
    rows: u64,
    stripe_rows: usize,
    compression: String,
    deterministic: bool,
) -> Result<()> {
    let opts = WriterOptions {
        stripe_rows,
        compression: compression.parse::<CompressionKind>()?,
        deterministic,
        ..Default::default()
    };
    let mut w = Writer::create(&out, sample_fields(), opts)?;
    for i in 0..rows {
        w.add_row(&sample_row(i))?;
    }
    let len = w.close()?;
    eprintln!("gen: {rows} rows, {len} bytes -> {}", out.display());
    Ok(())
}

pub fn handle_meta(file: PathBuf) -> Result<()> {
    let f = Opened::open(&file)?;
    println!("schema:      {}", f.types());
    println!("rows:        {}", f.row_count());
    println!("compression: {:?}", f.compression());
    println!("writer:      {}", f.footer.meta.writer);
    println!("length:      {}", f.file_len);
    for (i, s) in f.stripes().iter().enumerate() {
        println!(
            "stripe #{:<4} off={:<10} len={:<10} rows={}",
            i, s.offset, s.length, s.rows
        );
    }
    Ok(())
}

pub fn handle_scan(
    mut conf: ScanConf,
    file: PathBuf,
    start: u64,
    len: Option<u64>,
    columns: Option<String>,
    limit: Option<u64>,
) -> Result<()> {
    if let Some(columns) = columns {
        conf.set(READ_COLUMN_IDS_CONF_STR, &columns)?;
    }
    let len = match len {
        Some(l) => l,
        None => std::fs::metadata(&file)?.len().saturating_sub(start),
    };
    let format = DwrfInputFormat::new(conf);
    let mut reader = format.record_reader(&FileSplit::new(file, start, len))?;
    let types = reader.types().clone();

    let (mut key, mut value) = (reader.create_key(), reader.create_value());
    let mut out = std::io::stdout().lock();
    let mut line = String::new();
    let mut n = 0u64;
    while limit.is_none_or(|l| n < l) && reader.next(&mut key, &mut value)? {
        line.clear();
        render_row(&types, &value, &mut line);
        writeln!(out, "{line}")?;
        n += 1;
    }
    eprintln!(
        "scan: {n} rows, pos={} progress={:.3}",
        reader.pos(),
        reader.progress()
    );
    reader.close()
}

pub fn handle_splits(conf: ScanConf, inputs: Vec<PathBuf>, num_splits: usize) -> Result<()> {
    let format = DwrfInputFormat::new(conf);
    let files = format.list_status(&inputs)?;
    for split in format.splits(&files, num_splits)? {
        println!("{split}");
    }
    Ok(())
}

pub fn handle_count(conf: ScanConf, inputs: Vec<PathBuf>, num_splits: usize) -> Result<()> {
    let format = DwrfInputFormat::new(conf);
    let files = format.list_status(&inputs)?;
    let splits = format.splits(&files, num_splits)?;

    // Each split gets its own reader; readers are not shared across threads.
    let counts = splits
        .par_iter()
        .map(|split| -> Result<u64> {
            let mut reader = format.record_reader(split)?;
            let (mut key, mut value) = (reader.create_key(), reader.create_value());
            let mut n = 0u64;
            while reader.next(&mut key, &mut value)? {
                n += 1;
            }
            reader.close()?;
            info!(split = %split, rows = n, "split done");
            Ok(n)
        })
        .collect::<Result<Vec<_>>>()?;

    println!(
        "{} rows in {} file(s), {} split(s)",
        counts.iter().sum::<u64>(),
        files.len(),
        splits.len()
    );
    Ok(())
}

pub fn handle_validate(conf: ScanConf, inputs: Vec<PathBuf>) -> Result<()> {
    let format = DwrfInputFormat::new(conf);
    let files = format.list_status(&inputs)?;
    if format.validate_input(&files) {
        println!("valid: {} file(s)", files.len());
        Ok(())
    } else {
        println!("invalid: {} file(s) checked", files.len());
        std::process::exit(1);
    }
}

pub fn handle_sniff(file: PathBuf) -> Result<()> {
    let d = sniff::diagnose(&file)?;
    println!("orc:    {}", d.looks_like_orc);
    println!("header: {}", d.header.to_hex());
    println!("text:   {:?}", d.header.to_string());
    Ok(())
}

fn render_row(types: &TypeTree, row: &Row, out: &mut String) {
    for (i, &id) in types.columns().iter().enumerate() {
        if i > 0 {
            out.push('\t');
        }
        render(types, id, &row[i], out);
    }
}

fn render(types: &TypeTree, id: u32, v: &Value, out: &mut String) {
    let Some(node) = types.get(id) else {
        return;
    };
    match v {
        Value::Null => out.push_str("NULL"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Byte(x) => push(out, x),
        Value::Short(x) => push(out, x),
        Value::Int(x) => push(out, x),
        Value::Long(x) => push(out, x),
        Value::Float(x) => push(out, x),
        Value::Double(x) => push(out, x),
        Value::String(s) => push(out, format_args!("{s:?}")),
        Value::Binary(b) => push(out, format_args!("0x{}", hex::encode(b))),
        Value::List(items) if node.kind == TypeKind::List => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render(types, node.children[0], item, out);
            }
            out.push(']');
        }
        Value::Map(entries) if node.kind == TypeKind::Map => {
            out.push('{');
            for (i, (k, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render(types, node.children[0], k, out);
                out.push(':');
                render(types, node.children[1], val, out);
            }
            out.push('}');
        }
        Value::Struct(fields) if node.kind == TypeKind::Struct => {
            out.push('{');
            for (i, (f, child)) in fields.iter().zip(&node.children).enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Some(name) = node.field_names.get(i) {
                    push(out, format_args!("{name:?}:"));
                }
                render(types, *child, f, out);
            }
            out.push('}');
        }
        // value does not match its declared type
        other => push(out, format_args!("{other:?}")),
    }
}

fn push(out: &mut String, v: impl std::fmt::Display) {
    let _ = write!(out, "{v}");
}
