//! Benchmark comparing sequential vs parallel flattening and type resolution
//!
//! Generates API-style records with nested objects, arrays, and a few
//! sparse or mixed-type fields, then times both stages each way.

use ingot::{
    extract, FlatTable, FlattenConfig, Flattener, RecordSet, ResolveConfig, TypeResolver,
};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

const RECORDS: usize = 20_000;

fn main() -> anyhow::Result<()> {
    println!("=== Ingot Flatten Benchmark ===\n");
    println!("Generating {} nested records...\n", RECORDS);

    let mut test_data = Vec::with_capacity(RECORDS);
    for i in 0..RECORDS {
        test_data.push(json!({
            "id": i,
            "username": format!("user{}", i),
            "profile": {
                "bio": format!("I am user {}", i),
                "location": if i % 5 == 0 { Value::Null } else { json!("San Francisco") },
                "score": if i % 2 == 0 { json!(i) } else { json!(i as f64 + 0.5) }
            },
            "posts": [
                {"id": i * 10, "title": format!("Post {} - First", i), "likes": i % 100},
                {"id": i * 10 + 1, "title": format!("Post {} - Second", i), "likes": (i * 2) % 100}
            ],
            "flags": [i % 2 == 0, i % 3 == 0],
            "legacy": if i % 7 == 0 { json!("n/a") } else { json!(i) }
        }));
    }
    let document = Value::Array(test_data);

    let sequential = run(&document, false)?;
    let parallel = run(&document, true)?;

    println!("=== Performance Analysis ===\n");
    println!("                 flatten        resolve");
    println!("Sequential:      {:>12?}   {:>12?}", sequential.flatten, sequential.resolve);
    println!("Parallel:        {:>12?}   {:>12?}", parallel.flatten, parallel.resolve);
    println!();

    let total_seq = sequential.flatten + sequential.resolve;
    let total_par = parallel.flatten + parallel.resolve;
    println!(
        "Speedup (end to end): {:.2}x",
        total_seq.as_secs_f64() / total_par.as_secs_f64()
    );

    Ok(())
}

struct Timings {
    flatten: Duration,
    resolve: Duration,
}

fn run(document: &Value, parallel: bool) -> anyhow::Result<Timings> {
    let label = if parallel { "Parallel" } else { "Sequential" };
    println!("=== {} ===", label);

    let records: RecordSet = extract(document.clone())?;

    let flattener = Flattener::new(FlattenConfig {
        parallel,
        parallel_threshold: 0,
        ..FlattenConfig::default()
    });
    let start = Instant::now();
    let flat: FlatTable = flattener.flatten(records);
    let flatten = start.elapsed();

    println!("Rows: {}  Columns: {}", flat.len(), flat.columns().len());

    let resolver = TypeResolver::new(ResolveConfig {
        parallel,
        parallel_threshold: 0,
    });
    let start = Instant::now();
    let table = resolver.resolve(flat);
    let resolve = start.elapsed();

    for field in table.schema().iter().filter(|f| f.name.starts_with("profile") || f.name == "legacy") {
        println!("  {:<20} {}", field.name, field.column_type);
    }
    println!(
        "Average per record: {:.2}μs\n",
        (flatten + resolve).as_micros() as f64 / RECORDS as f64
    );

    Ok(Timings { flatten, resolve })
}
