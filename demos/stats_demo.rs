use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use probe_hash::HashTable;
use probe_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of the stored values to remove and reinsert after filling.
    #[arg(short = 'r', long = "churn", default_value_t = 0.25)]
    churn: f64,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn print_histogram(histogram: &[usize]) {
    let total: usize = histogram.iter().sum();
    println!("Probe distance histogram ({total} values):");
    for (distance, &count) in histogram.iter().enumerate() {
        if count == 0 {
            continue;
        }
        println!(
            "  {distance:>4}: {count:>8} ({:.02}%)",
            count as f64 / total as f64 * 100.0
        );
    }
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity);

    println!("Actual capacity: {}", table.capacity());
    println!("Filling table up to its load limit...");

    let num_values = table.max_size() as u64;
    for value in 0..num_values {
        match table.entry(hash_u64(value), |&v| v == value, |&v| hash_u64(v)) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
    }

    println!("Inserted {} values into table", table.len());
    print_histogram(&table.probe_histogram(|&v| hash_u64(v)));
    table.debug_stats().print();

    let churned = (num_values as f64 * args.churn) as u64;
    println!("Removing and reinserting {churned} values...");
    for value in 0..churned {
        table.remove(hash_u64(value), |&v| v == value);
    }
    table.debug_stats().print();

    for value in 0..churned {
        table.insert(hash_u64(value), value, |a, b| a == b, |&v| hash_u64(v));
    }

    println!("Final capacity: {}", table.capacity());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );
    print_histogram(&table.probe_histogram(|&v| hash_u64(v)));
    table.debug_stats().print();
}
