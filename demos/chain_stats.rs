use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use chain_hash::ChainTable;
use chain_hash::chain_table::Entry;

const TARGET_CAPACITY: usize = 1000;

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn print_state(label: &str, table: &ChainTable<u64>) {
    println!(
        "{label}: len={} capacity={} arena_slots={} free_slots={}",
        table.len(),
        table.capacity(),
        table.arena_slots(),
        table.free_slots()
    );
}

fn print_histogram(table: &ChainTable<u64>) {
    let histogram = table.chain_histogram();
    let max = histogram.iter().copied().max().unwrap_or(0);
    if max == 0 {
        println!("chain histogram: empty");
        return;
    }

    println!("chain length histogram ({} buckets):", table.capacity());
    let max_bar = 60usize;
    for (length, &count) in histogram.iter().enumerate() {
        let bar = "#".repeat(count * max_bar / max);
        println!("{length:>3} | {count:>5} {bar}");
    }
}

fn main() {
    println!("Creating ChainTable with target capacity: {TARGET_CAPACITY}");
    let mut table: ChainTable<u64> = ChainTable::with_capacity(TARGET_CAPACITY);
    print_state("fresh", &table);

    println!("Filling to capacity and beyond, through several resizes...");
    let total = table.capacity() * 4;
    for value in 0..total as u64 {
        let hash = hash_u64(value);
        match table.entry(hash, |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => panic!("value already present: {value}"),
        }
    }
    print_state("filled", &table);
    println!(
        "load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    println!("Removing every third value...");
    for value in (0..total as u64).step_by(3) {
        let hash = hash_u64(value);
        table.remove(hash, |&v| v == value);
    }
    print_state("after removal", &table);

    println!("Reinserting; vacated slots are reused before the arena grows...");
    for value in (0..total as u64).step_by(3) {
        let value = value + 1_000_000;
        let hash = hash_u64(value);
        table.entry(hash, |&v| v == value).or_insert(value);
    }
    print_state("after reinsert", &table);

    print_histogram(&table);
}
