//! Quick timing of propagation across graph shapes.

use std::time::Instant;
use bench::{chain, constant, diamonds, fan_out};
use mixins::{EngineError, ModuleId, Registry};

type Shape = fn(&mut Registry, usize) -> Result<Vec<ModuleId>, EngineError>;

fn main() -> Result<(), EngineError> {
    println!("=== Propagation timing ===\n");

    let shapes: [(&str, Shape); 3] = [("chain", chain), ("fan_out", fan_out), ("diamonds", diamonds)];
    for size in [10, 100, 1000] {
        println!("--- size {} ---", size);
        for (label, build) in shapes {
            let mut registry = Registry::new();
            let start = Instant::now();
            let modules = build(&mut registry, size)?;
            let built = start.elapsed();

            let start = Instant::now();
            for n in 0..100 {
                registry.define(modules[0], "tick", constant(n))?;
            }
            let redefined = start.elapsed();

            println!(
                "{label:>9}: {} modules, build {:?}, 100 redefinitions {:?}",
                registry.len(),
                built,
                redefined
            );
        }
        println!();
    }
    Ok(())
}
