//! Path Evolve CLI - Run the path planner from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;

use path_evolve::{EvolutionEngine, PlannerConfig, schema::EvolutionProgress};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Evolve a collision-free path from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to planner configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let config = PlannerConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    println!("Path Evolve");
    println!("===========");
    println!(
        "Environment: {}x{}, goal {}, {} obstacles",
        config.environment.width,
        config.environment.height,
        config.environment.goal,
        config.environment.obstacles.len()
    );
    println!(
        "Population: {}, selection {}, crossover {:?}",
        config.algorithm.population_size, config.algorithm.selection, config.algorithm.crossover
    );
    println!(
        "Stop at cost <= {} or after {} generations",
        config.termination.fitness_limit, config.termination.generation_limit
    );
    println!();

    let mut engine = EvolutionEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Error creating planner: {}", e);
        std::process::exit(1);
    });

    let result = engine
        .run_with_callback(print_progress)
        .unwrap_or_else(|e| {
            eprintln!("Evolution failed: {}", e);
            std::process::exit(1);
        });

    println!();
    println!("{}", engine.population().statistics_report());
    println!("Stop reason: {:?}", result.stats.stop_reason);
    println!("Generations: {}", result.stats.generations);
    println!(
        "Time: {:.2}s ({:.1} generations/s)",
        result.stats.elapsed_seconds, result.stats.generations_per_second
    );

    if engine.population().fittest().is_some() {
        println!();
        println!("Best path (JSON):");
        match serde_json::to_string_pretty(&result.best) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing result: {}", e),
        }
    }
}

fn print_progress(progress: &EvolutionProgress) {
    // Print every generation early on, then every 10%
    let interval = (progress.generation_limit / 10).clamp(1, 1000);
    if progress.generation <= 10 || progress.generation % interval == 0 {
        println!(
            "  Generation {}: best={:.3} feasible={} avg={:.3} diversity={:.3}",
            progress.generation,
            progress.best_cost,
            progress.best_feasible,
            progress.average_cost,
            progress.diversity
        );
    }
}

fn print_example_config() {
    let config = PlannerConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
