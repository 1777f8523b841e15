use grid_nav::config::{Cli, Config};
use grid_nav::{Cell, Grid, NavigationAgent, Route, SearchStats, World};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct Leg {
    from: Cell,
    target: Cell,
    route: Option<Route>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut world = World::new(config.width, config.height, config.plan());
    world
        .regenerate(&config.placer(), &mut rng)
        .context("world generation failed")?;

    if world.is_occupied(config.start) {
        warn!("agent starts on an obstacle at {}", config.start);
    }
    if config.targets.is_empty() {
        warn!("no targets given, the agent stays at {}", config.start);
    }

    let finder = config.path_finder();
    let mut agent = NavigationAgent::new(config.start);
    let mut stats = SearchStats::default();
    let mut legs = Vec::with_capacity(config.targets.len());

    for &target in &config.targets {
        let from = agent.position();
        let steps = agent.request_path_with_stats(&world, &finder, target, &mut stats)?;
        let route = steps.map(|_| agent.route().to_vec());

        if !cli.json {
            match steps {
                Some(steps) => println!("{from} -> {target}: {steps} steps"),
                None => println!("{from} -> {target}: no route"),
            }
            println!("{}", world.render(Some(from), agent.route()));
        }

        while agent.tick().is_some() {
            if cli.animate {
                std::thread::sleep(config.step_interval());
            }
        }

        legs.push(Leg {
            from,
            target,
            route,
        });
    }

    stats.print();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&legs)?);
    } else {
        println!("{}", world.render(Some(agent.position()), &[]));
    }

    Ok(())
}
