//! Station Vitals - Entry Point
//!
//! Loads the prototype catalogue, builds a world and runs a small REPL for
//! spawning entities, advancing ticks and using the admin commands.

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use station_vitals::command::{self, CommandOutput, InteractionAction, TargetResolver, TargetSelector};
use station_vitals::core::config::SimulationConfig;
use station_vitals::core::error::{Result, VitalsError};
use station_vitals::ecs::world::World;
use station_vitals::medical::OccupantView;
use station_vitals::producers::NeedKind;
use station_vitals::prototypes::PrototypeCatalog;
use station_vitals::simulation::{run_simulation_tick, SimulationEvent};

/// Damage and life-state simulation REPL
#[derive(Parser, Debug)]
#[command(name = "station-vitals")]
#[command(about = "Spawn entities, hurt them and watch their vitals tick")]
struct Args {
    /// Prototype file or directory of .toml prototype files
    #[arg(long, default_value = "data/prototypes")]
    prototypes: PathBuf,

    /// Simulation config TOML (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("station_vitals=debug")
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            SimulationConfig::from_toml_str(&content).map_err(VitalsError::Config)?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    let catalog = load_catalog(&args.prototypes)?;
    tracing::info!(
        "Station Vitals starting with {} entity prototypes",
        catalog.entities().count()
    );
    let mut world = World::new(catalog, config)?;

    println!("\n=== STATION VITALS ===");
    println!();
    println!("Commands:");
    println!("  spawn <proto> [name]           - Spawn an entity from a prototype");
    println!("  player <target>                - Attach the player to an entity");
    println!("  hurt <type/?> <amount> [target] [ignoreResistances]");
    println!("  rejuvenate [targets...]        - Fully heal and revive");
    println!("  enter <scanner>                - Player climbs into a medical scanner");
    println!("  insert <scanner> <target>      - Player puts someone into a scanner");
    println!("  eject <scanner>                - Player ejects a scanner's occupant");
    println!("  tick / t                       - Advance simulation by one tick");
    println!("  run <n>                        - Run n simulation ticks");
    println!("  status / s                     - Show every entity's vitals");
    println!("  quit / q                       - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some((&head, rest)) = words.split_first() else {
            continue;
        };

        match head {
            "quit" | "q" => break,
            "tick" | "t" => {
                let elapsed = world.config().tick_seconds;
                let events = run_simulation_tick(&mut world, elapsed);
                print_events(&events);
                flush_requests(&mut world);
                println!("Tick {} complete.", world.current_tick);
            }
            "run" => match rest.first().and_then(|n| n.parse::<u32>().ok()) {
                Some(n) => {
                    let elapsed = world.config().tick_seconds;
                    let mut total = 0;
                    for _ in 0..n {
                        total += run_simulation_tick(&mut world, elapsed).len();
                    }
                    flush_requests(&mut world);
                    println!(
                        "Completed {} ticks ({} events). Now at tick {}.",
                        n, total, world.current_tick
                    );
                }
                None => println!("Usage: run <number>"),
            },
            "spawn" => match rest {
                [proto, name @ ..] => {
                    let name = (!name.is_empty()).then(|| name.join(" "));
                    match world.spawn_named(proto, name.as_deref()) {
                        Ok(id) => println!("Spawned {} (ID: {})", proto, id),
                        Err(e) => println!("{}", e),
                    }
                }
                [] => println!("Usage: spawn <proto> [name]"),
            },
            "player" => match rest.first() {
                Some(arg) => {
                    let found = TargetResolver::new(&world).resolve(&TargetSelector::parse(arg));
                    match found {
                        Ok(found) => {
                            world.set_player(Some(found.entity_id))?;
                            println!("Player attached to {}", found.name);
                        }
                        Err(message) => println!("{}", message),
                    }
                }
                None => println!("Usage: player <target>"),
            },
            "hurt" => print_output(&run_hurt(&mut world, rest)),
            "rejuvenate" => {
                let targets: Vec<TargetSelector> =
                    rest.iter().map(|arg| TargetSelector::parse(arg)).collect();
                print_output(&command::rejuvenate(&mut world, &targets));
            }
            "enter" | "insert" | "eject" => run_interaction(&mut world, head, rest),
            "status" | "s" => display_status(&world),
            _ => println!(
                "Unknown command. Available: spawn, player, hurt, rejuvenate, enter, insert, eject, tick, run, status, quit"
            ),
        }
    }

    println!(
        "\nGoodbye! Final state: {} entities, {} ticks elapsed.",
        world.entity_count(),
        world.current_tick
    );
    Ok(())
}

fn load_catalog(path: &Path) -> Result<PrototypeCatalog> {
    let catalog = if path.is_dir() {
        PrototypeCatalog::load_dir(path)?
    } else {
        PrototypeCatalog::load_file(path)?
    };
    Ok(catalog)
}

/// Split `hurt` arguments: <type/?> <amount> [target] [ignoreResistances]
fn run_hurt(world: &mut World, args: &[&str]) -> CommandOutput {
    let usage = || CommandOutput::failed(vec![command::HURT_USAGE.to_string()]);
    match args {
        ["?", ..] => command::list_damage_groups(world.catalog()),
        [class, amount, rest @ ..] if rest.len() <= 2 => {
            let Ok(amount) = amount.parse::<i32>() else {
                return CommandOutput::failed(vec![format!("{} is not a valid damage integer.", amount)]);
            };
            let target = TargetSelector::parse(rest.first().copied().unwrap_or("_"));
            let ignore_resistances = match rest.get(1) {
                Some(flag) => match flag.parse::<bool>() {
                    Ok(flag) => flag,
                    Err(_) => {
                        return CommandOutput::failed(vec![format!(
                            "{} is not a valid boolean value for ignoreResistances.",
                            flag
                        )])
                    }
                },
                None => false,
            };
            command::hurt(world, class, amount, &target, ignore_resistances)
        }
        _ => usage(),
    }
}

fn run_interaction(world: &mut World, head: &str, args: &[&str]) {
    let Some(actor) = world.player() else {
        println!("Attach the player to an entity first (player <target>).");
        return;
    };
    let resolve = |world: &World, arg: &str| {
        TargetResolver::new(world)
            .resolve(&TargetSelector::parse(arg))
            .map(|m| m.entity_id)
    };

    let result = match (head, args) {
        ("enter", [scanner]) => resolve(&*world, *scanner)
            .map(|s| world.interact(actor, s, InteractionAction::Enter, None)),
        ("eject", [scanner]) => resolve(&*world, *scanner)
            .map(|s| world.interact(actor, s, InteractionAction::Eject, None)),
        ("insert", [scanner, body]) => resolve(&*world, *scanner).and_then(|s| {
            resolve(&*world, *body).map(|b| world.interact(actor, s, InteractionAction::Insert, Some(b)))
        }),
        _ => Err(format!("Usage: {} <scanner>{}", head, if head == "insert" { " <target>" } else { "" })),
    };

    match result {
        Ok(Ok(())) => println!("Done."),
        Ok(Err(e)) => println!("{}", e),
        Err(message) => println!("{}", message),
    }
}

/// Log and discard the engine requests recorded so far
fn flush_requests(world: &mut World) {
    for request in world.bridge_mut().drain() {
        tracing::debug!("engine request: {:?}", request);
    }
}

fn print_output(output: &CommandOutput) {
    for line in &output.lines {
        println!("{}", line);
    }
}

fn print_events(events: &[SimulationEvent]) {
    for event in events {
        match event {
            SimulationEvent::DamageChanged { entity, total, .. } => {
                println!("  {} damage total {}", entity, total)
            }
            SimulationEvent::StateTransitioned { entity, to, .. } => {
                println!("  {} is now {}", entity, to.name())
            }
            SimulationEvent::ThresholdCrossed { entity, threshold, failed, .. } => {
                println!("  {} crossed threshold {} ({} failed)", entity, threshold, failed)
            }
            SimulationEvent::NeedBandChanged { entity, kind, to, .. } => {
                println!("  {} {} is {:?}", entity, kind.name(), to)
            }
            SimulationEvent::EntityDestroyed { entity } => println!("  {} destroyed", entity),
        }
    }
}

fn display_status(world: &World) {
    println!("\n--- Tick {} ({} entities) ---", world.current_tick, world.entity_count());
    for entity in world.entities() {
        let mut line = format!("{} [{}] {}", entity.name, entity.prototype, entity.id);
        if let Some(damageable) = world.damageable(entity.id) {
            line.push_str(&format!(" damage={}", damageable.total_damage()));
        }
        if let Some(state) = world.mob_state(entity.id).and_then(|m| m.current_state()) {
            line.push_str(&format!(" state={}", state.name()));
        }
        for kind in [NeedKind::Thirst, NeedKind::Hunger] {
            if let Some(need) = world.need(entity.id, kind) {
                line.push_str(&format!(" {}={:.0}({:?})", kind.name(), need.level(), need.band()));
            }
        }
        if let Some(temperature) = world.temperature(entity.id) {
            line.push_str(&format!(" temp={:.1}K", temperature.current()));
        }
        if let Some(respiration) = world.respiration(entity.id) {
            line.push_str(&format!(" o2={:.0}", respiration.saturation()));
        }
        println!("{}", line);

        if let Some(scanner) = world.medical_scanner(entity.id) {
            let occupant = scanner.occupant().and_then(|id| world.entity(id));
            let view = occupant.map(|e| OccupantView {
                id: e.id,
                damageable: world.damageable(e.id),
                mob_state: world.mob_state(e.id),
            });
            let ui = scanner.ui_state(view.as_ref());
            println!(
                "  scanner {:?}: {}",
                scanner.status(view.as_ref()),
                serde_json::to_string(&ui).unwrap_or_default()
            );
        }
    }
    println!();
}
