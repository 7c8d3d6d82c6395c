//! Basic demonstration of the Raise a Horde simulation.
//!
//! Run with: cargo run --example basic_demo
//! Set `RUST_LOG=horde_sim=debug` to watch groups form and dissolve.

use horde_sim::{Point, SimWorld};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    println!("=== Raise a Horde - Simulation Demo ===\n");

    let mut sim = SimWorld::new_default_world();
    let Some(player) = sim.player() else {
        eprintln!("default world has no player");
        return;
    };

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Ride east, then loose a volley ahead.
    let start = sim.position(player).map(|pos| pos.point()).unwrap_or_default();
    sim.move_to(player, Point::new(start.x + 150.0, start.y));

    println!("\nRunning simulation for 600 frames (10 seconds at 60 fps)...\n");
    for frame in 0..600 {
        sim.step(1000.0 / 60.0);

        if frame == 300 {
            if let Some(pos) = sim.position(player) {
                sim.throw(player, Point::new(pos.x + 120.0, pos.y + 40.0));
            }
        }

        if (frame + 1) % 120 == 0 {
            println!(
                "--- Tick {} (t={:.1}s) ---",
                sim.current_tick(),
                sim.current_time() / 1000.0
            );
            print_snapshot(&mut sim);
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("snapshot failed: {}", err),
    }
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();
    let free = snapshot.units.iter().filter(|u| u.group.is_none()).count();

    println!(
        "  {} units ({} free), {} projectiles in flight",
        snapshot.units.len(),
        free,
        snapshot.projectiles.len()
    );
    for group in &snapshot.groups {
        println!(
            "    Group {}: leader={} pos=({:.1}, {:.1}) influence={:.0} size={}{}",
            group.id,
            group.leader,
            group.x,
            group.y,
            group.influence,
            group.size,
            if group.honorable { " [honorable]" } else { "" }
        );
    }
}
