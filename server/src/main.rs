use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dungeon_core::catalog::StaticCatalog;

use engine::config::EngineConfig;
use engine::world::World;

fn main() -> Result<(), String> {
    dungeon_core::initialize_logger(log::LevelFilter::Info, Some("engine.log")).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {e}. Exiting.");
        process::exit(1);
    });

    log::info!("Starting world engine v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Process PID: {}", process::id());

    let config = EngineConfig::from_env();
    log::debug!("Loaded config: {config:?}");

    let quit_flag = Arc::new(AtomicBool::new(false));
    let quit_flag_clone = quit_flag.clone();
    ctrlc::set_handler(move || {
        if quit_flag_clone.swap(true, Ordering::SeqCst) {
            log::info!("Alright, alright, I'm already terminating!");
        } else {
            log::info!("Got signal to terminate. Shutdown initiated...");
        }
    })
    .map_err(|e| format!("failed to install signal handler: {e}"))?;

    let catalog = StaticCatalog::default();
    let mut world = World::new(
        rand_seed(),
        config,
        Box::new(catalog.clone()),
        Box::new(catalog.clone()),
        Box::new(catalog),
    );

    log::info!("Entering main tick loop...");
    while !quit_flag.load(Ordering::SeqCst) {
        run_tick(&mut world);
        std::thread::sleep(std::time::Duration::from_millis(
            1000 / dungeon_core::constants::TICKS_PER_SECOND as u64,
        ));
    }

    log::info!("Shutdown signal received, exiting main loop...");
    log::info!("Engine shutdown complete.");

    Ok(())
}

/// One tick over every resident chunk: accumulate energy, drain ready
/// actors' commands (there are none to drain outside of a real
/// protocol server, so this loop is presently just the energy/decay
/// pass), and run end-of-tick bookkeeping.
fn run_tick(world: &mut World) {
    let wpositions: Vec<dungeon_core::geometry::WorldPos> = world.chunks.positions();
    for wpos in wpositions {
        let _ = engine::scheduler::accumulate_energy(world, wpos);
        engine::scheduler::end_of_tick_passes(world, wpos);
    }
}

fn rand_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0xC0FFEE)
}
