use anyhow::Result;
use simplesimple::{config, simulation::Simulation, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

fn main() -> Result<()> {
    let cfg = Config::load()?;
    init_tracing(&cfg.logging);

    for limit in cfg.building.unbounded_limits() {
        warn!(limit, "power limit not configured - treating it as unbounded");
    }

    let building = cfg.building.build()?;
    info!(
        steps = cfg.scenario.steps,
        time_step_seconds = building.time_step_seconds(),
        initial_temperature = building.current_temperature(),
        "starting building simulation"
    );

    let mut sim = Simulation::new(building);
    sim.run(cfg.scenario.boundaries());

    let summary = sim.summary();
    info!(
        steps = summary.steps,
        final_temperature = summary.final_temperature,
        min_temperature = summary.min_temperature,
        max_temperature = summary.max_temperature,
        heating_energy_wh = summary.heating_energy_wh,
        cooling_energy_wh = summary.cooling_energy_wh,
        saturated_steps = summary.saturated_steps,
        "simulation summary"
    );

    Ok(())
}
