use anyhow::Result;

use crate::alarm::registry::AlarmRegistry;
use crate::alarm::scheduler::{format_minutes_away, next_alarm};
use crate::clock::{TimeDisplayMode, WallClock, format_clock_time, format_meal_time};

pub fn run_diagnostics(
    clock: &WallClock,
    registry: &AlarmRegistry,
    mode: TimeDisplayMode,
) -> Result<()> {
    let now = clock.now()?;
    println!("MealClock diagnostics");
    println!(
        "Country: {} ({})",
        clock.country(),
        clock.country().timezone().name()
    );
    println!("Local time: {}", format_clock_time(&now, mode));
    println!("Configured meal alarms: {}", registry.len());
    for entry in registry.list() {
        println!(
            "  {} {} [{}]",
            entry.time,
            entry.label,
            if entry.enabled { "enabled" } else { "disabled" }
        );
    }
    match next_alarm(registry, &now) {
        Some(next) => println!(
            "Next meal alarm: {} at {} ({})",
            next.entry.label,
            format_meal_time(next.entry.time, mode),
            format_minutes_away(next.minutes_away)
        ),
        None => println!("Next meal alarm: none enabled"),
    }
    Ok(())
}
