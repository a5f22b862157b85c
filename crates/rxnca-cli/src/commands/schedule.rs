use crate::cli::ScheduleArgs;
use crate::config::build_schedule;
use crate::error::Result;
use rxnca::core::heating::HeatingSchedule;
use tracing::info;

pub fn run(args: ScheduleArgs) -> Result<()> {
    info!("Loading heating schedule from {:?}", &args.recipe);
    let schedule = build_schedule(&args.recipe)?;
    println!("{}", describe(&schedule, args.step_scale));
    Ok(())
}

fn describe(schedule: &HeatingSchedule, step_scale: f64) -> String {
    let temps: Vec<String> = schedule
        .all_temps()
        .iter()
        .map(|t| format!("{:.1}", t))
        .collect();

    let mut lines = vec![
        format!("Heating steps:  {}", schedule.steps().len()),
        format!("Total duration: {} steps", schedule.total_duration()),
        format!("Temperatures:   {} K", temps.join(", ")),
        String::new(),
        format!("{:>12} {:>12}", "step", "temperature"),
    ];
    lines.extend(
        schedule
            .xy_for_plot(step_scale)
            .into_iter()
            .map(|(x, y)| format!("{:>12.2} {:>12.2}", x, y)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_temperatures_and_plot_points() {
        let schedule = HeatingSchedule::builder()
            .hold(300.0, 2)
            .hold(500.0, 3)
            .build()
            .unwrap();

        let text = describe(&schedule, 0.5);

        assert!(text.contains("Heating steps:  2"));
        assert!(text.contains("Total duration: 5 steps"));
        assert!(text.contains("Temperatures:   300.0, 500.0 K"));
        assert!(text.contains("        2.50       500.00"));
        assert_eq!(text.lines().count(), 5 + 4);
    }
}
