// ABOUTME: Renders directive blocks: exports, retry, parallel, for_each and schedule
// ABOUTME: Each block is followed by a blank line to separate directive groups

use indexmap::IndexMap;

use crate::model::{
    render_list, Exports, ParallelConfig, RetryCondition, Scalar, Schedule, Trigger,
};

use super::writer::DigWriter;

pub fn write_exports(writer: &mut DigWriter, level: usize, exports: &Exports) {
    writer.line(level, "_export:");
    for (key, value) in exports {
        writer.entry(level + 1, key, value);
    }
    writer.blank();
}

pub fn write_retry(writer: &mut DigWriter, level: usize, retry: &RetryCondition) {
    match retry {
        RetryCondition::Simple { limit } => writer.entry(level, "_retry", limit),
        RetryCondition::Interval {
            limit,
            interval,
            interval_type,
        } => {
            writer.line(level, "_retry:");
            writer.entry(level + 1, "limit", limit);
            writer.entry(level + 1, "interval", interval);
            writer.entry(level + 1, "interval_type", interval_type);
        }
    }
    writer.blank();
}

/// A limit wins over the flag; a non-parallel config without a limit renders nothing.
pub fn write_parallel(writer: &mut DigWriter, level: usize, config: &ParallelConfig) {
    if let Some(limit) = config.limit {
        writer.line(level, "_parallel:");
        writer.entry(level + 1, "limit", limit);
    } else if config.parallel {
        writer.entry(level, "_parallel", true);
    } else {
        return;
    }
    writer.blank();
}

pub fn write_for_each(
    writer: &mut DigWriter,
    level: usize,
    iterables: &IndexMap<String, Vec<Scalar>>,
) {
    writer.line(level, "for_each>:");
    for (key, values) in iterables {
        writer.entry(level + 1, key, render_list(values));
    }
    writer.blank();
}

/// Top-level `schedule:` block. At most one trigger line is written.
pub fn write_schedule(writer: &mut DigWriter, schedule: &Schedule) {
    writer.line(0, "schedule:");

    match schedule.trigger() {
        Some(Trigger::Cron(cron)) => writer.entry(1, "cron>", cron),
        Some(Trigger::Daily(daily)) => writer.entry(1, "daily>", daily),
        None => {}
    }

    if let Some(seconds) = schedule.skip_delayed_by.filter(|s| *s > 0) {
        writer.entry(1, "skip_delayed_by", format!("{}s", seconds));
    }

    writer.entry(1, "skip_on_overtime", schedule.skip_on_overtime);
    writer.blank();
}
