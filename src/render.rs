//! Terminal output: the report table and one-line status messages.

use chrono::{DateTime, FixedOffset};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;

use crate::config::Config;
use crate::report::{format_duration, Report, ReportRow};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_time(dt: &DateTime<FixedOffset>) -> String {
    dt.format(TIME_FORMAT).to_string()
}

/// Renders report rows as a table: one line per interval, a subtotal per project and a grand total.
pub fn render_report(report: &Report, color: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Project", "Task", "Start", "End", "Duration"]);
    if !color {
        table.force_no_tty();
    }

    for row in &report.rows {
        match row {
            ReportRow::Record {
                project,
                task,
                start,
                end,
                seconds,
            } => {
                let (end, duration) = match (end, seconds) {
                    (Some(end), Some(seconds)) => {
                        (Cell::new(format_time(end)), Cell::new(format_duration(*seconds)))
                    }
                    _ => (Cell::new(""), Cell::new("ongoing").fg(Color::Cyan)),
                };
                table.add_row(vec![
                    Cell::new(project),
                    Cell::new(task),
                    Cell::new(format_time(start)),
                    end,
                    duration,
                ]);
            }
            ReportRow::Subtotal { project, seconds } => {
                table.add_row(vec![
                    Cell::new(project).add_attribute(Attribute::Bold),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new("subtotal"),
                    Cell::new(format_duration(*seconds)).add_attribute(Attribute::Bold),
                ]);
            }
            ReportRow::Total { seconds } => {
                table.add_row(vec![
                    Cell::new("TOTAL").fg(Color::Yellow),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(format_duration(*seconds))
                        .fg(Color::Yellow)
                        .add_attribute(Attribute::Bold),
                ]);
            }
        }
    }
    table.to_string()
}

/// Colors messages when writing to a terminal; plain text otherwise. Stdout and stderr are
/// decided separately.
#[derive(Clone, Copy, Debug)]
pub struct Printer {
    pub color: bool,
    pub err_color: bool,
}

impl Printer {
    pub fn new(config: &Config) -> Printer {
        Printer {
            color: config.color,
            err_color: config.err_color,
        }
    }

    pub fn success(&self, msg: &str) {
        if self.color {
            println!("{}", msg.green());
        } else {
            println!("{}", msg);
        }
    }

    pub fn info(&self, msg: &str) {
        println!("{}", msg);
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", self.error_line(msg));
    }

    fn error_line(&self, msg: &str) -> String {
        if self.err_color {
            format!("{} {}", "error:".red().bold(), msg.red())
        } else {
            format!("error: {}", msg)
        }
    }
}
