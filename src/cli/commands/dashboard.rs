use super::open_session;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::dashboard::DashboardLogic;
use crate::errors::AppResult;
use crate::models::dashboard::DashboardStats;
use crate::ui::messages::{field, header, info};
use crate::utils::colors::{GREEN, RESET, YELLOW};
use crate::utils::date::{parse_optional_date, today};
use crate::utils::formatting::{hours2readable, money};
use crate::utils::table::Table;

fn print_stats(stats: &DashboardStats, sep: &str) {
    header(format!("Dashboard on {}", stats.reference_date.format("%Y-%m-%d")));

    field("Clients", stats.clients);
    field("Active projects", stats.active_projects);
    field("Open tasks", stats.open_tasks);
    field("To approve", stats.pending_approvals);
    match stats.running_timer {
        Some(id) => field("Timer", format!("{GREEN}running (log #{id}){RESET}")),
        None => field("Timer", "stopped"),
    }

    if stats.totals.is_empty() {
        info("No approved time on your projects yet.");
    } else {
        let mut table = Table::new(&["CURRENCY", "PAID", "PAID AMOUNT", "UNPAID", "UNPAID AMOUNT"]);
        for t in &stats.totals {
            table.add_row(vec![
                t.currency.clone(),
                hours2readable(t.paid.hours),
                money(t.paid.amount, &t.currency),
                hours2readable(t.unpaid.hours),
                format!("{YELLOW}{}{RESET}", money(t.unpaid.amount, &t.currency)),
            ]);
        }
        table.print(sep);
    }

    let mut trend = Table::new(&["DAY", "YOU", "TEAM"]);
    for p in &stats.trend {
        trend.add_row(vec![
            p.date.format("%a %d").to_string(),
            format!("{:.2}", p.user_hours),
            format!("{:.2}", p.team_hours),
        ]);
    }
    trend.print(sep);
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Dashboard { date, json } = cmd {
        let day = parse_optional_date(date.as_ref())?.unwrap_or_else(today);
        let (mut pool, actor) = open_session(cfg)?;
        let stats = DashboardLogic::build(&mut pool, &actor, day)?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_stats(&stats, &cfg.separator_char);
        }
    }

    Ok(())
}
