use super::open_session;
use crate::cli::parser::{Commands, TimeCmd};
use crate::config::Config;
use crate::core::timelog::TimeLogLogic;
use crate::errors::AppResult;
use crate::models::time_log::{ApprovalStatus, TimeLog, TimeLogFilter, TimeLogInput};
use crate::ui::messages::{field, header, info, success, warning};
use crate::utils::colors::{CYAN, RESET, colorize_optional, colorize_status};
use crate::utils::date::parse_range;
use crate::utils::formatting::{hours2readable, money, round2, truncate};
use crate::utils::table::Table;
use crate::utils::time::{format_datetime, now, parse_optional_datetime};
use std::collections::BTreeMap;

fn describe(log: &TimeLog) -> String {
    let end = log
        .end_time
        .map(|e| format_datetime(&e))
        .unwrap_or_else(|| "running".to_string());
    format!(
        "#{} project #{}: {} → {} ({})",
        log.id,
        log.project_id,
        format_datetime(&log.start_time),
        end,
        log.status.to_db_str()
    )
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Time { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        TimeCmd::Add {
            project,
            start,
            end,
            task,
            description,
            tags,
        } => {
            let input = TimeLogInput {
                task_id: *task,
                description: description.clone(),
                start_time: parse_optional_datetime(Some(start))?,
                end_time: parse_optional_datetime(Some(end))?,
                tags: tags.clone(),
            };
            let log = TimeLogLogic::add(&mut pool, &actor, *project, &input)?;
            success(format!(
                "Logged {} on project #{} (log #{}, {})",
                hours2readable(log.hours()),
                log.project_id,
                log.id,
                log.status.to_db_str()
            ));
        }

        TimeCmd::Start {
            project,
            task,
            description,
            at,
            tags,
        } => {
            let input = TimeLogInput {
                task_id: *task,
                description: description.clone(),
                start_time: parse_optional_datetime(at.as_ref())?,
                end_time: None,
                tags: tags.clone(),
            };
            let log = TimeLogLogic::start(&mut pool, &actor, *project, &input)?;
            success(format!(
                "Timer started on project #{} at {} (log #{})",
                log.project_id,
                format_datetime(&log.start_time),
                log.id
            ));
        }

        TimeCmd::Stop { at } => {
            let log = TimeLogLogic::stop(&mut pool, &actor, parse_optional_datetime(at.as_ref())?)?;
            success(format!(
                "Timer stopped: {} logged on project #{}",
                hours2readable(log.hours()),
                log.project_id
            ));
        }

        TimeCmd::Current => match TimeLogLogic::running(&mut pool, &actor)? {
            Some(log) => {
                let elapsed = (now() - log.start_time).num_minutes().max(0);
                header(format!("Running timer #{}", log.id));
                field("Project", format!("#{}", log.project_id));
                field("Started", format_datetime(&log.start_time));
                field("Elapsed", hours2readable(elapsed as f64 / 60.0));
                field("Description", colorize_optional(log.description.as_deref()));
            }
            None => info("No timer is running."),
        },

        TimeCmd::List {
            project,
            range,
            status,
            mine,
        } => {
            let bounds = match range {
                Some(r) => parse_range(r)?,
                None => None,
            };
            let filter = TimeLogFilter {
                project_id: *project,
                status: *status,
                from: bounds.map(|(f, _)| f),
                to: bounds.map(|(_, t)| t),
                only_mine: *mine,
            };
            let rows = TimeLogLogic::list(&mut pool, &actor, &filter)?;
            if rows.is_empty() {
                warning("No time logs found.");
                return Ok(());
            }

            let mut table = Table::new(&[
                "ID", "DATE", "START", "END", "HOURS", "PROJECT", "USER", "TASK", "AMOUNT", "STATUS",
            ]);
            // hours per currency, never summed across currencies
            let mut totals: BTreeMap<String, (f64, f64)> = BTreeMap::new();

            for r in &rows {
                let log = &r.log;
                let end = log
                    .end_time
                    .map(|e| e.format("%H:%M").to_string())
                    .unwrap_or_else(|| format!("{CYAN}running{RESET}"));
                table.add_row(vec![
                    log.id.to_string(),
                    log.start_time.format("%Y-%m-%d").to_string(),
                    log.start_time.format("%H:%M").to_string(),
                    end,
                    format!("{:.2}", log.hours()),
                    truncate(&r.project_name, 20),
                    r.user_email.clone(),
                    colorize_optional(r.task_title.as_deref().map(|t| truncate(t, 24)).as_deref()),
                    money(log.amount(), &r.currency),
                    colorize_status(log.status.to_db_str()),
                ]);

                let entry = totals.entry(r.currency.clone()).or_default();
                entry.0 += log.hours();
                entry.1 += log.amount();
            }
            table.print(&cfg.separator_char);

            for (currency, (hours, amount)) in totals {
                info(format!(
                    "Total {}: {} = {}",
                    currency,
                    hours2readable(hours),
                    money(round2(amount), &currency)
                ));
            }
        }

        TimeCmd::Edit {
            id,
            start,
            end,
            task,
            description,
            tags,
        } => {
            let input = TimeLogInput {
                task_id: *task,
                description: description.clone(),
                start_time: parse_optional_datetime(start.as_ref())?,
                end_time: parse_optional_datetime(end.as_ref())?,
                tags: tags.clone(),
            };
            let log = TimeLogLogic::edit(&mut pool, &actor, *id, &input)?;
            success(format!("Updated {}", describe(&log)));
        }

        TimeCmd::Approve { id } => {
            let log = TimeLogLogic::review(&mut pool, &actor, *id, ApprovalStatus::Approved)?;
            success(format!("Approved {}", describe(&log)));
        }

        TimeCmd::Reject { id } => {
            let log = TimeLogLogic::review(&mut pool, &actor, *id, ApprovalStatus::Rejected)?;
            success(format!("Rejected {}", describe(&log)));
        }

        TimeCmd::Del { id } => {
            TimeLogLogic::delete(&mut pool, &actor, *id)?;
            success(format!("Time log #{id} deleted"));
        }
    }

    Ok(())
}
