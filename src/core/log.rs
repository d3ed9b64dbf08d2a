use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::table::visible_width;
use ansi_term::Colour;

const OP_WIDTH_MAX: usize = 60;

/// Colour of an audit operation, picked from its verb suffix.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "migration_applied" => Colour::Purple,
        "backup" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ if op.ends_with("_add") || op.ends_with("_start") || op == "task_recur" => Colour::Green,
        _ if op.ends_with("_del") || op.ends_with("_remove") || op == "tracker_unlink" => Colour::Red,
        _ if op.ends_with("_edit") || op.ends_with("_status") || op.ends_with("_stop") => Colour::Yellow,
        _ if op.ends_with("_approve") || op.ends_with("_reject") => Colour::Cyan,
        _ if op.starts_with("tracker_") => Colour::Cyan,
        _ => Colour::White,
    }
}

fn cut(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;
        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let rows: Vec<(i64, String, String, String, String)> = entries
            .into_iter()
            .map(|e| {
                let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or(e.date);
                let op_target = if e.target.is_empty() {
                    e.operation.clone()
                } else {
                    format!("{} ({})", e.operation, e.target)
                };
                (e.id, date, e.operation, cut(&op_target, OP_WIDTH_MAX), e.message)
            })
            .collect();

        let op_w = rows.iter().map(|r| r.3.chars().count()).max().unwrap_or(10);
        let id_w = rows.iter().map(|r| r.0.to_string().len()).max().unwrap_or(1);
        let date_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(10);

        println!("📜 Internal log:\n");

        for (id, date, operation, op_target, message) in rows {
            let color = color_for_operation(&operation);

            // only the operation word is coloured
            let painted = match op_target.split_once(' ') {
                Some((op, rest)) => format!("{} {}", color.paint(op), rest),
                None => color.paint(op_target.as_str()).to_string(),
            };
            let padding = " ".repeat(op_w.saturating_sub(visible_width(&painted)));

            println!("{id:>id_w$}: {date:<date_w$} | {painted}{padding} => {message}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_are_coloured_by_verb() {
        assert_eq!(color_for_operation("task_add"), Colour::Green);
        assert_eq!(color_for_operation("invoice_del"), Colour::Red);
        assert_eq!(color_for_operation("time_edit"), Colour::Yellow);
        assert_eq!(color_for_operation("migration_applied"), Colour::Purple);
    }

    #[test]
    fn long_targets_are_cut() {
        let s = "x".repeat(80);
        assert_eq!(cut(&s, 60).chars().count(), 60);
        assert!(cut(&s, 60).ends_with("..."));
    }
}
