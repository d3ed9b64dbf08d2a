use super::open_session;
use crate::cli::parser::{AttachCmd, Commands};
use crate::config::Config;
use crate::core::attachment::AttachmentLogic;
use crate::errors::AppResult;
use crate::export::ensure_writable;
use crate::ui::messages::{success, warning};
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Attach { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        AttachCmd::Add { task, file } => {
            let source = expand_tilde(file);
            let a = AttachmentLogic::add(&mut pool, cfg, &actor, *task, &source)?;
            success(format!(
                "Attached '{}' to task #{} ({} bytes, id #{})",
                a.file_name, a.task_id, a.size_bytes, a.id
            ));
        }

        AttachCmd::List { task } => {
            let files = AttachmentLogic::list(&mut pool, &actor, *task)?;
            if files.is_empty() {
                warning("No attachments.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "FILE", "BYTES", "UPLOADED"]);
            for a in files {
                table.add_row(vec![
                    a.id.to_string(),
                    a.file_name,
                    a.size_bytes.to_string(),
                    a.created_at,
                ]);
            }
            table.print(&cfg.separator_char);
        }

        AttachCmd::Get { id, file, force } => {
            let dest = expand_tilde(file);
            ensure_writable(&dest, *force)?;
            let a = AttachmentLogic::fetch(&mut pool, &actor, *id, &dest)?;
            success(format!("'{}' saved to {}", a.file_name, dest.display()));
        }

        AttachCmd::Del { id } => {
            AttachmentLogic::delete(&mut pool, &actor, *id)?;
            success(format!("Attachment #{id} deleted"));
        }
    }

    Ok(())
}
