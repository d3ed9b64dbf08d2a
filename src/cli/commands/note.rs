use super::open_session;
use crate::cli::parser::{Commands, NoteCmd};
use crate::config::Config;
use crate::core::note::{NoteInput, NoteLogic};
use crate::errors::AppResult;
use crate::ui::messages::{field, header, success, warning};
use crate::utils::colors::colorize_optional;
use crate::utils::formatting::truncate;
use crate::utils::table::Table;

fn link_label(id: Option<i64>) -> String {
    colorize_optional(id.map(|i| format!("#{i}")).as_deref())
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Note { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        NoteCmd::Add {
            title,
            body,
            project,
            client,
        } => {
            let input = NoteInput {
                title: Some(title.clone()),
                body: body.clone(),
                project_id: *project,
                client_id: *client,
            };
            let note = NoteLogic::create(&mut pool, &actor, &input)?;
            success(format!("Note #{} saved", note.id));
        }

        NoteCmd::List { project, client } => {
            let notes = NoteLogic::list(&mut pool, &actor, *project, *client)?;
            if notes.is_empty() {
                warning("No notes found.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "TITLE", "PROJECT", "CLIENT", "UPDATED"]);
            for n in notes {
                table.add_row(vec![
                    n.id.to_string(),
                    truncate(&n.title, 40),
                    link_label(n.project_id),
                    link_label(n.client_id),
                    n.updated_at,
                ]);
            }
            table.print(&cfg.separator_char);
        }

        NoteCmd::Show { id } => {
            let n = NoteLogic::get(&mut pool, &actor, *id)?;
            header(format!("Note #{}: {}", n.id, n.title));
            field("Project", link_label(n.project_id));
            field("Client", link_label(n.client_id));
            field("Updated", &n.updated_at);
            println!();
            println!("{}", textwrap::fill(&n.body, 80));
        }

        NoteCmd::Edit {
            id,
            title,
            body,
            project,
            client,
        } => {
            let input = NoteInput {
                title: title.clone(),
                body: body.clone(),
                project_id: *project,
                client_id: *client,
            };
            let note = NoteLogic::update(&mut pool, &actor, *id, &input)?;
            success(format!("Note #{} updated", note.id));
        }

        NoteCmd::Del { id } => {
            NoteLogic::delete(&mut pool, &actor, *id)?;
            success(format!("Note #{id} deleted"));
        }
    }

    Ok(())
}
