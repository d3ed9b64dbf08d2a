use super::open_session;
use crate::cli::parser::{ClientCmd, Commands};
use crate::config::Config;
use crate::core::client::ClientLogic;
use crate::errors::AppResult;
use crate::models::client::{Client, ClientInput};
use crate::ui::messages::{field, header, success, warning};
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;

fn rate_label(c: &Client) -> String {
    match c.hourly_rate {
        Some(r) => format!("{:.2} {}", r, c.currency),
        None => colorize_optional(None),
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Client { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        ClientCmd::Add {
            name,
            email,
            address,
            currency,
            rate,
        } => {
            let input = ClientInput {
                name: Some(name.clone()),
                email: email.clone(),
                address: address.clone(),
                currency: currency.clone(),
                hourly_rate: *rate,
            };
            let client = ClientLogic::create(&mut pool, cfg, &actor, &input)?;
            success(format!("Client #{} '{}' created", client.id, client.name));
        }

        ClientCmd::List => {
            let clients = ClientLogic::list(&mut pool, &actor)?;
            if clients.is_empty() {
                warning("No clients found.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "NAME", "EMAIL", "CURRENCY", "RATE"]);
            for c in &clients {
                table.add_row(vec![
                    c.id.to_string(),
                    c.name.clone(),
                    colorize_optional(c.email.as_deref()),
                    c.currency.clone(),
                    rate_label(c),
                ]);
            }
            table.print(&cfg.separator_char);
        }

        ClientCmd::Show { id } => {
            let c = ClientLogic::get(&mut pool, &actor, *id)?;
            header(format!("Client #{}", c.id));
            field("Name", &c.name);
            field("Email", colorize_optional(c.email.as_deref()));
            field("Address", colorize_optional(c.address.as_deref()));
            field("Currency", &c.currency);
            field("Rate", rate_label(&c));
            field("Created", &c.created_at);
        }

        ClientCmd::Edit {
            id,
            name,
            email,
            address,
            currency,
            rate,
        } => {
            let input = ClientInput {
                name: name.clone(),
                email: email.clone(),
                address: address.clone(),
                currency: currency.clone(),
                hourly_rate: *rate,
            };
            let client = ClientLogic::update(&mut pool, &actor, *id, &input)?;
            success(format!("Client #{} updated", client.id));
        }

        ClientCmd::Del { id } => {
            ClientLogic::delete(&mut pool, &actor, *id)?;
            success(format!("Client #{id} deleted"));
        }
    }

    Ok(())
}
