//! Interactive shell over one long-lived session.

use std::path::Path;

use colored::*;
use dialoguer::Input;
use serde_json::json;

use super::{App, parse_load_args, render};
use crate::error::AppError;
use crate::infrastructure::cache::PageCacheStore;
use crate::infrastructure::scraper::PageScraper;
use crate::logging::LogHandle;
use crate::state::Variable;

/// What the shell does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const HELP: &[(&str, &str)] = &[
    ("set <NAME> <value>", "Set a session variable (empty value clears it)"),
    ("show [page]", "Show session variables, or the loaded page data"),
    ("load <domain> <row>", "Load a DSM row into the session"),
    ("lookup <url>", "Find a URL in the DSM"),
    ("check [refresh]", "Summarize the current page, from cache when valid"),
    ("links [refresh]", "Map the page's internal links onto the new site"),
    ("sidebar [on|off]", "Toggle sidebar extraction"),
    ("debug [on|off]", "Toggle debug logging"),
    ("migrate", "Show existing and proposed hierarchy of the current page"),
    ("dsm", "Show every column of the loaded DSM row"),
    ("cache", "Show the cache binding and whether it is usable"),
    ("domains", "List configured DSM domains"),
    ("bulk-check [csv]", "Check every pending row of a progress CSV"),
    ("help", "Show this help"),
    ("quit", "Leave the shell"),
];

/// Splits a command line into words, honoring single and double quotes.
pub fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        args.push(current);
    }

    args
}

fn on_off(arg: Option<&str>, current: bool) -> Result<bool, AppError> {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(!current),
        Some("on" | "true" | "yes" | "1") => Ok(true),
        Some("off" | "false" | "no" | "0") => Ok(false),
        Some(other) => Err(AppError::bad_request(
            "Expected 'on' or 'off'",
            json!({"value": other}),
        )),
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_white().bold());
    for (usage, description) in HELP {
        println!("  {:<22} {}", usage.cyan(), description);
    }
    println!();
}

/// Runs one shell command line against the session.
///
/// # Errors
///
/// Returns the command's error; the shell reports it and keeps going.
pub async fn execute<S: PageScraper, C: PageCacheStore>(
    app: &mut App<S, C>,
    logs: Option<&LogHandle>,
    debug: &mut bool,
    line: &str,
) -> Result<Flow, AppError> {
    let args = split_args(line);
    let Some((command, rest)) = args.split_first() else {
        return Ok(Flow::Continue);
    };
    let refresh = rest.first().is_some_and(|a| a.eq_ignore_ascii_case("refresh"));

    match command.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        "help" | "?" => print_help(),
        "set" => {
            let Some((name, value)) = rest.split_first() else {
                return Err(AppError::bad_request("Usage: set <NAME> <value>", json!({})));
            };
            let value = value.join(" ");
            let binding = app.set(name, &value)?;
            println!("{} {} = {}", "✅".green(), name.to_ascii_uppercase(), value.cyan());
            if let Some(binding) = binding {
                render::binding(&binding);
            }
        }
        "show" => match rest.first().map(String::as_str) {
            Some("page") => match &app.state.current_page_data {
                Some(page) => render::page(page, app.state.include_sidebar(), app.json()),
                None => println!("{}", "⚠️  No page data loaded; run 'check' first".yellow()),
            },
            _ => render::variables(&app.state, app.json()),
        },
        "load" => {
            let (domain, row) = parse_load_args(rest)?;
            app.load(&domain, row)?;
        }
        "lookup" => {
            let Some(url) = rest.first() else {
                return Err(AppError::bad_request("Usage: lookup <url>", json!({})));
            };
            app.lookup(url)?;
        }
        "check" => {
            app.check(refresh).await?;
        }
        "links" => app.links(refresh).await?,
        "sidebar" => {
            let enabled = on_off(rest.first().map(String::as_str), app.state.include_sidebar())?;
            app.set(Variable::IncludeSidebar.as_str(), if enabled { "true" } else { "false" })?;
            println!("Sidebar extraction {}", if enabled { "on".green() } else { "off".yellow() });
        }
        "debug" => {
            let enabled = on_off(rest.first().map(String::as_str), *debug)?;
            if let Some(logs) = logs {
                logs.set_debug(enabled)
                    .map_err(|e| AppError::internal(e.to_string(), json!({})))?;
            }
            *debug = enabled;
            println!("Debug logging {}", if enabled { "on".green() } else { "off".yellow() });
        }
        "migrate" => app.migrate()?,
        "dsm" => app.dsm_row()?,
        "cache" => app.cache_status(),
        "domains" => app.domains(),
        "bulk-check" | "bulk_check" => {
            app.bulk_check(rest.first().map(Path::new)).await?;
        }
        other => {
            return Err(AppError::bad_request(
                format!("Unknown command '{}'; type 'help' for a list", other),
                json!({"command": other}),
            ));
        }
    }

    Ok(Flow::Continue)
}

/// Reads and runs commands until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub async fn run<S: PageScraper, C: PageCacheStore>(
    app: &mut App<S, C>,
    logs: Option<&LogHandle>,
    mut debug: bool,
) -> anyhow::Result<()> {
    println!("{}", "🧭 DSM Linker shell".bright_blue().bold());
    println!("{}", "Type 'help' for commands, 'quit' to leave.".bright_black());
    println!();

    loop {
        let line: String = Input::new()
            .with_prompt("dsm")
            .allow_empty(true)
            .interact_text()?;

        match execute(app, logs, &mut debug, &line).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => render::error(&e, app.json()),
        }
    }

    println!("{}", "👋 Bye".bright_black());
    Ok(())
}
