//! Terminal and JSON output for command results.

use colored::*;
use serde::Serialize;
use serde_json::json;

use super::bulk::BulkSummary;
use crate::application::services::{CacheBinding, CacheValidity, LinkReport, LoadedRow, PageCheck, PageSource};
use crate::domain::entities::{ContentCounts, LookupResult, PageData, PageEmbed, PageLink, ProposedHierarchy};
use crate::domain::registry::DomainRegistry;
use crate::error::AppError;
use crate::state::{SessionState, Variable};

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("{} {}", "❌ Failed to serialize output:".red(), e),
    }
}

fn binding_json(binding: &CacheBinding) -> serde_json::Value {
    match binding {
        CacheBinding::Unbound => json!({"status": "unbound"}),
        CacheBinding::Valid(path) => json!({"status": "valid", "path": path}),
        CacheBinding::Stale { path, reason } => {
            json!({"status": "stale", "path": path, "reason": reason})
        }
    }
}

pub fn error(e: &AppError, as_json: bool) {
    if as_json {
        print_json(&e.to_json());
        return;
    }

    eprintln!("{} {}", "❌".red(), e.to_string().red().bold());
    let details = e.details();
    if details.as_object().is_some_and(|d| !d.is_empty()) {
        eprintln!("   {}", details.to_string().bright_black());
    }
}

pub fn lookup(url: &str, result: &LookupResult, as_json: bool) {
    if as_json {
        print_json(&json!({"url": url, "result": result}));
        return;
    }

    println!("{}", "🔎 DSM Lookup".bright_blue().bold());
    println!();
    println!("  URL:      {}", url.cyan());

    match result {
        LookupResult::Found(m) => {
            println!("  Domain:   {}", m.domain.bright_white().bold());
            println!("  Row:      {}", m.sheet_row.to_string().bright_yellow());
            println!("  Existing: {}", m.existing_url);
            println!("  Proposed: {}", m.proposed_url.green());
            println!();
            println!("{}", "Proposed hierarchy:".bright_white());
            hierarchy(&m.proposed_hierarchy);
        }
        LookupResult::NotFound => {
            println!();
            println!("{}", "⚠️  Not found in any DSM worksheet".yellow());
        }
    }
    println!();
}

pub fn loaded(row: &LoadedRow, binding: &CacheBinding, as_json: bool) {
    if as_json {
        print_json(&json!({"row": row, "cache": binding_json(binding)}));
        return;
    }

    println!(
        "{} {} row {}",
        "✅ Loaded".green().bold(),
        row.domain.bright_white().bold(),
        row.sheet_row.to_string().bright_yellow()
    );
    println!("  URL:           {}", row.existing_url.cyan());
    println!("  Proposed path: {}", row.proposed_path.green());
    if row.multiple_urls {
        println!(
            "{}",
            "⚠️  The existing URL cell holds more than one URL; using the first".yellow()
        );
    }
    self::binding(binding);
}

pub fn binding(binding: &CacheBinding) {
    match binding {
        CacheBinding::Unbound => println!("  Cache:         {}", "none".bright_black()),
        CacheBinding::Valid(path) => {
            println!("  Cache:         {}", path.display().to_string().green())
        }
        CacheBinding::Stale { path, reason } => {
            println!("  Cache:         {}", path.display().to_string().yellow());
            println!("                 {}", reason.yellow());
        }
    }
}

pub fn check(state: &SessionState, check: &PageCheck, as_json: bool) {
    if as_json {
        print_json(check);
        return;
    }

    let source = match check.source {
        PageSource::Cache => "cache".green(),
        PageSource::Fresh => "fresh scrape".cyan(),
    };
    println!("{}", "📄 Page Check".bright_blue().bold());
    println!();
    println!("  URL:      {}", state.get(Variable::Url).cyan());
    println!("  Selector: {}", state.get(Variable::Selector));
    println!("  Source:   {}", source);
    if let Some(file) = &check.cache_file {
        println!("  Cache:    {}", file.bright_black());
    }
    println!();
    println!(
        "  Main:     {} links, {} PDFs, {} embeds",
        check.summary.main.links.to_string().bright_white().bold(),
        check.summary.main.pdfs.to_string().bright_white().bold(),
        check.summary.main.embeds.to_string().bright_white().bold()
    );
    if state.include_sidebar() {
        println!(
            "  Sidebar:  {} links, {} PDFs, {} embeds",
            check.summary.sidebar.links.to_string().bright_white().bold(),
            check.summary.sidebar.pdfs.to_string().bright_white().bold(),
            check.summary.sidebar.embeds.to_string().bright_white().bold()
        );
    }
    if let Some(error) = &check.error {
        println!();
        println!("{} {}", "⚠️ ".yellow(), error.yellow());
    }
    println!();
}

/// Full listing of the session's page data.
pub fn page(page: &PageData, include_sidebar: bool, as_json: bool) {
    if as_json {
        print_json(page);
        return;
    }

    if !page.meta_description.is_empty() {
        println!("{}", "Meta description:".bright_white().bold());
        println!("  {}", page.meta_description);
        println!();
    }
    link_list("Links", &page.links);
    link_list("PDFs", &page.pdfs);
    embed_list("Embeds", &page.embeds);
    if include_sidebar {
        link_list("Sidebar links", &page.sidebar_links);
        link_list("Sidebar PDFs", &page.sidebar_pdfs);
        embed_list("Sidebar embeds", &page.sidebar_embeds);
    }
}

fn status_colored(status: &str) -> ColoredString {
    match status {
        "0" => status.bright_black(),
        s if s.starts_with('2') => s.green(),
        s if s.starts_with('3') => s.yellow(),
        s => s.red(),
    }
}

fn link_list(title: &str, links: &[PageLink]) {
    if links.is_empty() {
        return;
    }

    println!("{} ({})", title.bright_white().bold(), links.len());
    for link in links {
        println!(
            "  [{}] {} {}",
            status_colored(&link.status),
            link.text,
            link.href.bright_black()
        );
    }
    println!();
}

fn embed_list(title: &str, embeds: &[PageEmbed]) {
    if embeds.is_empty() {
        return;
    }

    println!("{} ({})", title.bright_white().bold(), embeds.len());
    for embed in embeds {
        println!("  {} {} {}", embed.kind.cyan(), embed.title, embed.src.bright_black());
    }
    println!();
}

pub fn links(report: &LinkReport, as_json: bool) {
    if as_json {
        print_json(report);
        return;
    }

    println!("{}", "🔗 Internal Links".bright_blue().bold());
    println!();

    if report.links.is_empty() {
        println!("{}", "  No internal links on this page".yellow());
        println!();
        return;
    }

    for link in &report.links {
        println!(
            "  [{}] {} {}",
            status_colored(&link.status),
            link.text.bright_white(),
            link.href.bright_black()
        );
        match link.lookup.as_match() {
            Some(m) => println!(
                "      {} {} ({} row {})",
                "→".green(),
                m.proposed_hierarchy.inline().green(),
                m.domain,
                m.sheet_row
            ),
            None => println!("      {}", "→ not in DSM".yellow()),
        }
    }

    println!();
    println!(
        "  Found in DSM: {}/{}",
        report.found().to_string().green().bold(),
        report.links.len()
    );
    println!("  Difficulty:   {:.2}", report.difficulty);
    println!();
}

pub fn domains(registry: &DomainRegistry, as_json: bool) {
    let domains: Vec<_> = registry.loadable().collect();
    if as_json {
        print_json(&domains);
        return;
    }

    println!("{}", "🌐 DSM Domains".bright_blue().bold());
    println!();
    println!(
        "  {:<28} {:<24} {:<7} {}",
        "Domain".bright_white().bold(),
        "Worksheet".bright_white().bold(),
        "Header".bright_white().bold(),
        "Host".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for domain in domains {
        println!(
            "  {:<28} {:<24} {:<7} {}",
            domain.full_name.cyan(),
            domain.worksheet(),
            domain.worksheet_header_row,
            domain.url.as_deref().unwrap_or("-").bright_black()
        );
        if !domain.aliases.is_empty() {
            println!("    aliases: {}", domain.aliases.join(", ").bright_black());
        }
    }
    println!();
}

pub fn cache_status(state: &SessionState, validity: &CacheValidity, as_json: bool) {
    let file = state.value(Variable::CacheFile);
    if as_json {
        print_json(&json!({
            "cache_file": file,
            "valid": validity.valid,
            "reason": validity.reason,
            "page_data_loaded": state.current_page_data.is_some(),
        }));
        return;
    }

    println!("{}", "🗄️  Cache Status".bright_blue().bold());
    println!();
    println!("  File:   {}", file.unwrap_or("(none)").cyan());
    if validity.valid {
        println!("  Status: {}", "valid".green().bold());
    } else {
        println!("  Status: {}", "not usable".yellow().bold());
    }
    println!("  Reason: {}", validity.reason);
    println!();
}

pub fn variables(state: &SessionState, as_json: bool) {
    if as_json {
        let map: serde_json::Map<_, _> = state
            .variables()
            .map(|(var, value)| (var.as_str().to_string(), json!(value)))
            .collect();
        print_json(&map);
        return;
    }

    println!("{}", "Session variables:".bright_white().bold());
    for (var, value) in state.variables() {
        let shown = if value.is_empty() {
            "(unset)".bright_black()
        } else {
            value.cyan()
        };
        println!("  {:<14} {}", var.as_str(), shown);
    }
    println!();
}

pub fn migration(existing: &ProposedHierarchy, proposed: Option<&ProposedHierarchy>, as_json: bool) {
    if as_json {
        print_json(&json!({"existing": existing, "proposed": proposed}));
        return;
    }

    println!("{}", "Existing hierarchy:".bright_white().bold());
    hierarchy(existing);
    println!();
    println!("{}", "Proposed hierarchy:".bright_white().bold());
    match proposed {
        Some(proposed) => hierarchy(proposed),
        None => println!("  {}", "PROPOSED_PATH is not set".yellow()),
    }
    println!();
}

fn hierarchy(h: &ProposedHierarchy) {
    for line in h.render().lines() {
        println!("  {}", line.green());
    }
}

pub fn row_data(domain: &str, sheet_row: usize, values: &[(String, String)], as_json: bool) {
    if as_json {
        let map: serde_json::Map<_, _> = values
            .iter()
            .map(|(header, value)| (header.clone(), json!(value)))
            .collect();
        print_json(&json!({"domain": domain, "row": sheet_row, "values": map}));
        return;
    }

    println!(
        "{} {} row {}",
        "📋".bright_blue(),
        domain.bright_white().bold(),
        sheet_row.to_string().bright_yellow()
    );
    println!();
    for (header, value) in values {
        println!("  {:<30} {}", header.bright_white(), value);
    }
    println!();
}

pub fn bulk_progress(position: usize, total: usize, domain: &str, row: usize, as_json: bool) {
    if as_json {
        return;
    }

    println!();
    println!(
        "{} {}/{}: {} row {}",
        "🔄 Processing".bright_blue(),
        position,
        total,
        domain.bright_white().bold(),
        row.to_string().bright_yellow()
    );
}

pub fn bulk_counts(counts: &ContentCounts, difficulty: f64, as_json: bool) {
    if as_json {
        return;
    }

    println!(
        "  📊 {} links, {} PDFs, {} embeds, {} difficulty",
        counts.links.to_string().bright_white().bold(),
        counts.pdfs.to_string().bright_white().bold(),
        counts.embeds.to_string().bright_white().bold(),
        format!("{:.1}%", difficulty * 100.0).cyan()
    );
}

pub fn bulk_summary(summary: &BulkSummary, as_json: bool) {
    if as_json {
        print_json(summary);
        return;
    }

    let csv = summary.csv.display().to_string();
    if summary.template_created {
        println!("{} {}", "📝 Created template CSV file:".green(), csv.cyan());
        println!("   Fill in domain and row values, then run the command again.");
        return;
    }
    if summary.pending == 0 {
        println!("{}", "✅ All rows in the CSV have already been processed".green());
        return;
    }

    println!();
    println!(
        "{} Processed {}/{} rows",
        "✅ Bulk check complete.".green().bold(),
        summary.processed.to_string().bright_white().bold(),
        summary.pending
    );
    for failure in &summary.failed {
        println!(
            "  {} {} row {}: {}",
            "❌".red(),
            failure.domain,
            failure.row,
            failure.reason.bright_black()
        );
    }
    println!("  Results saved to {}", csv.cyan());
    println!();
}
