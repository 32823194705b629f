mod common;

use dsm_linker::application::services::DsmService;
use dsm_linker::domain::entities::LookupResult;
use dsm_linker::domain::registry::DomainRegistry;
use dsm_linker::error::AppError;
use std::sync::Arc;

fn service() -> DsmService {
    DsmService::new(Arc::new(DomainRegistry::builtin()))
}

#[test]
fn test_lookup_finds_row_with_trailing_slash() {
    let workbook = common::dsm_workbook();

    let result = service().lookup("http://web.musc.edu/about/", &workbook);

    let found = result.as_match().expect("about page is in the DSM");
    assert_eq!(found.domain, "Enterprise");
    assert_eq!(found.row_index, 5);
    assert_eq!(found.sheet_row, 10);
    assert_eq!(found.existing_url, "http://web.musc.edu/about");
    assert_eq!(found.proposed_url, "/new/about-us");
    assert_eq!(found.proposed_hierarchy.root, "Enterprise");
    assert_eq!(found.proposed_hierarchy.segments, vec!["new", "about-us"]);
    assert_eq!(
        found.proposed_hierarchy.render(),
        "Enterprise (Sites)\n > new\n > about-us"
    );
}

#[test]
fn test_lookup_unrelated_url_not_found() {
    let workbook = common::dsm_workbook();

    let result = service().lookup("https://unrelated.example.org/page", &workbook);

    assert_eq!(result, LookupResult::NotFound);
}

#[test]
fn test_lookup_requires_whole_token() {
    let workbook = common::dsm_workbook();

    assert!(!service().lookup("http://web.musc.edu/foo", &workbook).is_found());
    assert!(!service().lookup("http://web.musc.edu/abo", &workbook).is_found());
}

#[test]
fn test_lookup_ignores_fragment_and_case() {
    let workbook = common::dsm_workbook();

    let events = service().lookup("http://web.musc.edu/events#schedule", &workbook);
    assert_eq!(events.as_match().unwrap().sheet_row, 9);
    assert_eq!(events.as_match().unwrap().existing_url, "http://web.musc.edu/events/");

    let shouting = service().lookup("HTTP://WEB.MUSC.EDU/ABOUT", &workbook);
    assert_eq!(shouting.as_match().unwrap().sheet_row, 10);
}

#[test]
fn test_lookup_matches_any_url_in_cell() {
    let workbook = common::dsm_workbook();

    let result = service().lookup("http://web.musc.edu/newsroom", &workbook);

    let found = result.as_match().unwrap();
    assert_eq!(found.sheet_row, 8);
    assert_eq!(found.existing_url, "http://web.musc.edu/newsroom");
}

#[test]
fn test_lookup_searches_other_domains() {
    let workbook = common::dsm_workbook();

    let result = service().lookup("https://nursing.musc.edu/admissions", &workbook);

    let found = result.as_match().unwrap();
    assert_eq!(found.domain, "CON");
    assert_eq!(found.sheet_row, 6);
    assert_eq!(found.proposed_hierarchy.inline(), "Nursing / academics / admissions");
}

#[test]
fn test_lookup_blank_url() {
    let workbook = common::dsm_workbook();

    assert_eq!(service().lookup("", &workbook), LookupResult::NotFound);
    assert_eq!(service().lookup("  / ", &workbook), LookupResult::NotFound);
}

#[test]
fn test_index_skips_missing_worksheets() {
    let workbook = common::dsm_workbook();
    let service = service();

    let index = service.index(&workbook);

    assert_eq!(index.len(), 2);
    assert!(index.lookup("http://web.musc.edu/about").is_found());
}

#[test]
fn test_load_row_by_alias() {
    let workbook = common::dsm_workbook();

    let row = service().load_row("web", 10, &workbook).unwrap();

    assert_eq!(row.domain, "Enterprise");
    assert_eq!(row.row_index, 5);
    assert_eq!(row.existing_url, "http://web.musc.edu/about");
    assert_eq!(row.proposed_path, "/new/about-us");
    assert!(!row.multiple_urls);
}

#[test]
fn test_load_row_with_multiple_urls_uses_first() {
    let workbook = common::dsm_workbook();

    let row = service().load_row("Enterprise", 8, &workbook).unwrap();

    assert_eq!(row.existing_url, "http://web.musc.edu/news");
    assert!(row.multiple_urls);
}

#[test]
fn test_load_row_errors() {
    let workbook = common::dsm_workbook();
    let service = service();

    assert!(matches!(
        service.load_row("Nope", 10, &workbook),
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        service.load_row("Enterprise", 3, &workbook),
        Err(AppError::Validation { .. })
    ));
    assert!(matches!(
        service.load_row("Enterprise", 99, &workbook),
        Err(AppError::NotFound { .. })
    ));

    let missing_sheet = service.load_row("COM", 6, &workbook).unwrap_err();
    assert!(matches!(missing_sheet, AppError::NotFound { .. }));
    assert_eq!(missing_sheet.details()["sheet"], "COM");
}

#[test]
fn test_row_data_pairs_headers_with_values() {
    let workbook = common::dsm_workbook();

    let values = service().row_data("Enterprise", 10, &workbook).unwrap();

    assert!(values.contains(&("TITLE".to_string(), "About".to_string())));
    assert!(values.contains(&("PROPOSED URL".to_string(), "/new/about-us".to_string())));
}
