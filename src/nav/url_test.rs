use super::*;

const BASE: &str = "https://scanner.local/jobs?page=2";

#[test]
fn relative_href_resolves_against_base() {
    let url = resolve("/reports", BASE).unwrap();
    assert_eq!(url.as_str(), "https://scanner.local/reports");
    assert_eq!(resolve("settings", "https://scanner.local/admin/users").unwrap().path(), "/admin/settings");
}

#[test]
fn unparsable_base_resolves_to_none() {
    assert!(resolve("/reports", "not a url").is_none());
}

#[test]
fn same_origin_accepts_relative_and_matching_absolute() {
    assert!(is_same_origin("/reports", BASE));
    assert!(is_same_origin("https://scanner.local/settings", BASE));
    assert!(is_same_origin("https://scanner.local:443/settings", BASE));
}

#[test]
fn different_host_scheme_or_port_is_cross_origin() {
    assert!(!is_same_origin("https://example.com/reports", BASE));
    assert!(!is_same_origin("http://scanner.local/reports", BASE));
    assert!(!is_same_origin("https://scanner.local:8443/reports", BASE));
    assert!(!is_same_origin("mailto:admin@scanner.local", BASE));
}

#[test]
fn path_of_strips_query_and_fragment() {
    assert_eq!(path_of("/reports?days=7#top", BASE), "/reports");
    assert_eq!(path_of("https://scanner.local/", BASE), "/");
}

#[test]
fn path_of_falls_back_to_raw_href() {
    assert_eq!(path_of("/reports", "::"), "/reports");
}

#[test]
fn root_is_represented_by_alias_tab() {
    assert!(tab_matches("/main", "/", "/", "/main"));
    assert!(tab_matches("/reports", "/reports", "/", "/main"));
    assert!(!tab_matches("/reports", "/", "/", "/main"));
    assert!(!tab_matches("/main", "/reports", "/", "/main"));
}

#[test]
fn fragment_only_detection() {
    assert!(is_fragment_only("#details"));
    assert!(is_fragment_only("#"));
    assert!(!is_fragment_only("/reports#details"));
}
