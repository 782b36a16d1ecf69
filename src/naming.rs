// Canonical remote filename: `basename + "_" + timestamp`, sanitized and
// suffixed with `.csv.gz`. Names only resolve to the second, so two uploads
// of the same path within one second get the same name.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::source::basename;

pub const CANONICAL_SUFFIX: &str = ".csv.gz";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive the canonical name for `path` as of `now`.
///
/// `-`, `:` and whitespace are dropped, then every `.csv` is removed until
/// none is left, then the suffix is appended:
///
/// `/tmp/report.csv` at `2024-01-05 10:30:00` gives
/// `report_20240105103000.csv.gz`.
pub fn derive(path: &Path, now: &NaiveDateTime) -> String {
    let raw = format!("{}_{}", basename(path), now.format(TIMESTAMP_FORMAT));

    let mut name: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ':') && !c.is_whitespace())
        .collect();
    while let Some(at) = name.find(".csv") {
        name.replace_range(at..at + 4, "");
    }

    name.push_str(CANONICAL_SUFFIX);
    name
}

/// The logical filename reported to the server: the override when one was
/// given and is non-empty, otherwise the derived name.
pub fn resolve(override_name: Option<&str>, derived: &str) -> String {
    match override_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => derived.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn at(h: u32, m: u32, s: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_milli_opt(h, m, s, milli)
            .unwrap()
    }

    #[test]
    fn derive_report_csv() {
        let name = derive(Path::new("/tmp/report.csv"), &at(10, 30, 0, 0));
        assert_eq!(name, "report_20240105103000.csv.gz");
    }

    #[test]
    fn sub_second_timestamps_collide() {
        let path = Path::new("/data/vendas.csv");
        assert_eq!(
            derive(path, &at(23, 59, 59, 1)),
            derive(path, &at(23, 59, 59, 999))
        );
    }

    #[rstest]
    #[case("/tmp/my report - final.csv")]
    #[case("relative/a:b.csv.csv")]
    #[case("/x/.c-sv.csv")]
    #[case("/x/..csvcsv")]
    #[case("no_extension")]
    #[case("/tmp/tab\tseparated.txt")]
    fn derive_is_sanitized(#[case] path: &str) {
        let name = derive(Path::new(path), &at(8, 5, 9, 0));
        let stem = name.strip_suffix(CANONICAL_SUFFIX).unwrap();

        assert!(!stem.contains(".csv"), "{}", name);
        assert!(!stem.contains('-'), "{}", name);
        assert!(!stem.contains(':'), "{}", name);
        assert!(!stem.chars().any(char::is_whitespace), "{}", name);
        assert!(stem.ends_with("_20240105080509"), "{}", name);
    }

    #[test]
    fn derive_keeps_other_extensions() {
        let name = derive(Path::new("dados.json"), &at(0, 0, 0, 0));
        assert_eq!(name, "dados.json_20240105000000.csv.gz");
    }

    #[rstest]
    #[case(None, "derived.csv.gz")]
    #[case(Some(""), "derived.csv.gz")]
    #[case(Some("custom.csv.gz"), "custom.csv.gz")]
    fn resolve_prefers_override(#[case] override_name: Option<&str>, #[case] expected: &str) {
        assert_eq!(resolve(override_name, "derived.csv.gz"), expected);
    }
}
