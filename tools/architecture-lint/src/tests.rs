//! Unit tests for the architecture lint.

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};

use super::*;

#[derive(Clone, Copy)]
struct LintSingle;

impl LintSingle {
    fn lint(self, file: &str, contents: &str) -> Result<(), ArchitectureLintError> {
        lint_sources(&[LintSource {
            file: Utf8PathBuf::from(file),
            contents: contents.to_owned(),
        }])
    }
}

#[fixture]
fn lint_single() -> LintSingle {
    LintSingle
}

#[rstest]
#[case(
    "domain/catalog/mod.rs",
    "use crate::domain::ports::PoiSource; fn load(_: &dyn PoiSource) {}",
    true
)]
#[case(
    "domain/catalog/mod.rs",
    "use super::ranking::rank_by_distance; fn order() { let _ = rank_by_distance; }",
    true
)]
#[case(
    "domain/catalog/mod.rs",
    "use crate::outbound::memory::InMemoryReviewStore; fn load() { let _ = InMemoryReviewStore::new; }",
    false
)]
#[case(
    "domain/reviews/ledger.rs",
    "use discovery::outbound::photos::FilePhotoLibrary; fn open() {}",
    false
)]
#[case(
    "domain/geo_query.rs",
    "fn fetch() { let _ = reqwest::Client::new(); }",
    false
)]
#[case(
    "domain/place.rs",
    "use crate::config::DiscoverySettings; fn radius(_: &DiscoverySettings) {}",
    false
)]
#[case("domain/reviews/model.rs", "use cap_std::fs::Dir; fn open(_: Dir) {}", false)]
#[case(
    "outbound/overpass/http_source.rs",
    "use reqwest::Client; use crate::domain::ports::PoiSource; fn build() { let _ = Client::new(); }",
    true
)]
#[case(
    "outbound/identity.rs",
    "use crate::config::DiscoverySettings; fn dir(_: &DiscoverySettings) {}",
    false
)]
#[case(
    "outbound/notifications.rs",
    "fn init() { tracing_subscriber::fmt().init(); }",
    false
)]
fn detects_boundary_violations(
    lint_single: LintSingle,
    #[case] file: &str,
    #[case] contents: &str,
    #[case] ok: bool,
) {
    let result = lint_single.lint(file, contents);
    assert_eq!(result.is_ok(), ok, "result: {result:?}");
}

#[rstest]
fn reports_each_forbidden_root_once(lint_single: LintSingle) {
    let result = lint_single.lint(
        "domain/geo_query.rs",
        "use reqwest::Client; use reqwest::Url; use crate::outbound::overpass; fn f() {}",
    );

    let Err(ArchitectureLintError::Violations(violations)) = result else {
        panic!("expected violations, got {result:?}");
    };
    let messages = violations
        .iter()
        .map(|violation| violation.message.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        messages,
        [
            "domain module must not depend on crate::outbound",
            "domain module must not depend on external crate `reqwest`",
        ]
    );
}

#[rstest]
fn rejects_files_outside_known_layers(lint_single: LintSingle) {
    let result = lint_single.lint("bin/discover.rs", "fn main() {}");
    assert!(matches!(result, Err(ArchitectureLintError::Parse { .. })));
}

#[rstest]
fn walks_layer_directories_on_disk() {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp path");
    let src = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open temp dir");
    src.create_dir_all("src/domain/reviews").expect("domain dir");
    src.create_dir_all("src/outbound").expect("outbound dir");
    src.create_dir_all("src/bin").expect("bin dir");
    src.write("src/domain/reviews/ledger.rs", "use crate::domain::Review;")
        .expect("write domain file");
    src.write("src/outbound/memory.rs", "use crate::config::DiscoverySettings;")
        .expect("write outbound file");
    src.write("src/bin/discover.rs", "use clap::Parser;")
        .expect("write bin file");
    src.write("src/domain/notes.txt", "use crate::outbound;")
        .expect("write non-rust file");

    let result = lint_crate_sources(&root);

    let Err(ArchitectureLintError::Violations(violations)) = result else {
        panic!("expected violations, got {result:?}");
    };
    let files = violations
        .iter()
        .map(|violation| violation.file.as_str())
        .collect::<Vec<_>>();
    assert_eq!(files, ["outbound/memory.rs"]);
}
