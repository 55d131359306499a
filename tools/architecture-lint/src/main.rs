//! CLI entry point for the repo-local architecture lint.
//!
//! Lints `discovery/` under the workspace root. The root is taken from
//! `CARGO_WORKSPACE_DIR` when set, otherwise it is two levels above this
//! tool's manifest (`tools/architecture-lint`).

use std::io::{self, Write};
use std::process::ExitCode;

use camino::Utf8PathBuf;

const LINTED_CRATE_DIR: &str = "discovery";

fn main() -> ExitCode {
    let Some(root) = workspace_root() else {
        let _ = writeln!(
            io::stderr().lock(),
            "unable to locate workspace root from CARGO_WORKSPACE_DIR or the tool manifest"
        );
        return ExitCode::FAILURE;
    };

    match architecture_lint::lint_crate_sources(&root.join(LINTED_CRATE_DIR)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = write!(io::stderr().lock(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn workspace_root() -> Option<Utf8PathBuf> {
    if let Ok(dir) = std::env::var("CARGO_WORKSPACE_DIR") {
        return Some(Utf8PathBuf::from(dir));
    }
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(ToOwned::to_owned)
}
