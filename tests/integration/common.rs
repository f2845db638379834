use assert_cmd::Command;
use std::path::Path;

pub const MOVIES_API: &str = r#"package movies

import "context"

type Repository interface {
	Get(ctx context.Context, id string) (string, error)
	Put(name string) error
}
"#;

/// Lay down a minimal Go module with one definition package.
pub fn write_project(root: &Path) {
    std::fs::write(root.join("go.mod"), "module example\n\ngo 1.22.1\n").unwrap();
    let api = root.join("api/movies");
    std::fs::create_dir_all(&api).unwrap();
    std::fs::write(api.join("movies.go"), MOVIES_API).unwrap();
}

pub fn implgen(root: &Path, subcommand: &str) -> Command {
    let mut cmd = Command::cargo_bin("implgen").unwrap();
    cmd.arg(subcommand).arg("--root").arg(root);
    cmd
}

pub fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}
