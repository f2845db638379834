use crate::common::{implgen, write_project};
use predicates::prelude::*;

#[test]
fn exit_code_1_when_out_of_date() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());

    implgen(tmp.path(), "check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("would create"))
        .stderr(predicate::str::contains("out of date"));
}

#[test]
fn check_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());

    implgen(tmp.path(), "check").assert().code(1);

    assert!(!tmp.path().join("internal").exists());
}

#[test]
fn exit_code_0_after_generate() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());

    implgen(tmp.path(), "generate").assert().code(0);
    implgen(tmp.path(), "check")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("up to date"));
}

#[test]
fn exit_code_1_after_contract_grows() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());

    implgen(tmp.path(), "generate").assert().code(0);

    std::fs::write(
        tmp.path().join("api/movies/movies.go"),
        r#"package movies

import "context"

type Repository interface {
	Get(ctx context.Context, id string) (string, error)
	Put(name string) error
	Delete(id string) error
}
"#,
    )
    .unwrap();

    implgen(tmp.path(), "check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("would update"));
}
