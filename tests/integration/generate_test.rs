use crate::common::{implgen, read, write_project, MOVIES_API};
use pretty_assertions::assert_eq;

#[test]
fn scaffolds_a_brand_new_contract() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());

    implgen(tmp.path(), "generate").assert().code(0);

    let got = read(tmp.path(), "internal/movies/repository_impl.go");
    let expected = r#"// This file will be automatically regenerated based on the API. Any repository implementations
// will be copied through when generating and new methods will be added to the end.
package moviesimpl

import (
	"context"

	"example/api/movies"
	"github.com/rotisserie/eris"
	"go.opentelemetry.io/otel"
	"go.opentelemetry.io/otel/codes"
	"go.uber.org/fx"
)

type Dependencies struct {
	fx.In
	// Add dependencies here
}

var Options = fx.Options(
	fx.Provide(
		NewRepository,
	),
)

func NewRepository(deps Dependencies) movies.Repository {
	return &repositoryImpl{
		Dependencies: deps,
	}
}

type repositoryImpl struct {
	Dependencies
}

func (r *repositoryImpl) Get(ctx context.Context, id string) (_ string, err error) {
	ctx, span := otel.GetTracerProvider().Tracer("movies").Start(ctx, "Repository.Get")
	defer func() {
		if err != nil {
			err = eris.Wrap(err, "movies.Repository.Get")
			span.SetStatus(codes.Error, "")
			span.RecordError(err)
		}
		span.End()
	}()
	_ = ctx
	panic("TODO: implement movies.Repository.Get")
}

func (r *repositoryImpl) Put(name string) (err error) {
	defer func() {
		if err != nil {
			err = eris.Wrap(err, "movies.Repository.Put")
		}
	}()
	panic("TODO: implement movies.Repository.Put")
}
"#;
    assert_eq!(got, expected);
}

#[test]
fn writes_the_registry_for_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());

    implgen(tmp.path(), "generate").assert().code(0);

    let got = read(tmp.path(), "internal/repositories.go");
    let expected = r#"// DO NOT MODIFY
// This file will be automatically regenerated based on the API.
package internal

//go:generate mockgen -source=api/movies/movies.go -destination=internal/movies/mocks/movies.go

import (
	moviesimpl "example/internal/movies"
	"go.uber.org/fx"
)

var Repositories = fx.Options(
	moviesimpl.Options,
)
"#;
    assert_eq!(got, expected);
}

#[test]
fn appends_only_the_missing_methods() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());
    let internal = tmp.path().join("internal/movies");
    std::fs::create_dir_all(&internal).unwrap();
    std::fs::write(
        internal.join("movies.go"),
        r#"package moviesimpl

import (
	"context"
)

type repositoryImpl struct{}

func (r *repositoryImpl) Get(ctx context.Context, id string) (string, error) {
	return id, nil
}
"#,
    )
    .unwrap();

    implgen(tmp.path(), "generate").assert().code(0);

    let got = read(tmp.path(), "internal/movies/movies.go");
    assert!(got.contains("return id, nil"));
    assert!(!got.contains("TODO: implement movies.Repository.Get"));
    assert!(got.contains(
        "func (r *repositoryImpl) Put(name string) (err error) {\n\tdefer func() {\n\t\tif err != nil {\n\t\t\terr = eris.Wrap(err, \"movies.Repository.Put\")\n\t\t}\n\t}()\n\tpanic(\"TODO: implement movies.Repository.Put\")\n}\n"
    ));
    assert!(got.contains("\t\"github.com/rotisserie/eris\"\n"));
    // No scaffolding for a type that already exists.
    assert!(!got.contains("fx.Provide"));
    assert!(!tmp.path().join("internal/movies/repository_impl.go").exists());
}

#[test]
fn regeneration_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path());

    implgen(tmp.path(), "generate").assert().code(0);
    let impl_first = read(tmp.path(), "internal/movies/repository_impl.go");
    let registry_first = read(tmp.path(), "internal/repositories.go");

    implgen(tmp.path(), "generate").assert().code(0);
    assert_eq!(read(tmp.path(), "internal/movies/repository_impl.go"), impl_first);
    assert_eq!(read(tmp.path(), "internal/repositories.go"), registry_first);
}

#[test]
fn ignores_interfaces_without_the_contract_suffix() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("go.mod"), "module example\n").unwrap();
    let api = tmp.path().join("api/movies");
    std::fs::create_dir_all(&api).unwrap();
    std::fs::write(
        api.join("movies.go"),
        "package movies\n\ntype Service interface {\n\tA()\n}\n",
    )
    .unwrap();

    implgen(tmp.path(), "generate").assert().code(0);

    assert!(!tmp.path().join("internal").exists());
}

#[test]
fn test_files_are_not_scanned() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("go.mod"), "module example\n").unwrap();
    let api = tmp.path().join("api/movies");
    std::fs::create_dir_all(&api).unwrap();
    std::fs::write(api.join("movies_test.go"), MOVIES_API).unwrap();

    implgen(tmp.path(), "generate").assert().code(0);

    assert!(!tmp.path().join("internal").exists());
}

#[test]
fn fails_outside_a_go_module() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("api")).unwrap();

    implgen(tmp.path(), "generate").assert().failure();
}
