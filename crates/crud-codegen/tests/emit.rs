// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Emission sink writes.

use std::fs;

use crud_codegen::{Builder, Error};

const VALID: &str = r#"
use crud_derive::Entity;

#[derive(Entity)]
#[entity]
pub struct Director {
    #[id(auto_increment)]
    pub id: i64,
    pub name: String
}

#[derive(Entity)]
#[entity(table = "movies")]
pub struct Movie {
    #[id(auto_increment)]
    pub id: i64,
    pub title: String,
    #[foreign_key(Director)]
    pub director_id: i64
}

pub fn unrelated() {}
"#;

const INVALID: &str = r#"
#[entity]
pub struct Review {
    pub text: String
}
"#;

#[test]
fn writes_one_file_per_entity() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let models = src.path().join("models.rs");
    fs::write(&models, VALID).unwrap();

    let written = Builder::new()
        .declarations(&models)
        .out_dir(out.path())
        .rerun_if_changed(false)
        .generate()
        .unwrap();

    assert_eq!(written.len(), 2);
    assert!(out.path().join("director.rs").exists());
    let movie = fs::read_to_string(out.path().join("movie.rs")).unwrap();
    assert!(movie.contains("MovieTable"));
    assert!(movie.contains("\"movies\""));
    assert!(syn::parse_file(&movie).is_ok());
}

#[test]
fn custom_runtime_path_is_used() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let models = src.path().join("models.rs");
    fs::write(&models, VALID).unwrap();

    Builder::new()
        .declarations(&models)
        .out_dir(out.path())
        .runtime_path(syn::parse_quote!(crate::runtime))
        .rerun_if_changed(false)
        .generate()
        .unwrap();

    let director = fs::read_to_string(out.path().join("director.rs")).unwrap();
    assert!(director.contains("crate :: runtime :: Table"));
    assert!(!director.contains("crud_derive"));
}

#[test]
fn nothing_is_written_when_any_entity_fails() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let valid = src.path().join("valid.rs");
    let invalid = src.path().join("invalid.rs");
    fs::write(&valid, VALID).unwrap();
    fs::write(&invalid, INVALID).unwrap();

    let err = Builder::new()
        .declarations(&valid)
        .declarations(&invalid)
        .out_dir(out.path())
        .rerun_if_changed(false)
        .generate()
        .unwrap_err();

    match &err {
        Error::Diagnostics(diagnostics) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].handle.origin.as_deref(), Some(invalid.as_path()));
        }
        other => panic!("unexpected {other}")
    }
    assert!(err.to_string().contains("invalid.rs: Review"));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn unparsable_file_is_reported() {
    let src = tempfile::tempdir().unwrap();
    let models = src.path().join("broken.rs");
    fs::write(&models, "pub struct {").unwrap();

    let err = Builder::new()
        .declarations(&models)
        .out_dir(src.path())
        .generate()
        .unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
}
