// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Director/Movie round trips against in-memory SQLite.

use crud_derive::{
    Error, Table, create_tables, drop_tables,
    prelude::*,
    sqlx::{Connection, SqliteConnection}
};
use tracing_subscriber::EnvFilter;

#[crud_derive::schema]
mod cinema {
    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Director {
        #[id(auto_increment)]
        pub id: i64,
        #[column(varchar = 64)]
        pub name: String,
        #[back_reference(Movie)]
        pub movies: Option<Vec<Movie>>,
        #[back_reference(Biography)]
        pub biography: Option<Biography>
    }

    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Biography {
        #[id]
        #[foreign_key(Director)]
        pub director_id: i64,
        pub text: String
    }

    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Movie {
        #[id(auto_increment)]
        pub id: i64,
        #[unique]
        pub title: String,
        pub year: Option<i32>,
        #[foreign_key(Director)]
        pub director_id: i64,
        #[references(Director)]
        pub director: Option<Director>
    }

    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Genre {
        #[id(auto_increment)]
        pub id: i64,
        #[unique]
        pub name: String
    }

    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Film {
        #[id(auto_increment)]
        pub id: i64,
        pub title: String,
        #[foreign_key(Director)]
        pub director_id: i64,
        #[foreign_key(Director)]
        pub producer_id: i64
    }
}

use cinema::*;

async fn connect() -> SqliteConnection {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    create_tables(
        &mut conn,
        &[
            DirectorTable::def(),
            BiographyTable::def(),
            MovieTable::def(),
            GenreTable::def(),
            FilmTable::def()
        ]
    )
    .await
    .unwrap();
    conn
}

async fn director(conn: &mut SqliteConnection, name: &str) -> Director {
    DirectorTable::repo(conn)
        .create_returning(&DirectorData {
            name: name.to_owned()
        })
        .await
        .unwrap()
}

async fn movie(conn: &mut SqliteConnection, title: &str, director_id: i64) -> Movie {
    MovieTable::repo(conn)
        .create_returning(&MovieData {
            title: title.to_owned(),
            year: None,
            director_id
        })
        .await
        .unwrap()
}

fn sorted(mut movies: Vec<Movie>) -> Vec<Movie> {
    movies.sort_by_key(|movie| movie.id);
    movies
}

#[tokio::test]
async fn director_and_movie_example() {
    let mut conn = connect().await;

    let mut directors = DirectorTable::repo(&mut conn);
    directors
        .create(&DirectorData {
            name: "Alfred".into()
        })
        .await
        .unwrap();
    let alfred = directors
        .find_one(DirectorTable::NAME.eq("Alfred"))
        .await
        .unwrap()
        .unwrap();

    let mut movies = MovieTable::repo(&mut conn);
    movies
        .create(&MovieData {
            title:       "The Birds".into(),
            year:        Some(1963),
            director_id: alfred.id
        })
        .await
        .unwrap();

    let found = movies
        .select()
        .where_(MovieTable::DIRECTOR_ID.eq(alfred.id))
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.title, "The Birds");
    assert_eq!(found.year, Some(1963));
    assert_eq!(found.director, None);
}

#[tokio::test]
async fn created_record_has_generated_key() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    assert!(alfred.id > 0);
    assert_eq!(alfred.name, "Alfred");
    assert_eq!(alfred.movies, None);

    let ridley = director(&mut conn, "Ridley").await;
    assert_ne!(ridley.id, alfred.id);
}

#[tokio::test]
async fn insert_and_find_by_id_round_trip() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;

    let vertigo = Movie {
        id:          42,
        title:       "Vertigo".into(),
        year:        Some(1958),
        director_id: alfred.id,
        director:    None
    };
    let mut movies = MovieTable::repo(&mut conn);
    assert_eq!(movies.insert(&vertigo).await.unwrap(), 1);

    assert_eq!(movies.find_by_id(42).await.unwrap(), Some(vertigo.clone()));
    assert_eq!(
        movies.find_by_key(MovieTable::make_pk(&vertigo)).await.unwrap(),
        Some(vertigo)
    );
    assert_eq!(movies.find_by_id(43).await.unwrap(), None);
}

#[tokio::test]
async fn update_changes_only_the_target_row() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    let birds = movie(&mut conn, "The Birds", alfred.id).await;
    let psycho = movie(&mut conn, "Psycho", alfred.id).await;

    let mut movies = MovieTable::repo(&mut conn);
    let renamed = Movie {
        title: "The Birds (1963)".into(),
        year: Some(1963),
        ..birds.clone()
    };
    assert_eq!(movies.update(&renamed).await.unwrap(), 1);

    assert_eq!(
        movies.find_one(MovieTable::TITLE.eq("The Birds")).await.unwrap(),
        None
    );
    assert_eq!(movies.find_by_id(birds.id).await.unwrap(), Some(renamed));
    assert_eq!(movies.find_by_id(psycho.id).await.unwrap(), Some(psycho));
}

#[tokio::test]
async fn update_where_rewrites_matching_rows() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    let birds = movie(&mut conn, "The Birds", alfred.id).await;

    let mut movies = MovieTable::repo(&mut conn);
    let changed = movies
        .update_where(MovieTable::ID.eq(birds.id), &MovieData {
            title:       "Les Oiseaux".into(),
            year:        Some(1963),
            director_id: alfred.id
        })
        .await
        .unwrap();
    assert_eq!(changed, 1);
    let stored = movies.find_by_id(birds.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Les Oiseaux");
    assert_eq!(stored.year, Some(1963));
}

#[tokio::test]
async fn forward_reference_needs_the_related_set() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    let birds = movie(&mut conn, "The Birds", alfred.id).await;

    let plain = MovieTable::repo(&mut conn)
        .find_by_id(birds.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plain.director, None);

    let joined = MovieTable::repo(&mut conn)
        .with_related(DirectorTable)
        .find_by_id(birds.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(joined.director, Some(alfred));
    assert_eq!(joined.title, birds.title);
}

#[tokio::test]
async fn back_reference_collects_every_related_record() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    let ridley = director(&mut conn, "Ridley").await;
    let birds = movie(&mut conn, "The Birds", alfred.id).await;
    let psycho = movie(&mut conn, "Psycho", alfred.id).await;

    let mut repo = DirectorTable::repo(&mut conn);
    repo.include::<MovieTable>();
    assert!(repo.related().contains::<MovieTable>());
    let directors = repo.select_all().await.unwrap();
    assert_eq!(directors.len(), 2);

    let found = directors.iter().find(|d| d.id == alfred.id).unwrap();
    assert_eq!(sorted(found.movies.clone().unwrap()), sorted(vec![psycho, birds]));

    let empty = directors.iter().find(|d| d.id == ridley.id).unwrap();
    assert_eq!(empty.movies, Some(Vec::new()));

    repo.clear_related();
    let unjoined = repo.find_by_id(alfred.id).await.unwrap().unwrap();
    assert_eq!(unjoined.movies, None);
}

#[tokio::test]
async fn first_with_joins_keeps_every_joined_row() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    movie(&mut conn, "The Birds", alfred.id).await;
    movie(&mut conn, "Psycho", alfred.id).await;
    movie(&mut conn, "Vertigo", alfred.id).await;

    let found = DirectorTable::repo(&mut conn)
        .with_related(MovieTable)
        .select()
        .where_(DirectorTable::ID.eq(alfred.id))
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.movies.map(|movies| movies.len()), Some(3));
}

#[tokio::test]
async fn create_with_related_links_the_new_record() {
    let mut conn = connect().await;
    let mut movies = MovieTable::repo(&mut conn);

    let alien = movies
        .create_with_related(
            MovieData {
                title:       "Alien".into(),
                year:        Some(1979),
                director_id: 0
            },
            Some(DirectorData {
                name: "Ridley".into()
            })
        )
        .await
        .unwrap();
    assert_ne!(alien.director_id, 0);

    let ridley = movies
        .repo_for::<DirectorTable>()
        .find_by_id(alien.director_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ridley.name, "Ridley");

    let blade_runner = movies
        .create_with_related(
            MovieData {
                title:       "Blade Runner".into(),
                year:        Some(1982),
                director_id: ridley.id
            },
            None
        )
        .await
        .unwrap();
    assert_eq!(blade_runner.director_id, ridley.id);
}

#[tokio::test]
async fn deletes_report_affected_rows() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    let birds = movie(&mut conn, "The Birds", alfred.id).await;
    let psycho = movie(&mut conn, "Psycho", alfred.id).await;
    let vertigo = movie(&mut conn, "Vertigo", alfred.id).await;

    let mut movies = MovieTable::repo(&mut conn);
    assert_eq!(movies.delete(&birds).await.unwrap(), 1);
    assert_eq!(movies.delete(&birds).await.unwrap(), 0);
    assert_eq!(movies.delete_by_id(psycho.id).await.unwrap(), 1);
    assert_eq!(
        movies
            .delete_by_key(MovieTable::make_pk(&vertigo))
            .await
            .unwrap(),
        1
    );
    assert!(movies.select_all().await.unwrap().is_empty());

    let mut directors = DirectorTable::repo(&mut conn);
    assert_eq!(
        directors
            .delete_where(DirectorTable::NAME.eq("Alfred"))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn typed_select_clauses() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    let ridley = director(&mut conn, "Ridley").await;
    movie(&mut conn, "The Birds", alfred.id).await;
    movie(&mut conn, "Psycho", alfred.id).await;
    movie(&mut conn, "Alien", ridley.id).await;

    let mut movies = MovieTable::repo(&mut conn);
    let titles: Vec<String> = movies
        .select()
        .order_by(MovieTable::TITLE, SortDirection::Asc)
        .all()
        .await
        .unwrap()
        .into_iter()
        .map(|movie| movie.title)
        .collect();
    assert_eq!(titles, ["Alien", "Psycho", "The Birds"]);

    let limited = movies.select().limit(2).all().await.unwrap();
    assert_eq!(limited.len(), 2);

    let either = movies
        .select()
        .where_(MovieTable::TITLE.eq("Alien"))
        .or_where(MovieTable::TITLE.eq("Psycho"))
        .all()
        .await
        .unwrap();
    assert_eq!(either.len(), 2);

    let both = movies
        .select()
        .where_(MovieTable::DIRECTOR_ID.eq(alfred.id))
        .and_where(MovieTable::TITLE.like("P%"))
        .all()
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].title, "Psycho");

    let distinct = movies.select().distinct(true).all().await.unwrap();
    assert_eq!(distinct.len(), 3);

    let undated = movies
        .select()
        .where_(MovieTable::YEAR.is_null())
        .all()
        .await
        .unwrap();
    assert_eq!(undated.len(), 3);
}

#[tokio::test]
async fn lazy_select_can_be_restarted() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    movie(&mut conn, "The Birds", alfred.id).await;

    let mut movies = MovieTable::repo(&mut conn);
    let mut lazy = movies.select_all_lazy();
    let first: Vec<Movie> = lazy.stream().try_collect().await.unwrap();
    let second: Vec<Movie> = lazy.stream().try_collect().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn unique_index_rejects_duplicates() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    movie(&mut conn, "The Birds", alfred.id).await;

    let err = MovieTable::repo(&mut conn)
        .create(&MovieData {
            title:       "The Birds".into(),
            year:        None,
            director_id: alfred.id
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn unrelated_table_cannot_join() {
    let mut conn = connect().await;
    let err = MovieTable::repo(&mut conn)
        .with_related(GenreTable)
        .select_all()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnrelatedTable {
            base:  "movie",
            table: "genre"
        }
    ));
}

#[tokio::test]
async fn single_back_reference_is_filled_when_present() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    let orson = director(&mut conn, "Orson").await;
    let biography = Biography {
        director_id: alfred.id,
        text:        "Born in Leytonstone".into()
    };
    BiographyTable::repo(&mut conn).insert(&biography).await.unwrap();

    let directors = DirectorTable::repo(&mut conn)
        .with_related(BiographyTable)
        .select()
        .order_by(DirectorTable::ID, SortDirection::Asc)
        .all()
        .await
        .unwrap();
    assert_eq!(directors.len(), 2);
    assert_eq!(directors[0].id, alfred.id);
    assert_eq!(directors[0].biography, Some(biography));
    assert_eq!(directors[1].id, orson.id);
    assert_eq!(directors[1].biography, None);
}

#[tokio::test]
async fn two_keys_to_one_table_cannot_join() {
    let mut conn = connect().await;
    let alfred = director(&mut conn, "Alfred").await;
    FilmTable::repo(&mut conn)
        .create(&FilmData {
            title:       "Psycho".into(),
            director_id: alfred.id,
            producer_id: alfred.id
        })
        .await
        .unwrap();

    let from_film = FilmTable::repo(&mut conn)
        .with_related(DirectorTable)
        .select_all()
        .await
        .unwrap_err();
    let from_director = DirectorTable::repo(&mut conn)
        .with_related(FilmTable)
        .find_by_id(alfred.id)
        .await
        .unwrap_err();
    for err in [from_film, from_director] {
        assert!(matches!(
            err,
            Error::AmbiguousJoin {
                from:   "film",
                to:     "director",
                first:  "director_id",
                second: "producer_id"
            }
        ));
    }

    let films = FilmTable::repo(&mut conn).select_all().await.unwrap();
    assert_eq!(films[0].producer_id, alfred.id);
}

#[tokio::test]
async fn tables_can_be_dropped() {
    let mut conn = connect().await;
    drop_tables(
        &mut conn,
        &[
            DirectorTable::def(),
            BiographyTable::def(),
            MovieTable::def(),
            GenreTable::def(),
            FilmTable::def()
        ]
    )
    .await
    .unwrap();
    let err = DirectorTable::repo(&mut conn).select_all().await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}
