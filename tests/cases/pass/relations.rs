// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#[crud_derive::schema]
mod cinema {
    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Director {
        #[id(auto_increment)]
        pub id: i64,
        pub name: String,
        #[back_reference(Movie)]
        pub movies: Option<Vec<Movie>>
    }

    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Movie {
        #[id(auto_increment)]
        pub id: i64,
        pub title: String,
        #[foreign_key(Director)]
        pub director_id: i64,
        #[references(Director)]
        pub director: Option<Director>
    }

    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Poster {
        #[id(auto_increment)]
        pub id: i64,
        #[foreign_key(Movie)]
        pub movie_id: Option<i64>,
        pub image: Vec<u8>,
        #[references(Movie)]
        pub movie: Option<Movie>
    }
}

use cinema::*;
use crud_derive::{Column, EntityId, Result};

async fn create_all(repo: &mut MovieRepo<'_>) -> Result<Movie> {
    repo.create_with_related(
        MovieData {
            title:       "Alien".into(),
            director_id: 0
        },
        Some(DirectorData {
            name: "Ridley".into()
        })
    )
    .await
}

async fn poster(repo: &mut PosterRepo<'_>) -> Result<Poster> {
    repo.create_with_related(
        PosterData {
            movie_id: None,
            image:    vec![0x89, 0x50]
        },
        None
    )
    .await
}

fn main() {
    let _: Column<MovieTable, EntityId<i64, DirectorTable>> = MovieTable::DIRECTOR_ID;
    let _: Column<PosterTable, Option<EntityId<i64, MovieTable>>> = PosterTable::MOVIE_ID;
    let _ = create_all;
    let _ = poster;
}
