// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Declarations shared with a build script keep their attributes.

use crud_derive::Entity;

#[derive(Entity, Debug)]
#[entity(table = "directors")]
pub struct Director {
    #[id(auto_increment)]
    pub id: i64,
    #[column(varchar = 64)]
    pub name: String
}

#[derive(Entity, Debug)]
#[entity]
pub struct Movie {
    #[id(auto_increment)]
    pub id: i64,
    #[unique]
    pub title: String,
    #[foreign_key(Director)]
    pub director_id: i64,
    #[references(Director)]
    pub director: Option<Director>
}

fn main() {
    let _ = Director {
        id:   1,
        name: "Alfred".into()
    };
}
