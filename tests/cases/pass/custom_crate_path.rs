// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

extern crate crud_derive as orm;

#[orm::schema(crate = "::orm")]
mod notes {
    #[entity]
    pub struct Note {
        #[id(auto_increment)]
        pub id: i32,
        pub body: String
    }
}

use orm::Table;

fn main() {
    assert_eq!(notes::NoteTable::def().name, "note");
}
