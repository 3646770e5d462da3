// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#[crud_derive::schema]
mod catalog {
    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Language {
        #[id]
        pub code: String,
        #[id]
        pub region: String,
        pub name: String
    }

    #[entity]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Subtitle {
        #[id]
        pub id: u32,
        #[foreign_key(Language, column = "code")]
        pub language: String,
        #[foreign_key(Language, column = "region")]
        pub region: String,
        #[references(Language, columns(language, region))]
        pub spoken: Option<Language>
    }
}

use catalog::*;
use crud_derive::{Column, CompositeId, EntityId, Result, Table};

async fn lookup(repo: &mut LanguageRepo<'_>) -> Result<Option<Language>> {
    repo.find_by_id("en".to_owned(), "GB".to_owned()).await
}

async fn remove(repo: &mut SubtitleRepo<'_>) -> Result<u64> {
    repo.delete_by_id(3).await
}

fn main() {
    let _: Column<LanguageTable, EntityId<String, LanguageTable>> = LanguageTable::CODE;
    let _: Column<SubtitleTable, EntityId<String, LanguageTable>> = SubtitleTable::LANGUAGE;
    let _: Column<SubtitleTable, EntityId<u32, SubtitleTable>> = SubtitleTable::ID;
    let id: <LanguageTable as Table>::Id = CompositeId::new().with("en").with("GB");
    let _ = id;
    let _ = lookup;
    let _ = remove;
}
