// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#[crud_derive::schema]
mod shop {
    #[entity]
    #[derive(Debug, Clone)]
    pub struct Product {
        #[id(auto_increment)]
        pub id: i64,
        pub name: String,
        pub price: f64
    }
}

use crud_derive::{Column, EntityId, Repository, Table};
use shop::*;

fn main() {
    let _: Column<ProductTable, EntityId<i64, ProductTable>> = ProductTable::ID;
    let _: Column<ProductTable, String> = ProductTable::NAME;
    let _: Column<ProductTable, f64> = ProductTable::PRICE;

    let data = ProductData {
        name:  "Lamp".into(),
        price: 19.5
    };
    let _ = data.clone();

    assert_eq!(ProductTable::def().name, "product");
    let _: fn(&mut crud_derive::sqlx::SqliteConnection) -> ProductRepo<'_> = ProductTable::repo;
    let _ = std::any::type_name::<Repository<'static, ProductTable>>();
}
