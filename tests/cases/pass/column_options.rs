// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#[crud_derive::schema]
mod accounts {
    #[entity(table = "user_accounts")]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Account {
        #[id(auto_increment)]
        pub id: u32,
        #[unique(group = "login")]
        #[column(varchar = 32)]
        pub tenant: String,
        #[unique(group = "login")]
        #[column(name = "login_name")]
        pub login: String,
        #[unique]
        pub email: Option<String>,
        #[column(default = true)]
        pub active: bool,
        #[column(default = 0)]
        pub failed_logins: u16,
        #[column(default_text = "en")]
        pub locale: String,
        #[column(default = "(strftime('%s', 'now'))")]
        pub created_at: i64,
        pub score: f32,
        pub level: i8,
        pub avatar: Option<Vec<u8>>
    }
}

use accounts::*;
use crud_derive::{Column, Table};

fn main() {
    let def = AccountTable::def();
    assert_eq!(def.name, "user_accounts");
    let _: Column<AccountTable, String> = AccountTable::LOGIN;
    assert_eq!(AccountTable::LOGIN.name(), "login_name");
    let _: Column<AccountTable, Option<String>> = AccountTable::EMAIL;
    let _: Column<AccountTable, Option<Vec<u8>>> = AccountTable::AVATAR;
}
