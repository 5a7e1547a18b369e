//! Domain objects served by the backend.
//!
//! Every field is optional: a partially filled object doubles as a filter (select/delete),
//! a change set (update) or a new row (insert), depending on which fields are present.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::bindable;
use crate::identifier::Identifier;

/// Translations keyed by language code, stored as a `jsonb` object.
pub type Translations = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<Identifier>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

bindable!(Account { id, name, email, password });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Option<Identifier>,
    pub game_category: Option<Identifier>,
    pub game_necessity: Option<Identifier>,
    pub name: Option<Translations>,
    pub alias: Option<Translations>,
    pub player_count: Option<i32>,
    pub img: Option<String>,
    pub credits: Option<String>,
    pub description: Option<Translations>,
    pub highlight: Option<bool>,
    pub views: Option<i32>,
    pub order: Option<i32>,
    pub created_at: Option<DateTime<FixedOffset>>,
}

bindable!(Game {
    id,
    game_category,
    game_necessity,
    name,
    alias,
    player_count,
    img,
    credits,
    description,
    highlight,
    views,
    order,
    created_at,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameCategory {
    pub id: Option<Identifier>,
    pub name: Option<Translations>,
    pub description: Option<Translations>,
    pub img: Option<String>,
    pub order: Option<i32>,
}

bindable!(GameCategory { id, name, description, img, order });

/// Link between a game and something needed to play it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameNecessity {
    pub game: Option<Identifier>,
    pub necessity: Option<Identifier>,
}

bindable!(GameNecessity { game, necessity });
