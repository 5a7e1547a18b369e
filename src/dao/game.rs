use tracing::error;

use crate::entity::ColumnMapping;
use crate::error::DbError;
use crate::executor::{Execute, fetch_one};
use crate::identifier::Identifier;
use crate::model::Game;
use crate::query_builder::{prepare_delete, prepare_insert, prepare_select, prepare_update};
use crate::results::{FromRowResult, RowResult, decode_rows};
use crate::statement::{Statement, create_fields};
use crate::types::RowValues;

// `order` is a keyword, so the column is quoted everywhere it appears in SQL
pub const GAME_COLUMNS: ColumnMapping = ColumnMapping::new(&[
    ("id", "id"),
    ("game_category", "game_category"),
    ("game_necessity", ""),
    ("name", "name"),
    ("alias", "alias"),
    ("player_count", "player_count"),
    ("img", "img"),
    ("credits", "credits"),
    ("description", "description"),
    ("highlight", "highlight"),
    ("views", "views"),
    ("order", "\"order\""),
    ("created_at", "created_at"),
]);

impl FromRowResult for Game {
    fn from_row(row: &mut RowResult) -> Result<Self, DbError> {
        let mut game = Game::default();
        let _ = row.get("id", &mut game.id);
        let _ = row.get("game_category", &mut game.game_category);
        let _ = row.get("name", &mut game.name);
        let _ = row.get_opt("alias", &mut game.alias);
        let _ = row.get("player_count", &mut game.player_count);
        let _ = row.get_opt("img", &mut game.img);
        let _ = row.get_opt("credits", &mut game.credits);
        let _ = row.get_opt("description", &mut game.description);
        let _ = row.get("highlight", &mut game.highlight);
        let _ = row.get_opt("views", &mut game.views);
        let _ = row.get("order", &mut game.order);
        let _ = row.get_opt("created_at", &mut game.created_at);
        row.ensure_parsed("unmarshal game")?;
        Ok(game)
    }
}

/// Every game in a category, by display order. An empty category yields an empty list.
///
/// # Errors
/// Execution errors, or [`DbError::ParseResult`] for the first row that does not decode.
pub async fn games_by_category<E: Execute + ?Sized>(
    target: &mut E,
    category: Identifier,
) -> Result<Vec<Game>, DbError> {
    let mut stmt = Statement::prepare(
        r#"select id, game_category, name, alias,
    player_count, img, credits,
    description, highlight, views, "order", created_at
from game
where game_category = :category:
order by "order""#,
    );
    stmt.bind("category", category);

    let rows = target.execute(stmt).await?;
    decode_rows(rows).inspect_err(|err| error!(error = %err, "games by category"))
}

/// The first game matching every present field of `filter`.
///
/// # Errors
/// [`DbError::MissingResult`] when nothing matches, otherwise as [`games_by_category`].
pub async fn get_game<E: Execute + ?Sized>(target: &mut E, filter: &Game) -> Result<Game, DbError> {
    let fields = create_fields(&GAME_COLUMNS);
    let stmt = prepare_select("game", &fields, Some("game"), &GAME_COLUMNS, filter)?;
    let mut row = fetch_one(target, stmt).await?;
    Game::from_row(&mut row)
}

/// # Errors
/// [`DbError::CreateStatement`] when `game` has no stored fields set, otherwise execution
/// errors.
pub async fn insert_game<E: Execute + ?Sized>(
    target: &mut E,
    game: &Game,
) -> Result<Option<Identifier>, DbError> {
    let mut stmt = prepare_insert("game", &GAME_COLUMNS, game)?;
    stmt.append_returning_id();
    let rows = target.execute(stmt).await?;
    super::returned_id(rows)
}

/// Apply the present fields of `game` to the rows matching `selectors`.
///
/// # Errors
/// [`DbError::CreateStatement`] when `game` has no stored fields set, otherwise execution
/// errors.
pub async fn update_game<E, I, K, V>(target: &mut E, game: &Game, selectors: I) -> Result<(), DbError>
where
    E: Execute + ?Sized,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RowValues>,
{
    let stmt = prepare_update("game", &GAME_COLUMNS, game, selectors)?;
    target.execute(stmt).await?;
    Ok(())
}

/// # Errors
/// Execution errors.
pub async fn delete_game<E: Execute + ?Sized>(target: &mut E, game: &Game) -> Result<(), DbError> {
    let stmt = prepare_delete("game", &GAME_COLUMNS, game)?;
    target.execute(stmt).await?;
    Ok(())
}
