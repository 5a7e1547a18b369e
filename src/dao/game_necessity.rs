use crate::entity::ColumnMapping;
use crate::error::DbError;
use crate::executor::Execute;
use crate::identifier::Identifier;
use crate::model::GameNecessity;
use crate::query_builder::{prepare_delete, prepare_insert};
use crate::results::{FromRowResult, RowResult, decode_rows};
use crate::statement::Statement;

pub const NECESSITY_COLUMNS: ColumnMapping =
    ColumnMapping::new(&[("game", "game"), ("necessity", "necessity")]);

impl FromRowResult for GameNecessity {
    fn from_row(row: &mut RowResult) -> Result<Self, DbError> {
        let mut link = GameNecessity::default();
        let _ = row.get("game", &mut link.game);
        let _ = row.get("necessity", &mut link.necessity);
        row.ensure_parsed("unmarshal game necessity")?;
        Ok(link)
    }
}

/// # Errors
/// [`DbError::CreateStatement`] when neither side of the link is set, otherwise execution
/// errors.
pub async fn insert_necessity<E: Execute + ?Sized>(
    target: &mut E,
    link: &GameNecessity,
) -> Result<(), DbError> {
    let stmt = prepare_insert("game_necessity", &NECESSITY_COLUMNS, link)?;
    target.execute(stmt).await?;
    Ok(())
}

/// Every necessity linked to `game`.
///
/// # Errors
/// Execution errors, or [`DbError::ParseResult`] for a row that does not decode.
pub async fn necessities_for_game<E: Execute + ?Sized>(
    target: &mut E,
    game: Identifier,
) -> Result<Vec<GameNecessity>, DbError> {
    let mut stmt = Statement::prepare("select game, necessity from game_necessity where game = :game:");
    stmt.bind("game", game);
    let rows = target.execute(stmt).await?;
    decode_rows(rows)
}

/// # Errors
/// Execution errors.
pub async fn delete_necessity<E: Execute + ?Sized>(
    target: &mut E,
    link: &GameNecessity,
) -> Result<(), DbError> {
    let stmt = prepare_delete("game_necessity", &NECESSITY_COLUMNS, link)?;
    target.execute(stmt).await?;
    Ok(())
}
