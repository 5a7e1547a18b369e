use crate::entity::ColumnMapping;
use crate::error::DbError;
use crate::executor::{Execute, fetch_one};
use crate::identifier::Identifier;
use crate::model::GameCategory;
use crate::query_builder::{prepare_delete, prepare_insert, prepare_select, prepare_update};
use crate::results::{FromRowResult, RowResult, decode_rows};
use crate::statement::{Statement, create_fields};
use crate::types::RowValues;

pub const CATEGORY_COLUMNS: ColumnMapping = ColumnMapping::new(&[
    ("id", "id"),
    ("name", "name"),
    ("description", "description"),
    ("img", "img"),
    ("order", "\"order\""),
]);

impl FromRowResult for GameCategory {
    fn from_row(row: &mut RowResult) -> Result<Self, DbError> {
        let mut category = GameCategory::default();
        let _ = row.get("id", &mut category.id);
        let _ = row.get("name", &mut category.name);
        let _ = row.get_opt("description", &mut category.description);
        let _ = row.get_opt("img", &mut category.img);
        let _ = row.get("order", &mut category.order);
        row.ensure_parsed("unmarshal category")?;
        Ok(category)
    }
}

/// All categories by display order.
///
/// # Errors
/// Execution errors, or [`DbError::ParseResult`] for the first row that does not decode.
pub async fn categories<E: Execute + ?Sized>(target: &mut E) -> Result<Vec<GameCategory>, DbError> {
    let stmt = Statement::prepare(
        r#"select id, name, description, img, "order"
from game_category
order by "order""#,
    );
    let rows = target.execute(stmt).await?;
    decode_rows(rows)
}

/// The first category matching every present field of `filter`.
///
/// # Errors
/// [`DbError::MissingResult`] when nothing matches, otherwise as [`categories`].
pub async fn get_category<E: Execute + ?Sized>(
    target: &mut E,
    filter: &GameCategory,
) -> Result<GameCategory, DbError> {
    let fields = create_fields(&CATEGORY_COLUMNS);
    let stmt = prepare_select("game_category", &fields, Some("gc"), &CATEGORY_COLUMNS, filter)?;
    let mut row = fetch_one(target, stmt).await?;
    GameCategory::from_row(&mut row)
}

/// # Errors
/// [`DbError::CreateStatement`] when `category` has no fields set, otherwise execution
/// errors.
pub async fn insert_category<E: Execute + ?Sized>(
    target: &mut E,
    category: &GameCategory,
) -> Result<Option<Identifier>, DbError> {
    let mut stmt = prepare_insert("game_category", &CATEGORY_COLUMNS, category)?;
    stmt.append_returning_id();
    let rows = target.execute(stmt).await?;
    super::returned_id(rows)
}

/// # Errors
/// [`DbError::CreateStatement`] when `category` has no fields set, otherwise execution
/// errors.
pub async fn update_category<E, I, K, V>(
    target: &mut E,
    category: &GameCategory,
    selectors: I,
) -> Result<(), DbError>
where
    E: Execute + ?Sized,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RowValues>,
{
    let stmt = prepare_update("game_category", &CATEGORY_COLUMNS, category, selectors)?;
    target.execute(stmt).await?;
    Ok(())
}

/// # Errors
/// Execution errors.
pub async fn delete_category<E: Execute + ?Sized>(
    target: &mut E,
    category: &GameCategory,
) -> Result<(), DbError> {
    let stmt = prepare_delete("game_category", &CATEGORY_COLUMNS, category)?;
    target.execute(stmt).await?;
    Ok(())
}
