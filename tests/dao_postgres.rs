#![cfg(feature = "test-utils")]

use std::collections::HashMap;

use stmt_middleware::dao::{account, game, game_category, game_necessity};
use stmt_middleware::prelude::*;
use stmt_middleware::test_utils::{apply_schema, setup_postgres_embedded, stop_postgres_embedded};

fn translations(pairs: &[(&str, &str)]) -> Translations {
    pairs
        .iter()
        .map(|(lang, text)| ((*lang).to_string(), (*text).to_string()))
        .collect::<HashMap<_, _>>()
}

#[test]
fn dao_crud_against_embedded_postgres() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("dao_crud")?;
    let opts = pg.options.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut pool = connect_with(&opts).await?;
        apply_schema(&pool).await?;

        // accounts
        let missing = account::get_account(
            &mut pool,
            &Account {
                email: Some("nobody@example.com".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(missing, Err(DbError::MissingResult)));

        let new_account = Account {
            name: Some("Marvin".into()),
            email: Some("marvin@example.com".into()),
            password: Some("hash".into()),
            ..Default::default()
        };
        let account_id = account::insert_account(&mut pool, &new_account).await?;
        assert!(account_id.is_some());
        let stored = account::get_account(
            &mut pool,
            &Account {
                email: Some("marvin@example.com".into()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(stored.id, account_id);
        assert_eq!(stored.name.as_deref(), Some("Marvin"));

        // categories
        let cards = GameCategory {
            name: Some(translations(&[("en", "Cards"), ("nl", "Kaarten")])),
            order: Some(2),
            ..Default::default()
        };
        let dice = GameCategory {
            name: Some(translations(&[("en", "Dice")])),
            order: Some(1),
            ..Default::default()
        };
        let cards_id = game_category::insert_category(&mut pool, &cards)
            .await?
            .ok_or(DbError::MissingResult)?;
        game_category::insert_category(&mut pool, &dice).await?;

        let listed = game_category::categories(&mut pool).await?;
        let orders: Vec<_> = listed.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![Some(1), Some(2)]);
        assert_eq!(listed[1].name.as_ref().map(|n| n["nl"].clone()).as_deref(), Some("Kaarten"));

        let by_order = game_category::get_category(
            &mut pool,
            &GameCategory {
                order: Some(2),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_order.id, Some(cards_id));

        // games, inserted inside one transaction
        let mut tx = Transaction::begin(pool.clone());
        for (order, name) in [(1, "Kings"), (2, "Bussen")] {
            let queued = game::insert_game(
                &mut tx,
                &Game {
                    game_category: Some(cards_id),
                    name: Some(translations(&[("en", name)])),
                    player_count: Some(4),
                    order: Some(order),
                    ..Default::default()
                },
            )
            .await?;
            assert!(queued.is_none());
        }
        tx.run().await?;

        let games = game::games_by_category(&mut pool, cards_id).await?;
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].name.as_ref().map(|n| n["en"].clone()).as_deref(), Some("Kings"));
        assert_eq!(games[0].highlight, Some(false));
        assert!(games[0].created_at.is_some());

        let kings_id = games[0].id.ok_or(DbError::MissingResult)?;
        game::update_game(
            &mut pool,
            &Game {
                views: Some(10),
                highlight: Some(true),
                ..Default::default()
            },
            [("id", kings_id)],
        )
        .await?;
        let kings = game::get_game(
            &mut pool,
            &Game {
                id: Some(kings_id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(kings.views, Some(10));
        assert_eq!(kings.highlight, Some(true));

        // necessities
        let necessity = Identifier::new_v4();
        game_necessity::insert_necessity(
            &mut pool,
            &GameNecessity {
                game: Some(kings_id),
                necessity: Some(necessity),
            },
        )
        .await?;
        let links = game_necessity::necessities_for_game(&mut pool, kings_id).await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].necessity, Some(necessity));

        game::delete_game(
            &mut pool,
            &Game {
                id: Some(kings_id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(game::games_by_category(&mut pool, cards_id).await?.len(), 1);
        assert!(game_necessity::necessities_for_game(&mut pool, kings_id).await?.is_empty());

        Ok::<(), DbError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn less_common_column_types_still_materialize() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("row_decoding_extra")?;
    let opts = pg.options.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut pool = connect_with(&opts).await?;
        let stmt = Statement::prepare(
            r#"SELECT 12345.678::numeric AS price, make_date(2022, 7, 20) AS day,
    make_time(8, 44, 3) AS at, make_interval(days => 2) AS span, 42::oid AS oid,
    'a'::"char" AS letter, ARRAY[true, false] AS flags, ARRAY[1.5::float8] AS ratios,
    ARRAY[1::int2, 2::int2] AS smalls"#,
        );

        let mut row = fetch_one(&mut pool, stmt).await?;
        let mut price: Option<f64> = None;
        let mut price_text: Option<String> = None;
        let mut day: Option<chrono::DateTime<chrono::Utc>> = None;
        let mut at: Option<String> = None;
        let mut oid: Option<u32> = None;
        let mut letter: Option<i8> = None;

        row.get("price", &mut price)?;
        row.get("price", &mut price_text)?;
        row.get("day", &mut day)?;
        row.get("at", &mut at)?;
        row.get("oid", &mut oid)?;
        row.get("letter", &mut letter)?;
        row.ensure_parsed("extra types")?;

        assert_eq!(price, Some(12345.678));
        assert_eq!(price_text.as_deref(), Some("12345.678"));
        assert_eq!(day.unwrap().to_rfc3339(), "2022-07-20T00:00:00+00:00");
        assert_eq!(at.as_deref(), Some("08:44:03"));
        assert_eq!(oid, Some(42));
        assert_eq!(letter, Some(97));
        assert!(matches!(row.value("span"), Some(RowValues::Bytes(bytes)) if bytes.len() == 16));
        assert_eq!(
            row.value("flags"),
            Some(&RowValues::List(vec![RowValues::Bool(true), RowValues::Bool(false)]))
        );
        assert_eq!(
            row.value("ratios"),
            Some(&RowValues::List(vec![RowValues::Float(1.5)]))
        );
        assert_eq!(
            row.value("smalls"),
            Some(&RowValues::List(vec![RowValues::Int(1), RowValues::Int(2)]))
        );

        Ok::<(), DbError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn row_decoding_of_native_types() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("row_decoding")?;
    let opts = pg.options.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut pool = connect_with(&opts).await?;
        let id = Identifier::new_v4();
        let mut stmt = Statement::prepare(
            r#"SELECT :id:::uuid AS id,
    2::int2 AS small, 40000::int8 AS big, 1.5::float8 AS ratio, true AS flag,
    NULL::text AS nothing, jsonb_build_object('en', 'Cards') AS name,
    ARRAY['a', 'b'] AS tags, make_timestamptz(2022, 7, 20, 8, 44, 3, 'UTC') AS at"#,
        );
        stmt.bind("id", id);

        let mut row = fetch_one(&mut pool, stmt).await?;
        let mut got_id: Option<Identifier> = None;
        let mut small: Option<u8> = None;
        let mut big: Option<i64> = None;
        let mut ratio: Option<f32> = None;
        let mut flag: Option<bool> = None;
        let mut nothing: Option<String> = None;
        let mut name: Option<HashMap<String, String>> = None;
        let mut tags: Option<Vec<String>> = None;
        let mut at: Option<chrono::DateTime<chrono::Utc>> = None;

        row.get("id", &mut got_id)?;
        row.get("small", &mut small)?;
        row.get("big", &mut big)?;
        row.get("ratio", &mut ratio)?;
        row.get("flag", &mut flag)?;
        row.get_opt("nothing", &mut nothing)?;
        row.get("name", &mut name)?;
        row.get("tags", &mut tags)?;
        row.get("at", &mut at)?;
        row.ensure_parsed("native types")?;

        assert_eq!(got_id, Some(id));
        assert_eq!(small, Some(2));
        assert_eq!(big, Some(40000));
        assert_eq!(ratio, Some(1.5));
        assert_eq!(flag, Some(true));
        assert!(nothing.is_none());
        assert_eq!(name.unwrap()["en"], "Cards");
        assert_eq!(tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(at.unwrap().to_rfc3339(), "2022-07-20T08:44:03+00:00");

        let mut required: Option<String> = None;
        assert!(row.get("nothing", &mut required).is_err());
        assert!(row.has_errors());

        Ok::<(), DbError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}
