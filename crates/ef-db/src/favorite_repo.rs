use crate::util::{from_rfc3339, to_rfc3339};
use ef_core::error::FavoriteError;
use ef_core::favorites::{FavoriteRepository, UpsertOutcome};
use ef_core::types::{FavoriteEvent, FavoritePayload};
use rusqlite::{Connection, OptionalExtension};

pub struct FavoriteRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> FavoriteRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn find_created_at(&self, id: &str) -> Result<Option<String>, FavoriteError> {
        self.conn
            .query_row(
                "SELECT created_at FROM favorites WHERE event_id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })
    }

    fn find(&self, id: &str) -> Result<Option<FavoriteEvent>, FavoriteError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT event_id, name, date, time, venue, genre, image, url, created_at \
                 FROM favorites WHERE event_id = ?1",
            )
            .map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })?;
        stmt.query_row([id], map_favorite_row)
            .optional()
            .map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })?
            .transpose()
    }
}

impl<'a> FavoriteRepository for FavoriteRepo<'a> {
    fn list(&self) -> Result<Vec<FavoriteEvent>, FavoriteError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT event_id, name, date, time, venue, genre, image, url, created_at \
                 FROM favorites ORDER BY created_at ASC, event_id ASC",
            )
            .map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })?;
        let rows = stmt
            .query_map([], map_favorite_row)
            .map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })?;
        let mut favorites = Vec::new();
        for row in rows {
            let favorite = row.map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })??;
            favorites.push(favorite);
        }
        Ok(favorites)
    }

    fn add(&self, payload: &FavoritePayload) -> Result<UpsertOutcome, FavoriteError> {
        if payload.id.trim().is_empty() {
            return Err(FavoriteError::InvalidInput {
                message: "id must not be empty".to_string(),
            });
        }

        // The probe only decides the `created` flag; the write below is a
        // single atomic upsert and `created_at` is never part of the update.
        let existing = self.find_created_at(&payload.id)?;
        let now = chrono::Utc::now();

        let sql = "INSERT INTO favorites \
                   (event_id, name, date, time, venue, genre, image, url, created_at) \
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                   ON CONFLICT(event_id) DO UPDATE SET \
                   name = excluded.name, date = excluded.date, time = excluded.time, \
                   venue = excluded.venue, genre = excluded.genre, \
                   image = excluded.image, url = excluded.url";
        let params = (
            payload.id.as_str(),
            payload.name.as_str(),
            payload.date.as_str(),
            payload.time.as_str(),
            payload.venue.as_str(),
            payload.genre.as_str(),
            payload.image.as_str(),
            payload.url.as_str(),
            to_rfc3339(&now),
        );
        self.conn
            .execute(sql, params)
            .map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })?;

        let created = existing.is_none();
        let created_at = match existing {
            Some(value) => from_rfc3339(&value).map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })?,
            None => now,
        };

        Ok(UpsertOutcome {
            favorite: FavoriteEvent {
                id: payload.id.clone(),
                name: payload.name.clone(),
                date: payload.date.clone(),
                time: payload.time.clone(),
                venue: payload.venue.clone(),
                genre: payload.genre.clone(),
                image: payload.image.clone(),
                url: payload.url.clone(),
                created_at,
            },
            created,
        })
    }

    fn remove(&self, id: &str) -> Result<FavoriteEvent, FavoriteError> {
        let Some(favorite) = self.find(id)? else {
            return Err(FavoriteError::NotFound);
        };
        self.conn
            .execute("DELETE FROM favorites WHERE event_id = ?1", [id])
            .map_err(|err| FavoriteError::Storage {
                message: err.to_string(),
            })?;
        Ok(favorite)
    }
}

fn map_favorite_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<FavoriteEvent, FavoriteError>> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let date: String = row.get(2)?;
    let time: String = row.get(3)?;
    let venue: String = row.get(4)?;
    let genre: String = row.get(5)?;
    let image: String = row.get(6)?;
    let url: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(match from_rfc3339(&created_at) {
        Ok(created_at) => Ok(FavoriteEvent {
            id,
            name,
            date,
            time,
            venue,
            genre,
            image,
            url,
            created_at,
        }),
        Err(err) => Err(FavoriteError::Storage {
            message: err.to_string(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;

    fn payload(id: &str, name: &str) -> FavoritePayload {
        FavoritePayload {
            id: id.to_string(),
            name: name.to_string(),
            date: "2025-06-01".to_string(),
            time: "19:30:00".to_string(),
            venue: "The Armory".to_string(),
            genre: "Music".to_string(),
            image: "https://img.example/poster.jpg".to_string(),
            url: "https://tickets.example/e/1".to_string(),
        }
    }

    #[test]
    fn first_add_reports_created() {
        let conn = with_test_db().unwrap();
        let repo = FavoriteRepo::new(&conn);

        let outcome = repo.add(&payload("ev1", "First Show")).unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.favorite.id, "ev1");
        assert_eq!(outcome.favorite.name, "First Show");
    }

    #[test]
    fn re_add_overwrites_fields_and_preserves_created_at() {
        let conn = with_test_db().unwrap();
        let repo = FavoriteRepo::new(&conn);

        let first = repo.add(&payload("ev1", "Original Name")).unwrap();
        assert!(first.created);

        let mut updated = payload("ev1", "Renamed Show");
        updated.venue = "New Venue".to_string();
        let second = repo.add(&updated).unwrap();

        assert!(!second.created);
        assert_eq!(second.favorite.name, "Renamed Show");
        assert_eq!(second.favorite.venue, "New Venue");
        assert_eq!(second.favorite.created_at, first.favorite.created_at);
    }

    #[test]
    fn list_orders_by_created_at_ascending() {
        let conn = with_test_db().unwrap();
        let repo = FavoriteRepo::new(&conn);

        let a = repo.add(&payload("a", "A")).unwrap();
        repo.add(&payload("b", "B")).unwrap();
        // Re-adding A must not move it behind B.
        repo.add(&payload("a", "A again")).unwrap();

        let favorites = repo.list().unwrap();
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].id, "a");
        assert_eq!(favorites[0].name, "A again");
        assert_eq!(favorites[0].created_at, a.favorite.created_at);
        assert_eq!(favorites[1].id, "b");
    }

    #[test]
    fn remove_returns_the_deleted_record() {
        let conn = with_test_db().unwrap();
        let repo = FavoriteRepo::new(&conn);

        repo.add(&payload("ev1", "Show")).unwrap();
        let removed = repo.remove("ev1").unwrap();
        assert_eq!(removed.id, "ev1");
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn remove_missing_is_not_found() {
        let conn = with_test_db().unwrap();
        let repo = FavoriteRepo::new(&conn);

        let err = repo.remove("nope").unwrap_err();
        assert!(matches!(err, FavoriteError::NotFound));
    }

    #[test]
    fn empty_id_is_rejected() {
        let conn = with_test_db().unwrap();
        let repo = FavoriteRepo::new(&conn);

        let err = repo.add(&payload("  ", "Show")).unwrap_err();
        assert!(matches!(err, FavoriteError::InvalidInput { .. }));
    }
}
