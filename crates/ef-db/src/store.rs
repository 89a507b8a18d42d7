use rusqlite::Connection;

use crate::favorite_repo::FavoriteRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn favorites(&self) -> FavoriteRepo<'_> {
        FavoriteRepo::new(&self.conn)
    }
}
