//! In-memory stores
//!
//! Same contracts as the PostgreSQL repositories, held in process.
//! Used by `store = "memory"` and by the HTTP tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};
use tokio::sync::RwLock;

use super::{AnimeRepository, DbError, DbResult, UserRepository};
use crate::models::{Anime, User};

#[derive(Debug)]
struct AnimeTable {
    rows: BTreeMap<i32, String>,
    next_id: i32,
}

impl Default for AnimeTable {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl AnimeTable {
    fn upsert(&mut self, anime: Anime) -> DbResult<Anime> {
        match anime.id {
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.rows.insert(id, anime.name.clone());
                Ok(anime.with_id(id))
            }
            Some(id) => match self.rows.get_mut(&id) {
                Some(name) => {
                    name.clone_from(&anime.name);
                    Ok(anime)
                }
                None => Err(DbError::NotFound {
                    resource: "anime",
                    id: id.to_string(),
                }),
            },
        }
    }
}

/// In-memory anime repository with SERIAL-like id assignment
#[derive(Debug, Default)]
pub struct MemoryAnimeRepo {
    table: RwLock<AnimeTable>,
}

impl MemoryAnimeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with the given records (ids assigned in order).
    pub fn with_animes(animes: impl IntoIterator<Item = Anime>) -> Self {
        let mut table = AnimeTable::default();
        for anime in animes {
            // Unsaved records never fail to insert
            let _ = table.upsert(Anime { id: None, ..anime });
        }
        Self {
            table: RwLock::new(table),
        }
    }
}

#[async_trait]
impl AnimeRepository for MemoryAnimeRepo {
    fn find_all(&self) -> BoxStream<'_, DbResult<Anime>> {
        async move {
            let table = self.table.read().await;
            let rows: Vec<DbResult<Anime>> = table
                .rows
                .iter()
                .map(|(id, name)| Ok(Anime::new(name.clone()).with_id(*id)))
                .collect();
            stream::iter(rows)
        }
        .flatten_stream()
        .boxed()
    }

    async fn find_by_id(&self, id: i32) -> DbResult<Option<Anime>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&id)
            .map(|name| Anime::new(name.clone()).with_id(id)))
    }

    async fn save(&self, anime: Anime) -> DbResult<Anime> {
        self.table.write().await.upsert(anime)
    }

    async fn save_all(&self, animes: Vec<Anime>) -> DbResult<Vec<Anime>> {
        let mut table = self.table.write().await;

        // Apply to a scratch copy so a failure leaves the table untouched
        let mut scratch = AnimeTable {
            rows: table.rows.clone(),
            next_id: table.next_id,
        };
        let saved = animes
            .into_iter()
            .map(|anime| scratch.upsert(anime))
            .collect::<DbResult<Vec<_>>>()?;

        *table = scratch;
        Ok(saved)
    }

    async fn delete(&self, id: i32) -> DbResult<()> {
        self.table.write().await.rows.remove(&id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// In-memory user repository keyed by username
#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    users: RwLock<HashMap<String, User>>,
    next_id: RwLock<i32>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded with accounts; later duplicates replace earlier ones.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut map = HashMap::new();
        let mut next_id = 1;
        for user in users {
            let user = User {
                id: Some(next_id),
                ..user
            };
            next_id += 1;
            map.insert(user.username.clone(), user);
        }
        Self {
            users: RwLock::new(map),
            next_id: RwLock::new(next_id),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepo {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, user: User) -> DbResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(DbError::Conflict {
                resource: "user",
                id: user.username,
            });
        }

        let mut next_id = self.next_id.write().await;
        let id = (*next_id).max(1);
        *next_id = id + 1;

        let user = User {
            id: Some(id),
            ..user
        };
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}
