//! Table manager for spawning and managing multiple table actors.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;

use super::{
    actor::{TableActor, TableHandle},
    config::{BotDifficulty, TableConfig},
    messages::{TableId, TableMetadata, TableResponse},
};
use crate::game::{
    Command, TableError,
    entities::{DisplayName, PlayerId, TableSnapshot},
};

/// Registry of live tables keyed by [`TableId`]
pub struct TableManager {
    /// Active table handles
    tables: Arc<RwLock<HashMap<TableId, TableHandle>>>,

    /// Next table ID
    next_table_id: Arc<RwLock<TableId>>,

    /// Configuration for tables created by a join to an unknown id
    default_config: TableConfig,

    tick_interval: Duration,
}

impl TableManager {
    /// Create a new table manager
    ///
    /// # Returns
    ///
    /// * `Result<Self, String>` - Manager or validation error of `default_config`
    pub fn new(default_config: TableConfig) -> Result<Self, String> {
        default_config.validate()?;

        Ok(Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            next_table_id: Arc::new(RwLock::new(1)),
            default_config,
            tick_interval: Duration::from_secs(1),
        })
    }

    /// Tick interval for every table spawned afterwards.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    fn spawn_table(&self, table_id: TableId, config: TableConfig) -> TableHandle {
        let name = config.name.clone();
        let (actor, handle) = TableActor::new(table_id, config);
        let actor = actor.with_tick_interval(self.tick_interval);
        tokio::spawn(actor.run());
        log::info!("Spawned table {} '{}'", table_id, name);
        handle
    }

    /// Create and spawn a new table
    ///
    /// # Returns
    ///
    /// * `Result<TableId, String>` - Table ID or validation error
    pub async fn create_table(&self, config: TableConfig) -> Result<TableId, String> {
        config.validate()?;

        let mut next_id = self.next_table_id.write().await;
        let mut tables = self.tables.write().await;
        while tables.contains_key(&*next_id) {
            *next_id += 1;
        }
        let table_id = *next_id;
        *next_id += 1;
        drop(next_id);

        let handle = self.spawn_table(table_id, config);
        tables.insert(table_id, handle);

        Ok(table_id)
    }

    /// Get the handle of a table, spawning one with the default
    /// configuration if the id is unknown.
    async fn get_or_create(&self, table_id: TableId) -> Result<TableHandle, TableError> {
        if let Some(handle) = self.get_table(table_id).await {
            return Ok(handle);
        }

        let mut tables = self.tables.write().await;
        if let Some(handle) = tables.get(&table_id) {
            return Ok(handle.clone());
        }
        let config = TableConfig {
            name: format!("Table {table_id}"),
            ..self.default_config.clone()
        };
        config.validate().map_err(TableError::InvalidConfig)?;
        let handle = self.spawn_table(table_id, config);
        tables.insert(table_id, handle.clone());
        Ok(handle)
    }

    /// Get table handle
    pub async fn get_table(&self, table_id: TableId) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(&table_id).cloned()
    }

    /// List all active tables, ordered by id
    pub async fn list_tables(&self) -> Vec<TableMetadata> {
        let handles: Vec<TableHandle> = self.tables.read().await.values().cloned().collect();

        let mut metadata_list = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.metadata().await {
                Ok(metadata) => metadata_list.push(metadata),
                Err(_) => log::warn!("Table {} stopped responding", handle.table_id()),
            }
        }
        metadata_list.sort_by_key(|metadata| metadata.id);
        metadata_list
    }

    /// Close a table
    pub async fn close_table(&self, table_id: TableId) -> Result<(), String> {
        let handle = self
            .tables
            .write()
            .await
            .remove(&table_id)
            .ok_or_else(|| "Table not found".to_string())?;

        if let Err(e) = handle.close().await {
            log::debug!("Table {} was already stopped: {}", table_id, e);
        }

        log::info!("Closed table {}", table_id);

        Ok(())
    }

    /// Join a table, creating it if the id is unknown
    pub async fn join_table(
        &self,
        table_id: TableId,
        player_id: PlayerId,
        name: DisplayName,
        as_spectator: bool,
    ) -> TableResponse {
        let handle = self.get_or_create(table_id).await?;
        handle
            .command(Command::Join {
                player_id,
                name,
                as_spectator,
            })
            .await
    }

    /// Seat a bot at an existing table
    pub async fn add_bot(
        &self,
        table_id: TableId,
        player_id: PlayerId,
        name: DisplayName,
        difficulty: Option<BotDifficulty>,
    ) -> TableResponse {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or(TableError::TableNotFound)?;
        handle.add_bot(player_id, name, difficulty).await
    }

    /// Forward a command to a table. A table left empty with no hand in
    /// progress is destroyed.
    pub async fn send_command(&self, table_id: TableId, command: Command) -> TableResponse {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or(TableError::TableNotFound)?;

        let is_leave = matches!(command, Command::Leave(_));
        let snapshot = handle.command(command).await?;

        if is_leave && snapshot.is_abandoned() {
            log::info!("Table {} is empty", table_id);
            if let Err(e) = self.close_table(table_id).await {
                log::debug!("Table {}: {}", table_id, e);
            }
        }

        Ok(snapshot)
    }

    /// Get table state as seen by `viewer`
    pub async fn get_table_state(
        &self,
        table_id: TableId,
        viewer: Option<PlayerId>,
    ) -> Result<TableSnapshot, TableError> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or(TableError::TableNotFound)?;
        handle.snapshot(viewer).await
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn name(s: &str) -> DisplayName {
        DisplayName::new(s)
    }

    #[tokio::test]
    async fn test_create_table_assigns_ids() {
        let manager = TableManager::new(TableConfig::default()).unwrap();
        let first = manager.create_table(TableConfig::default()).await.unwrap();
        let second = manager.create_table(TableConfig::casual()).await.unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(manager.active_table_count().await, 2);
    }

    #[tokio::test]
    async fn test_create_table_rejects_invalid_config() {
        let manager = TableManager::new(TableConfig::default()).unwrap();
        let config = TableConfig {
            small_blind: 0,
            ..TableConfig::default()
        };
        assert!(manager.create_table(config).await.is_err());
        assert_eq!(manager.active_table_count().await, 0);
    }

    #[tokio::test]
    async fn test_join_unknown_table_creates_it() {
        let manager = TableManager::new(TableConfig::casual()).unwrap();
        let snapshot = manager
            .join_table(7, id("alice"), name("alice"), false)
            .await
            .unwrap();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].chips, 1_000);

        let created = manager.create_table(TableConfig::default()).await.unwrap();
        assert_ne!(created, 7);
    }

    #[tokio::test]
    async fn test_unknown_table_command() {
        let manager = TableManager::new(TableConfig::default()).unwrap();
        assert_eq!(
            manager.send_command(3, Command::StartHand).await,
            Err(TableError::TableNotFound)
        );
    }

    #[tokio::test]
    async fn test_last_leave_destroys_table() {
        let manager = TableManager::new(TableConfig::default()).unwrap();
        manager
            .join_table(1, id("alice"), name("alice"), false)
            .await
            .unwrap();
        manager
            .join_table(1, id("bob"), name("bob"), true)
            .await
            .unwrap();

        manager.send_command(1, Command::Leave(id("alice"))).await.unwrap();
        assert_eq!(manager.active_table_count().await, 1);

        manager.send_command(1, Command::Leave(id("bob"))).await.unwrap();
        assert_eq!(manager.active_table_count().await, 0);
    }

    #[tokio::test]
    async fn test_list_tables() {
        let manager = TableManager::new(TableConfig::default()).unwrap();
        let table_id = manager.create_table(TableConfig::casual()).await.unwrap();
        manager
            .join_table(table_id, id("alice"), name("alice"), false)
            .await
            .unwrap();

        let tables = manager.list_tables().await;
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, table_id);
        assert_eq!(tables[0].player_count, 1);
        assert_eq!(tables[0].big_blind, 20);
    }

    #[tokio::test]
    async fn test_close_table() {
        let manager = TableManager::new(TableConfig::default()).unwrap();
        let table_id = manager.create_table(TableConfig::default()).await.unwrap();
        let handle = manager.get_table(table_id).await.unwrap();
        manager.close_table(table_id).await.unwrap();
        assert!(manager.get_table(table_id).await.is_none());
        assert!(manager.close_table(table_id).await.is_err());
        assert_eq!(handle.snapshot(None).await, Err(TableError::TableNotFound));
    }

    #[test]
    fn test_new_rejects_invalid_default_config() {
        let zero_blinds = TableConfig {
            small_blind: 0,
            big_blind: 0,
            ..TableConfig::default()
        };
        assert!(TableManager::new(zero_blinds).is_err());

        let too_many_seats = TableConfig {
            max_players: 27,
            max_users: 30,
            ..TableConfig::default()
        };
        assert!(TableManager::new(too_many_seats).is_err());
    }

    #[tokio::test]
    async fn test_join_never_spawns_invalid_table() {
        let mut manager = TableManager::new(TableConfig::default()).unwrap();
        manager.default_config.big_blind = 0;
        assert!(matches!(
            manager.join_table(5, id("alice"), name("alice"), false).await,
            Err(TableError::InvalidConfig(_))
        ));
        assert_eq!(manager.active_table_count().await, 0);
    }
}
