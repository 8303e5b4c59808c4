//! Common repository traits
//!
//! This module defines generic interfaces for database operations.

/// Trait for creating new entities in the database
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with ID assigned by the database)
/// * `CreateDTO` - DTO for creation (without ID, will be automatically generated)
pub trait Create<Entity, CreateDTO> {
    /// Creates a new entity in the database
    ///
    /// # Returns
    /// * `Ok(Entity)` - Created entity with ID assigned by the database
    /// * `Err(sqlx::Error)` - Error during insertion (constraint violations included)
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for reading a single entity by primary key
///
/// # Type Parameters
/// * `Entity` - Type of the entity to read
/// * `Id` - Type of the primary key
pub trait Read<Entity, Id> {
    /// Reads an entity from the database by its primary key
    ///
    /// # Returns
    /// * `Ok(Some(Entity))` - Entity found
    /// * `Ok(None)` - No entity with that ID
    /// * `Err(sqlx::Error)` - Error during reading
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Trait for updating existing entities
///
/// # Type Parameters
/// * `Entity` - Type of the updated entity
/// * `UpdateDTO` - DTO for updating (optional fields for partial updates)
/// * `Id` - Type of the primary key
pub trait Update<Entity, UpdateDTO, Id> {
    /// Updates an existing entity in the database
    ///
    /// Only `Some(_)` fields of `data` are modified.
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for deleting entities
pub trait Delete<Id> {
    /// Deletes an entity from the database. Owned rows go with it (`ON DELETE CASCADE`).
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
