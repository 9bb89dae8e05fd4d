//! Model records: change tracking and adapter persistence.
//!
//! The model layer is deliberately thin. A [`ModelDef`] maps a model name to
//! its table and primary key, a [`ModelRegistry`] holds those definitions as
//! an explicit injectable object (no process-wide state), and a [`Record`]
//! carries field values with dirty tracking so updates write only what
//! changed. All persistence goes through an [`Adapter`].

use crate::adapter::{Adapter, Dialect, Row};
use crate::error::{OrmError, OrmResult};
use crate::query::Query;
use crate::statement::Statement;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A model's storage mapping.
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Model name, unique within a registry.
    pub name: String,
    /// Backing table.
    pub table: String,
    /// Primary key column.
    pub primary_key: String,
}

impl ModelDef {
    /// Create a model definition.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: primary_key.into(),
        }
    }
}

/// An explicit model-to-table registry, passed where needed instead of
/// living in process-wide state.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelDef>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model definition, replacing any previous one of the same
    /// name.
    pub fn register(&mut self, def: ModelDef) {
        self.models.insert(def.name.clone(), def);
    }

    /// Look up a model by name.
    pub fn get(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// One row of a model, with dirty-field tracking.
#[derive(Debug, Clone)]
pub struct Record {
    def: ModelDef,
    values: BTreeMap<String, Value>,
    dirty: BTreeSet<String>,
    persisted: bool,
}

impl Record {
    /// Create a fresh, unpersisted record.
    pub fn new(def: &ModelDef) -> Self {
        Self {
            def: def.clone(),
            values: BTreeMap::new(),
            dirty: BTreeSet::new(),
            persisted: false,
        }
    }

    /// Create a clean, persisted record from an adapter row.
    pub fn hydrated(def: &ModelDef, row: Row) -> Self {
        Self {
            def: def.clone(),
            values: row,
            dirty: BTreeSet::new(),
            persisted: true,
        }
    }

    /// Set a field, marking it dirty when the value actually changes.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        if self.values.get(&field) != Some(&value) {
            self.dirty.insert(field.clone());
            self.values.insert(field, value);
        }
    }

    /// Read a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// The current primary key value, if set.
    pub fn primary_key(&self) -> Option<&Value> {
        self.values.get(&self.def.primary_key)
    }

    /// True once the record has been inserted or hydrated.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// True when any field changed since the last insert/update.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// The changed field names, sorted.
    pub fn dirty_fields(&self) -> Vec<&str> {
        self.dirty.iter().map(String::as_str).collect()
    }

    /// INSERT every field through the adapter.
    ///
    /// When the primary key is absent or NULL after the insert, it is
    /// backfilled from [`Adapter::last_insert_id`].
    pub fn insert(&mut self, adapter: &mut dyn Adapter) -> OrmResult<()> {
        if self.values.is_empty() {
            return Err(OrmError::invalid_argument(
                "record has no fields to insert",
            ));
        }

        let table = adapter.quote_identifier(&self.def.table);
        let mut stmt = Statement::raw(format!("INSERT INTO {table} ("));
        let columns: Vec<&str> = self.values.keys().map(String::as_str).collect();
        stmt.push(&columns.join(", "));
        stmt.push(") VALUES (");
        for (idx, value) in self.values.values().enumerate() {
            if idx > 0 {
                stmt.push(", ");
            }
            stmt.push_bind(value.clone());
        }
        stmt.push(")");

        debug!(model = self.def.name.as_str(), sql = stmt.text(), "insert");
        adapter.execute(stmt.text(), &stmt.params())?;

        let pk_missing = matches!(
            self.values.get(&self.def.primary_key),
            None | Some(Value::Null)
        );
        if pk_missing {
            if let Some(id) = adapter.last_insert_id() {
                self.values.insert(self.def.primary_key.clone(), id);
            }
        }

        self.persisted = true;
        self.dirty.clear();
        Ok(())
    }

    /// UPDATE the dirty fields through the adapter; a clean record is a
    /// no-op returning 0.
    pub fn update(&mut self, adapter: &mut dyn Adapter) -> OrmResult<u64> {
        if self.dirty.is_empty() {
            return Ok(0);
        }
        let pk = self
            .primary_key()
            .cloned()
            .ok_or_else(|| OrmError::invalid_argument("record has no primary key value"))?;

        let table = adapter.quote_identifier(&self.def.table);
        let mut stmt = Statement::raw(format!("UPDATE {table} SET "));
        for (idx, field) in self.dirty.iter().enumerate() {
            if idx > 0 {
                stmt.push(", ");
            }
            stmt.push(&format!("{field} = "));
            stmt.push_bind(self.values[field].clone());
        }
        stmt.push(&format!(" WHERE {} = ", self.def.primary_key));
        stmt.push_bind(pk);

        debug!(model = self.def.name.as_str(), sql = stmt.text(), "update");
        let result = adapter.execute(stmt.text(), &stmt.params())?;
        self.dirty.clear();
        Ok(result.rows_affected)
    }

    /// Insert when new, update when persisted.
    pub fn save(&mut self, adapter: &mut dyn Adapter) -> OrmResult<()> {
        if self.persisted {
            self.update(adapter)?;
            Ok(())
        } else {
            self.insert(adapter)
        }
    }

    /// DELETE this record by primary key.
    pub fn delete(&mut self, adapter: &mut dyn Adapter) -> OrmResult<u64> {
        let pk = self
            .primary_key()
            .cloned()
            .ok_or_else(|| OrmError::invalid_argument("record has no primary key value"))?;

        let mut query =
            Query::new(self.def.table.as_str()).and_eq(self.def.primary_key.clone(), pk);
        let dialect: &dyn Dialect = &*adapter;
        let stmt = query.get_delete_query(dialect)?;

        debug!(model = self.def.name.as_str(), sql = stmt.text(), "delete");
        let result = adapter.execute(stmt.text(), &stmt.params())?;
        self.persisted = false;
        Ok(result.rows_affected)
    }

    /// Load one record by primary key.
    pub fn find(
        def: &ModelDef,
        adapter: &mut dyn Adapter,
        pk: impl Into<Value>,
    ) -> OrmResult<Option<Record>> {
        let mut query = Query::new(def.table.as_str())
            .and_eq(def.primary_key.clone(), pk)
            .set_limit(1)?;
        let dialect: &dyn Dialect = &*adapter;
        let stmt = query.get_select_query(dialect)?;

        let result = adapter.execute(stmt.text(), &stmt.params())?;
        Ok(result
            .rows
            .into_iter()
            .next()
            .map(|row| Record::hydrated(def, row)))
    }
}
