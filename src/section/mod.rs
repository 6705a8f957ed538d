//! The document tree and path navigation.

pub mod coerce;
mod path;

pub use path::{KeyPath, ToKeyPath, DEFAULT_SEPARATOR};
pub use toml::{Table, Value};

/// One node of a document tree.
///
/// Wraps an ordered mapping and addresses nested values by separator-delimited
/// paths. Reads through absent intermediates report "not found"; writes create
/// them.
///
/// ```
/// use dragon_bind::Section;
///
/// let mut section = Section::new();
/// section.set("server.port", 8080);
/// assert_eq!(section.get_i64("server.port"), Some(8080));
/// assert_eq!(section.get_i64("server..port"), Some(8080));
/// assert!(section.get("client.port").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    table: Table,
    separator: String,
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

impl Section {
    pub fn new() -> Self {
        Self::from_table(Table::new())
    }

    pub fn from_table(table: Table) -> Self {
        Self {
            table,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Sets the separator used to parse string paths.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Keys of this node, in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Parses `path` with this section's separator.
    pub fn path(&self, path: impl ToKeyPath) -> KeyPath {
        path.to_key_path(&self.separator)
    }

    fn table_at(&self, segments: &[String]) -> Option<&Table> {
        let mut current = &self.table;
        for segment in segments {
            current = current.get(segment)?.as_table()?;
        }
        Some(current)
    }

    fn table_at_mut(&mut self, segments: &[String]) -> &mut Table {
        let mut current = &mut self.table;
        for segment in segments {
            let slot = current
                .entry(segment.clone())
                .or_insert(Value::Table(Table::new()));
            if !slot.is_table() {
                *slot = Value::Table(Table::new());
            }
            current = match slot {
                Value::Table(table) => table,
                _ => unreachable!("slot was replaced by a table above"),
            };
        }
        current
    }

    /// Returns the value at `path`. The empty path has no value.
    pub fn get(&self, path: impl ToKeyPath) -> Option<&Value> {
        let path = self.path(path);
        let (parents, last) = path.split_last()?;
        self.table_at(parents)?.get(last)
    }

    pub fn get_mut(&mut self, path: impl ToKeyPath) -> Option<&mut Value> {
        let path = self.path(path);
        let (parents, last) = path.split_last()?;
        let mut current = &mut self.table;
        for segment in parents {
            current = current.get_mut(segment)?.as_table_mut()?;
        }
        current.get_mut(last)
    }

    pub fn contains(&self, path: impl ToKeyPath) -> bool {
        self.get(path).is_some()
    }

    /// Stores `value` at `path`, creating intermediate tables.
    ///
    /// Intermediates holding a non-table value are replaced. Setting a table
    /// at the empty path replaces the whole section; other values at the
    /// empty path are ignored.
    pub fn set(&mut self, path: impl ToKeyPath, value: impl Into<Value>) {
        let path = self.path(path);
        let value = value.into();
        match path.split_last() {
            Some((parents, last)) => {
                self.table_at_mut(parents).insert(last.to_string(), value);
            }
            None => {
                if let Value::Table(table) = value {
                    self.table = table;
                }
            }
        }
    }

    pub fn remove(&mut self, path: impl ToKeyPath) -> Option<Value> {
        let path = self.path(path);
        let (parents, last) = path.split_last()?;
        let mut current = &mut self.table;
        for segment in parents {
            current = current.get_mut(segment)?.as_table_mut()?;
        }
        current.remove(last)
    }

    /// Returns the table at `path`, or `None` if it is absent or not a table.
    pub fn table(&self, path: impl ToKeyPath) -> Option<&Table> {
        let path = self.path(path);
        self.table_at(path.segments())
    }

    /// Returns the table at `path`, creating it (and any intermediates) if absent.
    pub fn table_mut(&mut self, path: impl ToKeyPath) -> &mut Table {
        let path = self.path(path);
        self.table_at_mut(path.segments())
    }

    /// Returns a detached copy of the nested section at `path`.
    pub fn section(&self, path: impl ToKeyPath) -> Option<Section> {
        self.table(path).map(|table| Section {
            table: table.clone(),
            separator: self.separator.clone(),
        })
    }

    /// Replaces the nested section at `path` with `section`'s contents.
    pub fn set_section(&mut self, path: impl ToKeyPath, section: Section) {
        self.set(path, Value::Table(section.table));
    }

    pub fn get_str(&self, path: impl ToKeyPath) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_bool(&self, path: impl ToKeyPath) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Returns the value at `path` coerced to `i64`, or `None` if absent.
    ///
    /// Present but unparseable values coerce to zero.
    pub fn get_i64(&self, path: impl ToKeyPath) -> Option<i64> {
        self.get(path).map(coerce::to_i64)
    }

    pub fn get_i32(&self, path: impl ToKeyPath) -> Option<i32> {
        self.get(path).map(coerce::to_i32)
    }

    pub fn get_f64(&self, path: impl ToKeyPath) -> Option<f64> {
        self.get(path).map(coerce::to_f64)
    }

    pub fn get_array(&self, path: impl ToKeyPath) -> Option<&Vec<Value>> {
        self.get(path)?.as_array()
    }
}

impl From<Table> for Section {
    fn from(table: Table) -> Self {
        Self::from_table(table)
    }
}
