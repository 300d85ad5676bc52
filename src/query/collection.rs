//! Static descriptors for the collections the query layer can address.
//!
//! A descriptor carries the table name plus the typed field list, which is
//! what lets the translator coerce query-string values to native types and
//! lets the renderer whitelist identifiers instead of interpolating input.

/// Native type of a stored field, used for value coercion and row decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Number,
    Bool,
    Uuid,
    Timestamp,
    TextArray,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldType,
}

/// The internal revision marker, excluded from default projections.
pub const REVISION_FIELD: &str = "revision";

#[derive(Debug, Clone, Copy)]
pub struct Collection {
    pub table: &'static str,
    pub fields: &'static [Field],
    /// Fields never exposed through any projection (e.g. password hashes).
    pub hidden: &'static [&'static str],
}

impl Collection {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(&name)
    }

    /// All exposable fields except the internal revision marker.
    pub fn default_projection(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|f| f.name)
            .filter(|name| *name != REVISION_FIELD && !self.is_hidden(name))
            .collect()
    }
}
