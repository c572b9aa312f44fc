//! Association placeholders
//!
//! Reading an association never performs I/O. A placeholder is either
//! initialised by a loader or reports `NotLoaded` when read, so every round
//! trip is visible at the call site that requested it.

use crate::error::{ModelError, ModelResult};

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A to-one association: the foreign key is always known, the target may not be
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<T> {
    Unloaded { id: i64 },
    Loaded { id: i64, value: T },
}

impl<T> Reference<T> {
    pub fn unloaded(id: i64) -> Self {
        Reference::Unloaded { id }
    }

    pub fn loaded(id: i64, value: T) -> Self {
        Reference::Loaded { id, value }
    }

    /// The referenced identity
    pub fn id(&self) -> i64 {
        match self {
            Reference::Unloaded { id } | Reference::Loaded { id, .. } => *id,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Reference::Loaded { .. })
    }

    pub fn get(&self) -> ModelResult<&T> {
        match self {
            Reference::Loaded { value, .. } => Ok(value),
            Reference::Unloaded { id } => Err(ModelError::NotLoaded(format!(
                "{} #{}",
                short_type_name::<T>(),
                id
            ))),
        }
    }

    pub fn get_mut(&mut self) -> ModelResult<&mut T> {
        match self {
            Reference::Loaded { value, .. } => Ok(value),
            Reference::Unloaded { id } => Err(ModelError::NotLoaded(format!(
                "{} #{}",
                short_type_name::<T>(),
                id
            ))),
        }
    }

    /// Attach the loaded target, keeping the known identity
    pub fn resolve(&mut self, value: T) {
        *self = Reference::Loaded { id: self.id(), value };
    }
}

/// A to-many association
#[derive(Debug, Clone, PartialEq)]
pub enum Collection<T> {
    Unloaded,
    Loaded(Vec<T>),
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection::Unloaded
    }
}

impl<T> Collection<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Collection::Loaded(_))
    }

    pub fn get(&self) -> ModelResult<&[T]> {
        match self {
            Collection::Loaded(items) => Ok(items),
            Collection::Unloaded => Err(ModelError::NotLoaded(format!(
                "collection of {}",
                short_type_name::<T>()
            ))),
        }
    }

    pub fn get_mut(&mut self) -> ModelResult<&mut Vec<T>> {
        match self {
            Collection::Loaded(items) => Ok(items),
            Collection::Unloaded => Err(ModelError::NotLoaded(format!(
                "collection of {}",
                short_type_name::<T>()
            ))),
        }
    }

    pub fn initialize(&mut self, items: Vec<T>) {
        *self = Collection::Loaded(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget;

    #[test]
    fn test_reference_reports_not_loaded() {
        let mut reference: Reference<Widget> = Reference::unloaded(3);
        let err = reference.get().unwrap_err();
        assert_eq!(err.to_string(), "Association not loaded: Widget #3");

        reference.resolve(Widget);
        assert!(reference.is_loaded());
        assert_eq!(reference.id(), 3);
        assert_eq!(reference.get().unwrap(), &Widget);
    }

    #[test]
    fn test_collection_initialisation() {
        let mut items: Collection<Widget> = Collection::default();
        assert!(matches!(items.get(), Err(ModelError::NotLoaded(_))));
        items.initialize(vec![Widget, Widget]);
        assert_eq!(items.get().unwrap().len(), 2);
    }
}
