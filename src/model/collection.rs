//! Collections of view models
//!
//! The engine reconciles collections through this object-safe trait; the
//! blanket implementation for `Vec<T>` is what derived models use for their
//! collection fields.

use std::any::Any;

use crate::model::Mappable;

/// A collection of view models the engine can rebuild or reconcile
pub trait MappableCollection {
    /// Number of items currently in the collection
    fn len(&self) -> usize;

    /// Whether the collection is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all items
    fn clear(&mut self);

    /// Type name of the element type, used to key custom mappings
    fn element_type_name(&self) -> &'static str;

    /// Whether the element type has a field named `name`
    fn has_field(&self, name: &str) -> bool;

    /// Append a default-constructed item and return it for population
    fn push_new(&mut self) -> &mut dyn Mappable;

    /// Mutable access to the item at `index`
    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Mappable>;

    /// Index of the first item whose `field` renders equal to `value`,
    /// compared case-insensitively
    fn find_by(&self, field: &str, value: &str) -> Option<usize>;

    /// Append an owned item of the element type
    ///
    /// Returns `false` when the runtime type does not match.
    fn push_boxed(&mut self, value: Box<dyn Any>) -> bool;
}

impl<T> MappableCollection for Vec<T>
where
    T: Mappable + Default + 'static,
{
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn element_type_name(&self) -> &'static str {
        T::default().type_name()
    }

    fn has_field(&self, name: &str) -> bool {
        T::default().fields().iter().any(|f| f.name == name)
    }

    fn push_new(&mut self) -> &mut dyn Mappable {
        self.push(T::default());
        let index = Vec::len(self) - 1;
        &mut self[index]
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Mappable> {
        self.get_mut(index).map(|item| item as &mut dyn Mappable)
    }

    fn find_by(&self, field: &str, value: &str) -> Option<usize> {
        self.iter().position(|item| {
            item.get_scalar(field)
                .is_some_and(|v| v.to_string().eq_ignore_ascii_case(value))
        })
    }

    fn push_boxed(&mut self, value: Box<dyn Any>) -> bool {
        match value.downcast::<T>() {
            Ok(item) => {
                self.push(*item);
                true
            }
            Err(_) => false,
        }
    }
}
