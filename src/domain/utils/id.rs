use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Id<T> {
    pub id: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Id { id: id.into(), _marker: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id_wrapper: Id<T>) -> Self {
        id_wrapper.id
    }
}

impl<T> From<&str> for Id<T> {
    fn from(id: &str) -> Self {
        Id::new(id)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Uri");

        write!(f, "{}: {:?}", display_name, self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ResourceTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ServiceTag;

/// Redfish-style URI of an inventory resource or composed node.
pub type ResourceUri = Id<ResourceTag>;

/// URI of the hardware-management service that owns a resource.
pub type ServiceUri = Id<ServiceTag>;
