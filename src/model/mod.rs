use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use serde::de::DeserializeOwned;

pub mod action;
pub mod passenger;
pub mod vehicle_info;
pub mod waypoint;

pub type MapType<K, V> = BTreeMap<K, V>;

/// Declares a newtype over [`MapType`] that derefs to the inner map.
#[macro_export]
macro_rules! define_map {
    ($key:ty, $value:ty, $name:ident) => {
        #[derive(Debug, Clone, Default)]
        pub struct $name($crate::model::MapType<$key, $value>);

        impl From<$crate::model::MapType<$key, $value>> for $name {
            fn from(value: $crate::model::MapType<$key, $value>) -> Self {
                Self(value)
            }
        }

        impl FromIterator<($key, $value)> for $name {
            fn from_iter<I: IntoIterator<Item = ($key, $value)>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::model::MapType<$key, $value>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

fn read_json<T>(path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
