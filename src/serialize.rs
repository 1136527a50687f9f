//! `serde` support, enabled by the `serde` feature. A [`Tree`] is a sequence and a [`Map`] is a
//! map, both in ascending order. Duplicates in the input are handled like [`Tree::insert`] and
//! [`Map::insert`]: the first one wins.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Map, Tree};

impl<T> Serialize for Tree<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<K, V> Serialize for Map<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct TreeVisitor<T> {
    marker: PhantomData<fn() -> Tree<T>>,
}

impl<'de, T> Visitor<'de> for TreeVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = Tree<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut tree = Tree::new();
        while let Some(value) = access.next_element()? {
            tree.insert(value);
        }
        Ok(tree)
    }
}

impl<'de, T> Deserialize<'de> for Tree<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(TreeVisitor {
            marker: PhantomData,
        })
    }
}

struct MapVisitor<K, V> {
    marker: PhantomData<fn() -> Map<K, V>>,
}

impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    type Value = Map<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V> Deserialize<'de> for Map<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_round_trips_as_sorted_sequence() {
        let tree: Tree<_> = [3, 1, 2].into_iter().collect();

        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, "[1,2,3]");

        let back: Tree<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn tree_drops_duplicates() {
        let tree: Tree<i32> = serde_json::from_str("[2,2,1]").unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.to_string(), "[ 1 2 ]");
    }

    #[test]
    fn map_round_trips_in_key_order() {
        let map: Map<_, _> = [("b".to_string(), 2), ("a".to_string(), 1)]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2}"#);

        let back: Map<String, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn map_keeps_first_duplicate() {
        let map: Map<String, i32> = serde_json::from_str(r#"{"a":1,"a":2}"#).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], 1);
    }
}
