//! Generic fallback for any `T: Serialize`
//!
//! The value is walked through serde's data model into a small tree, which
//! is then described like any other value. Fields marked `#[serde(skip)]`
//! never reach the serializer and so never appear in the dump.

use super::impls::{write_char, write_string};
use super::{Describable, Dumper};
use serde::ser::{self, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Write};

/// Dump adapter for serialisable values
pub struct Serialized<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Describable for Serialized<'_, T> {
    fn kind(&self) -> Cow<'static, str> {
        match self.0.serialize(NodeSerializer) {
            Ok(node) => node.kind(),
            Err(_) => Cow::Borrowed("invalid"),
        }
    }

    fn describe(&self, dumper: &mut Dumper) {
        match self.0.serialize(NodeSerializer) {
            Ok(node) => node.describe(dumper),
            Err(e) => {
                let _ = write!(dumper, "invalid[{}]", e);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DumpError(String);

impl ser::Error for DumpError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DumpError(msg.to_string())
    }
}

enum Node {
    Nil,
    Unit,
    Bool(bool),
    Int(&'static str, i128),
    UInt(&'static str, u128),
    Float(&'static str, f64),
    Char(char),
    Str(String),
    Seq(&'static str, Vec<Node>),
    Map(Vec<(Node, Node)>),
    Struct(String, Vec<(String, Node)>),
    Variant(String),
}

impl Describable for Node {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Node::Nil => "any",
            Node::Unit => "unit",
            Node::Bool(_) => "bool",
            Node::Int(kind, _) | Node::UInt(kind, _) | Node::Float(kind, _) => *kind,
            Node::Char(_) => "rune",
            Node::Str(_) => "string",
            Node::Seq(kind, _) => *kind,
            Node::Map(_) => "map",
            Node::Struct(..) => "struct",
            Node::Variant(_) => "enum",
        })
    }

    fn describe(&self, dumper: &mut Dumper) {
        match self {
            Node::Nil => dumper.write_str("any(nil)"),
            Node::Unit => dumper.write_str("unit()"),
            Node::Bool(b) => b.describe(dumper),
            Node::Int(kind, n) => {
                let _ = write!(dumper, "{}({})", kind, n);
            }
            Node::UInt(kind, n) => {
                let _ = write!(dumper, "{}({})", kind, n);
            }
            Node::Float(kind, n) => {
                let _ = write!(dumper, "{}({:.6})", kind, n);
            }
            Node::Char(c) => write_char(dumper, *c),
            Node::Str(s) => write_string(dumper, s),
            Node::Seq(kind, items) => dumper.seq(
                &format!("{}({})", kind, items.len()),
                items.iter().map(|n| n as &dyn Describable),
            ),
            Node::Map(entries) => {
                let mut rows: Vec<(String, &dyn Describable)> = entries
                    .iter()
                    .map(|(k, v)| (dumper.render(k), v as &dyn Describable))
                    .collect();
                rows.sort_by(|a, b| a.0.cmp(&b.0));
                dumper.entries(&format!("map({})", rows.len()), rows);
            }
            Node::Struct(name, fields) => {
                let mut s = dumper.structure(name);
                for (field, value) in fields {
                    s.field(field, value);
                }
                s.finish();
            }
            Node::Variant(name) => {
                let _ = write!(dumper, "enum({})", name);
            }
        }
    }
}

struct NodeSerializer;

type NodeResult = Result<Node, DumpError>;

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = DumpError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = StructBuilder;
    type SerializeStructVariant = StructBuilder;

    fn serialize_bool(self, v: bool) -> NodeResult {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> NodeResult {
        Ok(Node::Int("int8", v.into()))
    }

    fn serialize_i16(self, v: i16) -> NodeResult {
        Ok(Node::Int("int16", v.into()))
    }

    fn serialize_i32(self, v: i32) -> NodeResult {
        Ok(Node::Int("int32", v.into()))
    }

    fn serialize_i64(self, v: i64) -> NodeResult {
        Ok(Node::Int("int64", v.into()))
    }

    fn serialize_i128(self, v: i128) -> NodeResult {
        Ok(Node::Int("int128", v))
    }

    fn serialize_u8(self, v: u8) -> NodeResult {
        Ok(Node::UInt("uint8", v.into()))
    }

    fn serialize_u16(self, v: u16) -> NodeResult {
        Ok(Node::UInt("uint16", v.into()))
    }

    fn serialize_u32(self, v: u32) -> NodeResult {
        Ok(Node::UInt("uint32", v.into()))
    }

    fn serialize_u64(self, v: u64) -> NodeResult {
        Ok(Node::UInt("uint64", v.into()))
    }

    fn serialize_u128(self, v: u128) -> NodeResult {
        Ok(Node::UInt("uint128", v))
    }

    fn serialize_f32(self, v: f32) -> NodeResult {
        Ok(Node::Float("float32", v.into()))
    }

    fn serialize_f64(self, v: f64) -> NodeResult {
        Ok(Node::Float("float64", v))
    }

    fn serialize_char(self, v: char) -> NodeResult {
        Ok(Node::Char(v))
    }

    fn serialize_str(self, v: &str) -> NodeResult {
        Ok(Node::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> NodeResult {
        Ok(Node::Seq(
            "slice",
            v.iter().map(|b| Node::UInt("uint8", (*b).into())).collect(),
        ))
    }

    fn serialize_none(self) -> NodeResult {
        Ok(Node::Nil)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> NodeResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> NodeResult {
        Ok(Node::Unit)
    }

    fn serialize_unit_struct(self, name: &'static str) -> NodeResult {
        Ok(Node::Struct(name.to_string(), Vec::new()))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> NodeResult {
        Ok(Node::Variant(format!("{}::{}", name, variant)))
    }

    /// Newtypes are transparent
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> NodeResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> NodeResult {
        Ok(Node::Struct(
            format!("{}::{}", name, variant),
            vec![("0".to_string(), value.serialize(NodeSerializer)?)],
        ))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, DumpError> {
        Ok(SeqBuilder::new(SeqShape::Slice, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, DumpError> {
        Ok(SeqBuilder::new(SeqShape::Tuple, len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, DumpError> {
        Ok(SeqBuilder::new(SeqShape::Struct(name.to_string()), len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, DumpError> {
        Ok(SeqBuilder::new(
            SeqShape::Struct(format!("{}::{}", name, variant)),
            len,
        ))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, DumpError> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<StructBuilder, DumpError> {
        Ok(StructBuilder::new(name.to_string(), len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructBuilder, DumpError> {
        Ok(StructBuilder::new(format!("{}::{}", name, variant), len))
    }
}

enum SeqShape {
    Slice,
    Tuple,
    Struct(String),
}

struct SeqBuilder {
    shape: SeqShape,
    items: Vec<Node>,
}

impl SeqBuilder {
    fn new(shape: SeqShape, len: usize) -> Self {
        Self {
            shape,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), DumpError> {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn build(self) -> NodeResult {
        Ok(match self.shape {
            SeqShape::Slice => Node::Seq("slice", self.items),
            SeqShape::Tuple => Node::Seq("tuple", self.items),
            SeqShape::Struct(name) => Node::Struct(
                name,
                self.items
                    .into_iter()
                    .enumerate()
                    .map(|(i, n)| (i.to_string(), n))
                    .collect(),
            ),
        })
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Node;
    type Error = DumpError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), DumpError> {
        self.push(value)
    }

    fn end(self) -> NodeResult {
        self.build()
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Node;
    type Error = DumpError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), DumpError> {
        self.push(value)
    }

    fn end(self) -> NodeResult {
        self.build()
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Node;
    type Error = DumpError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), DumpError> {
        self.push(value)
    }

    fn end(self) -> NodeResult {
        self.build()
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Node;
    type Error = DumpError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), DumpError> {
        self.push(value)
    }

    fn end(self) -> NodeResult {
        self.build()
    }
}

struct MapBuilder {
    entries: Vec<(Node, Node)>,
    pending_key: Option<Node>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Node;
    type Error = DumpError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), DumpError> {
        self.pending_key = Some(key.serialize(NodeSerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), DumpError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| DumpError("map value without a key".to_string()))?;
        self.entries.push((key, value.serialize(NodeSerializer)?));
        Ok(())
    }

    fn end(self) -> NodeResult {
        Ok(Node::Map(self.entries))
    }
}

struct StructBuilder {
    name: String,
    fields: Vec<(String, Node)>,
}

impl StructBuilder {
    fn new(name: String, len: usize) -> Self {
        Self {
            name,
            fields: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), DumpError> {
        self.fields
            .push((key.to_string(), value.serialize(NodeSerializer)?));
        Ok(())
    }
}

impl ser::SerializeStruct for StructBuilder {
    type Ok = Node;
    type Error = DumpError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), DumpError> {
        self.push(key, value)
    }

    fn end(self) -> NodeResult {
        Ok(Node::Struct(self.name, self.fields))
    }
}

impl ser::SerializeStructVariant for StructBuilder {
    type Ok = Node;
    type Error = DumpError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), DumpError> {
        self.push(key, value)
    }

    fn end(self) -> NodeResult {
        Ok(Node::Struct(self.name, self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::super::dump;
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Account {
        name: String,
        #[serde(skip)]
        #[allow(dead_code)]
        password: String,
        roles: Vec<Role>,
        limits: Option<BTreeMap<String, u32>>,
    }

    #[derive(Serialize)]
    enum Role {
        Admin,
        Guest { expires: u64 },
    }

    #[test]
    fn test_skipped_fields_are_not_rendered() {
        let account = Account {
            name: "ana".to_string(),
            password: "secret".to_string(),
            roles: vec![Role::Admin, Role::Guest { expires: 9 }],
            limits: None,
        };
        let out = dump(&Serialized(&account));
        assert!(!out.contains("password"));
        assert!(!out.contains("secret"));
        assert_eq!(
            out,
            "struct(Account){\n  name => string(3):\"ana\",\n  roles => slice(2){\n    [0] => enum(Role::Admin),\n    [1] => struct(Role::Guest){\n      expires => uint64(9),\n    },\n  },\n  limits => any(nil),\n}"
        );
    }

    #[test]
    fn test_maps_and_scalars() {
        let mut map = BTreeMap::new();
        map.insert("b", 2.5f32);
        map.insert("a", 1.0f32);
        assert_eq!(
            dump(&Serialized(&map)),
            "map(2){\n  [string(1):\"a\"] => float32(1.000000),\n  [string(1):\"b\"] => float32(2.500000),\n}"
        );
        assert_eq!(dump(&Serialized(&Some('x'))), "rune(120)'x'");
        assert_eq!(dump(&Serialized(&(1u8, -1i16))), "tuple(2){\n  [0] => uint8(1),\n  [1] => int16(-1),\n}");
    }
}
