//! [`Describable`] for standard, crossbeam and crate types

use super::{short_type_name, Describable, Dumper};
use crate::core::fields::{Field, FieldValue, Fields};
use crate::core::log_level::LogLevel;
use crate::core::record::LogRecord;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Write;
use std::rc::Rc;
use std::sync::Arc;

macro_rules! describe_scalar {
    ($($ty:ty => $kind:literal),* $(,)?) => {$(
        impl Describable for $ty {
            fn kind(&self) -> Cow<'static, str> {
                Cow::Borrowed($kind)
            }

            fn describe(&self, dumper: &mut Dumper) {
                let _ = write!(dumper, "{}({})", $kind, self);
            }

            fn nil_kind() -> Cow<'static, str> {
                Cow::Borrowed($kind)
            }
        }
    )*};
}

describe_scalar!(
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
    i128 => "int128",
    isize => "int",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    u128 => "uint128",
    usize => "uint",
    bool => "bool",
);

macro_rules! describe_float {
    ($($ty:ty => $kind:literal),*) => {$(
        impl Describable for $ty {
            fn kind(&self) -> Cow<'static, str> {
                Cow::Borrowed($kind)
            }

            fn describe(&self, dumper: &mut Dumper) {
                let _ = write!(dumper, "{}({:.6})", $kind, self);
            }

            fn nil_kind() -> Cow<'static, str> {
                Cow::Borrowed($kind)
            }
        }
    )*};
}

describe_float!(f32 => "float32", f64 => "float64");

pub(super) fn write_string(dumper: &mut Dumper, s: &str) {
    let _ = write!(dumper, "string({}):\"{}\"", s.len(), s);
}

pub(super) fn write_char(dumper: &mut Dumper, c: char) {
    let _ = write!(dumper, "rune({})'{}'", c as u32, c);
}

impl Describable for char {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("rune")
    }

    fn describe(&self, dumper: &mut Dumper) {
        write_char(dumper, *self);
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("rune")
    }
}

impl Describable for str {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("string")
    }

    fn describe(&self, dumper: &mut Dumper) {
        write_string(dumper, self);
    }
}

impl Describable for &str {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("string")
    }

    fn describe(&self, dumper: &mut Dumper) {
        write_string(dumper, self);
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("string")
    }
}

impl Describable for String {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("string")
    }

    fn describe(&self, dumper: &mut Dumper) {
        write_string(dumper, self);
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("string")
    }
}

impl Describable for () {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("unit")
    }

    fn describe(&self, dumper: &mut Dumper) {
        dumper.write_str("unit()");
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("unit")
    }
}

macro_rules! describe_tuple {
    ($len:literal; $($name:ident . $idx:tt),+) => {
        impl<$($name: Describable),+> Describable for ($($name,)+) {
            fn kind(&self) -> Cow<'static, str> {
                Cow::Borrowed("tuple")
            }

            fn describe(&self, dumper: &mut Dumper) {
                let items: [&dyn Describable; $len] = [$(&self.$idx),+];
                dumper.seq(concat!("tuple(", $len, ")"), items);
            }

            fn nil_kind() -> Cow<'static, str> {
                Cow::Borrowed("tuple")
            }
        }
    };
}

describe_tuple!(1; A.0);
describe_tuple!(2; A.0, B.1);
describe_tuple!(3; A.0, B.1, C.2);
describe_tuple!(4; A.0, B.1, C.2, D.3);

impl<T: Describable> Describable for [T] {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("slice")
    }

    fn describe(&self, dumper: &mut Dumper) {
        dumper.seq(
            &format!("slice({})", self.len()),
            self.iter().map(|v| v as &dyn Describable),
        );
    }
}

impl<T: Describable, const N: usize> Describable for [T; N] {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("array")
    }

    fn describe(&self, dumper: &mut Dumper) {
        dumper.seq(
            &format!("array({})", N),
            self.iter().map(|v| v as &dyn Describable),
        );
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("array")
    }
}

macro_rules! describe_sequence {
    ($($ty:ident),*) => {$(
        impl<T: Describable> Describable for $ty<T> {
            fn kind(&self) -> Cow<'static, str> {
                Cow::Borrowed("slice")
            }

            fn describe(&self, dumper: &mut Dumper) {
                dumper.seq(
                    &format!("slice({})", self.len()),
                    self.iter().map(|v| v as &dyn Describable),
                );
            }

            fn nil_kind() -> Cow<'static, str> {
                Cow::Borrowed("slice")
            }

            fn describe_nil(dumper: &mut Dumper) {
                dumper.write_str("slice(nil){}");
            }
        }
    )*};
}

describe_sequence!(Vec, VecDeque);

fn write_map<'v, I>(dumper: &mut Dumper, entries: I, sort: bool)
where
    I: Iterator<Item = (&'v dyn Describable, &'v dyn Describable)>,
{
    let mut rows: Vec<(String, &dyn Describable)> =
        entries.map(|(k, v)| (dumper.render(k), v)).collect();
    if sort {
        rows.sort_by(|a, b| a.0.cmp(&b.0));
    }
    dumper.entries(&format!("map({})", rows.len()), rows);
}

fn write_set<'v, I>(dumper: &mut Dumper, items: I, sort: bool)
where
    I: Iterator<Item = &'v dyn Describable>,
{
    let mut rows: Vec<(String, &dyn Describable)> =
        items.map(|v| (dumper.render(v), v)).collect();
    if sort {
        rows.sort_by(|a, b| a.0.cmp(&b.0));
    }
    dumper.seq(
        &format!("set({})", rows.len()),
        rows.into_iter().map(|(_, v)| v),
    );
}

impl<K: Describable, V: Describable, S> Describable for HashMap<K, V, S> {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("map")
    }

    /// Entries are sorted by rendered key
    fn describe(&self, dumper: &mut Dumper) {
        write_map(
            dumper,
            self.iter()
                .map(|(k, v)| (k as &dyn Describable, v as &dyn Describable)),
            true,
        );
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("map")
    }

    fn describe_nil(dumper: &mut Dumper) {
        dumper.write_str("map(nil){}");
    }
}

impl<K: Describable, V: Describable> Describable for BTreeMap<K, V> {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("map")
    }

    fn describe(&self, dumper: &mut Dumper) {
        write_map(
            dumper,
            self.iter()
                .map(|(k, v)| (k as &dyn Describable, v as &dyn Describable)),
            false,
        );
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("map")
    }

    fn describe_nil(dumper: &mut Dumper) {
        dumper.write_str("map(nil){}");
    }
}

impl<T: Describable, S> Describable for HashSet<T, S> {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("set")
    }

    fn describe(&self, dumper: &mut Dumper) {
        write_set(dumper, self.iter().map(|v| v as &dyn Describable), true);
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("set")
    }
}

impl<T: Describable> Describable for BTreeSet<T> {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("set")
    }

    fn describe(&self, dumper: &mut Dumper) {
        write_set(dumper, self.iter().map(|v| v as &dyn Describable), false);
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("set")
    }
}

impl<T: Describable> Describable for Option<T> {
    fn kind(&self) -> Cow<'static, str> {
        match self {
            Some(v) => v.kind(),
            None => T::nil_kind(),
        }
    }

    fn describe(&self, dumper: &mut Dumper) {
        match self {
            Some(v) => v.describe(dumper),
            None => T::describe_nil(dumper),
        }
    }

    fn nil_kind() -> Cow<'static, str> {
        T::nil_kind()
    }

    fn describe_nil(dumper: &mut Dumper) {
        T::describe_nil(dumper);
    }
}

macro_rules! describe_pointer {
    ($($ptr:ident),*) => {$(
        impl<T: Describable> Describable for $ptr<T> {
            fn kind(&self) -> Cow<'static, str> {
                Cow::Owned(format!("*{}", (**self).kind()))
            }

            fn describe(&self, dumper: &mut Dumper) {
                dumper.write_str("*");
                dumper.value(&**self);
            }

            fn nil_kind() -> Cow<'static, str> {
                Cow::Owned(format!("*{}", T::nil_kind()))
            }
        }
    )*};
}

describe_pointer!(Box, Rc, Arc);

impl<T: Describable> Describable for &T {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Owned(format!("*{}", (**self).kind()))
    }

    fn describe(&self, dumper: &mut Dumper) {
        dumper.write_str("*");
        dumper.value(*self);
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Owned(format!("*{}", T::nil_kind()))
    }
}

impl<T: Describable> Describable for RefCell<T> {
    fn kind(&self) -> Cow<'static, str> {
        T::nil_kind()
    }

    /// A cell that is mutably borrowed elsewhere renders as `borrowed`
    fn describe(&self, dumper: &mut Dumper) {
        match self.try_borrow() {
            Ok(inner) => dumper.value(&*inner),
            Err(_) => dumper.write_str("borrowed"),
        }
    }

    fn nil_kind() -> Cow<'static, str> {
        T::nil_kind()
    }
}

impl<T: Describable> Describable for Receiver<T> {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("chan")
    }

    /// Takes at most one waiting value
    fn describe(&self, dumper: &mut Dumper) {
        let elem = T::nil_kind();
        match self.try_recv() {
            Ok(value) => {
                let _ = write!(dumper, "chan({})[open: ", elem);
                dumper.value(&value);
                dumper.write_str("]");
            }
            Err(TryRecvError::Empty) => {
                let _ = write!(dumper, "chan({})[open: empty]", elem);
            }
            Err(TryRecvError::Disconnected) => {
                let _ = write!(dumper, "chan({})[closed]", elem);
            }
        }
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("chan")
    }

    fn describe_nil(dumper: &mut Dumper) {
        let _ = write!(dumper, "chan({})[nil]", T::nil_kind());
    }
}

impl<T: Describable> Describable for Sender<T> {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("chan<-")
    }

    fn describe(&self, dumper: &mut Dumper) {
        let _ = write!(dumper, "chan<-({})[send-only]", T::nil_kind());
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("chan<-")
    }
}

fn fn_signature(args: &[&str], ret: &str) -> String {
    let args: Vec<String> = args.iter().map(|a| short_type_name(a)).collect();
    let mut signature = format!("func({})", args.join(", "));
    if ret != "()" {
        signature.push_str(" -> ");
        signature.push_str(&short_type_name(ret));
    }
    signature
}

macro_rules! describe_fn {
    ($($arg:ident),*) => {
        impl<R $(, $arg)*> Describable for fn($($arg),*) -> R {
            fn kind(&self) -> Cow<'static, str> {
                Cow::Borrowed("func")
            }

            /// Signature only; the function is never called
            fn describe(&self, dumper: &mut Dumper) {
                let args: &[&str] = &[$(std::any::type_name::<$arg>()),*];
                dumper.write_str(&fn_signature(args, std::any::type_name::<R>()));
            }

            fn nil_kind() -> Cow<'static, str> {
                Cow::Borrowed("func")
            }
        }
    };
}

describe_fn!();
describe_fn!(A);
describe_fn!(A, B);
describe_fn!(A, B, C);

impl Describable for LogLevel {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("level")
    }

    fn describe(&self, dumper: &mut Dumper) {
        let _ = write!(dumper, "level({})", self.to_str());
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("level")
    }
}

impl Describable for FieldValue {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            FieldValue::Null => "any",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int64",
            FieldValue::UInt(_) => "uint64",
            FieldValue::Float(_) => "float64",
            FieldValue::String(_) => "string",
            FieldValue::List(_) => "slice",
            FieldValue::Map(_) => "map",
        })
    }

    fn describe(&self, dumper: &mut Dumper) {
        match self {
            FieldValue::Null => dumper.write_str("any(nil)"),
            FieldValue::Bool(b) => b.describe(dumper),
            FieldValue::Int(i) => i.describe(dumper),
            FieldValue::UInt(u) => u.describe(dumper),
            FieldValue::Float(f) => f.describe(dumper),
            FieldValue::String(s) => write_string(dumper, s),
            FieldValue::List(items) => items.describe(dumper),
            FieldValue::Map(pairs) => dumper.entries(
                &format!("map({})", pairs.len()),
                pairs.iter().map(|(k, v)| (k, v as &dyn Describable)),
            ),
        }
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("any")
    }

    fn describe_nil(dumper: &mut Dumper) {
        dumper.write_str("any(nil)");
    }
}

impl Describable for Field {
    fn describe(&self, dumper: &mut Dumper) {
        dumper
            .structure("Field")
            .field("Key", &self.key)
            .field("Value", &self.value)
            .finish();
    }
}

impl Describable for Fields {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("fields")
    }

    fn describe(&self, dumper: &mut Dumper) {
        dumper.entries(
            &format!("fields({})", self.len()),
            self.iter().map(|f| (&f.key, &f.value as &dyn Describable)),
        );
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("fields")
    }
}

impl Describable for LogRecord {
    fn describe(&self, dumper: &mut Dumper) {
        dumper
            .structure("LogRecord")
            .field("id", &self.id)
            .field("time", &self.time)
            .field("level", &self.level)
            .field("message", &self.message)
            .field("function", &self.function)
            .field("line", &self.line)
            .field("file", &self.file)
            .field("context", &self.context)
            .finish();
    }
}

impl Describable for serde_json::Value {
    fn kind(&self) -> Cow<'static, str> {
        use serde_json::Value;
        Cow::Borrowed(match self {
            Value::Null => "any",
            Value::Bool(_) => "bool",
            Value::Number(n) if n.is_i64() => "int64",
            Value::Number(n) if n.is_u64() => "uint64",
            Value::Number(_) => "float64",
            Value::String(_) => "string",
            Value::Array(_) => "slice",
            Value::Object(_) => "map",
        })
    }

    fn describe(&self, dumper: &mut Dumper) {
        use serde_json::Value;
        match self {
            Value::Null => dumper.write_str("any(nil)"),
            Value::Bool(b) => b.describe(dumper),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.describe(dumper)
                } else if let Some(u) = n.as_u64() {
                    u.describe(dumper)
                } else {
                    n.as_f64().unwrap_or(f64::NAN).describe(dumper)
                }
            }
            Value::String(s) => write_string(dumper, s),
            Value::Array(items) => items.describe(dumper),
            Value::Object(map) => dumper.entries(
                &format!("map({})", map.len()),
                map.iter().map(|(k, v)| (k, v as &dyn Describable)),
            ),
        }
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("any")
    }

    fn describe_nil(dumper: &mut Dumper) {
        dumper.write_str("any(nil)");
    }
}
