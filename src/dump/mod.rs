//! Structural value dumper
//!
//! Renders any [`Describable`] value as a nested, human-readable description
//! of its kind and contents:
//!
//! ```text
//! struct(Config){
//!   name => string(4):"main",
//!   ports => slice(2){
//!     [0] => uint16(80),
//!     [1] => uint16(443),
//!   },
//! }
//! ```
//!
//! Recursion is bounded by [`Dumper::max_depth`]; anything nested deeper is
//! written as `...`, so reference cycles through `Rc`/`Arc` terminate.

mod impls;
mod serialized;

pub use serialized::{DumpError, Serialized};

use std::borrow::Cow;
use std::fmt::{self, Write};

/// Nesting limit used by [`dump`] and [`Dumper::new`]
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Width of the dashed line between values in [`dump_many`]
pub const SEPARATOR_WIDTH: usize = 30;

/// A value that can describe its own structure to a [`Dumper`]
///
/// The trait is object safe; `describe_nil` and `nil_kind` are only
/// available on sized types and back the rendering of absent values such as
/// `Option::None`.
pub trait Describable {
    /// Kind name, e.g. `int32`, `string`, `slice`, `struct`
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("struct")
    }

    fn describe(&self, dumper: &mut Dumper);

    /// Kind name used when there is no value to ask
    fn nil_kind() -> Cow<'static, str>
    where
        Self: Sized,
    {
        Cow::Borrowed("struct")
    }

    /// Rendering of an absent value of this type
    fn describe_nil(dumper: &mut Dumper)
    where
        Self: Sized,
    {
        let _ = write!(dumper, "{}(nil)", Self::nil_kind());
    }
}

/// Accumulates the rendering of one value
#[derive(Debug, Clone)]
pub struct Dumper {
    out: String,
    depth: usize,
    level: usize,
    max_depth: usize,
}

impl Default for Dumper {
    fn default() -> Self {
        Self::new()
    }
}

impl Dumper {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            level: 0,
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Describe a nested value, or write `...` past the depth limit
    pub fn value(&mut self, value: &dyn Describable) {
        if self.depth >= self.max_depth {
            self.out.push_str("...");
            return;
        }
        self.depth += 1;
        value.describe(self);
        self.depth -= 1;
    }

    /// Render `value` on its own, sharing this dumper's depth budget.
    ///
    /// Used for map keys, which are sorted by their rendering.
    pub fn render(&self, value: &dyn Describable) -> String {
        let mut sub = Dumper {
            out: String::new(),
            depth: self.depth,
            level: self.level,
            max_depth: self.max_depth,
        };
        sub.value(value);
        sub.out
    }

    /// `header{ [0] => v, [1] => v, }`
    pub fn seq<'v, I>(&mut self, header: &str, items: I)
    where
        I: IntoIterator<Item = &'v dyn Describable>,
    {
        self.block(header, items.into_iter().enumerate());
    }

    /// `header{ [k] => v, }` with keys written as given
    pub fn entries<'v, K, I>(&mut self, header: &str, entries: I)
    where
        K: fmt::Display,
        I: IntoIterator<Item = (K, &'v dyn Describable)>,
    {
        self.block(header, entries);
    }

    /// Start a `struct(name){ .. }` block
    pub fn structure(&mut self, name: &str) -> StructDumper<'_> {
        let _ = write!(self.out, "struct({}){{", name);
        self.level += 1;
        StructDumper {
            dumper: self,
            has_fields: false,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn block<'v, K, I>(&mut self, header: &str, entries: I)
    where
        K: fmt::Display,
        I: IntoIterator<Item = (K, &'v dyn Describable)>,
    {
        self.out.push_str(header);
        self.out.push('{');
        self.level += 1;
        let mut any = false;
        for (key, value) in entries {
            any = true;
            self.newline();
            let _ = write!(self.out, "[{}] => ", key);
            self.value(value);
            self.out.push(',');
        }
        self.close(any);
    }

    fn close(&mut self, had_entries: bool) {
        self.level -= 1;
        if had_entries {
            self.newline();
        }
        self.out.push('}');
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.level {
            self.out.push_str("  ");
        }
    }
}

impl fmt::Write for Dumper {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

/// Field-by-field rendering of a struct, see [`Dumper::structure`]
#[must_use = "call finish() to close the structure"]
pub struct StructDumper<'d> {
    dumper: &'d mut Dumper,
    has_fields: bool,
}

impl StructDumper<'_> {
    /// `name => value,`
    pub fn field(&mut self, name: &str, value: &dyn Describable) -> &mut Self {
        self.start_field();
        let _ = write!(self.dumper.out, "{} => ", name);
        self.finish_field(value)
    }

    /// `name ((n) tag1, tag2) => value,`
    pub fn tagged_field(
        &mut self,
        name: &str,
        tags: &[&str],
        value: &dyn Describable,
    ) -> &mut Self {
        if tags.is_empty() {
            return self.field(name, value);
        }
        self.start_field();
        let _ = write!(
            self.dumper.out,
            "{} (({}) {}) => ",
            name,
            tags.len(),
            tags.join(", ")
        );
        self.finish_field(value)
    }

    pub fn finish(&mut self) {
        self.dumper.close(self.has_fields);
    }

    fn start_field(&mut self) {
        self.has_fields = true;
        self.dumper.newline();
    }

    fn finish_field(&mut self, value: &dyn Describable) -> &mut Self {
        self.dumper.value(value);
        self.dumper.out.push(',');
        self
    }
}

/// A type-erased slot that may be empty, rendered as `any(kind) => value`
/// or `any(nil)`
#[derive(Clone, Copy)]
pub struct Interface<'a>(pub Option<&'a dyn Describable>);

impl Describable for Interface<'_> {
    fn kind(&self) -> Cow<'static, str> {
        Cow::Borrowed("any")
    }

    fn describe(&self, dumper: &mut Dumper) {
        match self.0 {
            None => dumper.write_str("any(nil)"),
            Some(inner) => {
                let _ = write!(dumper, "any({}) => ", inner.kind());
                dumper.value(inner);
            }
        }
    }

    fn nil_kind() -> Cow<'static, str> {
        Cow::Borrowed("any")
    }
}

/// Render one value
pub fn dump(value: &dyn Describable) -> String {
    let mut dumper = Dumper::new();
    dumper.value(value);
    dumper.finish()
}

/// Render several values separated by a dashed line
pub fn dump_many(values: &[&dyn Describable]) -> String {
    let separator = format!("\n{}\n", "-".repeat(SEPARATOR_WIDTH));
    values
        .iter()
        .map(|v| dump(*v))
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Last path segment of every identifier in a type name:
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    let flush = |segment: &mut String, out: &mut String| {
        let tail = segment.rsplit("::").next().unwrap_or_default();
        out.push_str(tail);
        segment.clear();
    };
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            flush(&mut segment, &mut out);
            out.push(c);
        }
    }
    flush(&mut segment, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Endpoint {
        host: String,
        port: u16,
        secret: String,
    }

    impl Describable for Endpoint {
        fn describe(&self, dumper: &mut Dumper) {
            // secret is private and never rendered
            let _ = &self.secret;
            dumper
                .structure("Endpoint")
                .tagged_field("Host", &["json:\"host\""], &self.host)
                .field("Port", &self.port)
                .finish();
        }
    }

    #[test]
    fn test_struct_renders_listed_fields_only() {
        let endpoint = Endpoint {
            host: "db".to_string(),
            port: 5432,
            secret: "hunter2".to_string(),
        };
        assert_eq!(
            dump(&endpoint),
            "struct(Endpoint){\n  Host ((1) json:\"host\") => string(2):\"db\",\n  Port => uint16(5432),\n}"
        );
    }

    #[test]
    fn test_nested_blocks_are_indented() {
        let value = vec![vec![1u8], vec![]];
        assert_eq!(
            dump(&value),
            "slice(2){\n  [0] => slice(1){\n    [0] => uint8(1),\n  },\n  [1] => slice(0){},\n}"
        );
    }

    #[test]
    fn test_interface() {
        assert_eq!(dump(&Interface(None)), "any(nil)");
        assert_eq!(dump(&Interface(Some(&7i64))), "any(int64) => int64(7)");
    }

    #[test]
    fn test_dump_many_separator() {
        let out = dump_many(&[&1i32, &true]);
        assert_eq!(out, format!("int32(1)\n{}\nbool(true)", "-".repeat(30)));
    }

    struct Node {
        name: &'static str,
        next: Option<Rc<RefCell<Node>>>,
    }

    impl Describable for Node {
        fn describe(&self, dumper: &mut Dumper) {
            dumper
                .structure("Node")
                .field("name", &self.name)
                .field("next", &self.next)
                .finish();
        }
    }

    #[test]
    fn test_depth_limit_terminates_cycles() {
        let a = Rc::new(RefCell::new(Node { name: "a", next: None }));
        let b = Rc::new(RefCell::new(Node {
            name: "b",
            next: Some(Rc::clone(&a)),
        }));
        a.borrow_mut().next = Some(Rc::clone(&b));

        let out = dump(&a);
        assert!(out.starts_with("*struct(Node){"));
        assert!(out.contains("..."));

        let mut shallow = Dumper::with_max_depth(2);
        shallow.value(&a);
        assert_eq!(shallow.finish(), "*...");

        // break the cycle so the nodes are freed
        a.borrow_mut().next = None;
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(
            short_type_name("alloc::vec::Vec<alloc::string::String>"),
            "Vec<String>"
        );
        assert_eq!(short_type_name("(i32, &str)"), "(i32, &str)");
    }
}
