//! Bitmask configuration: which record fields to populate and which sinks
//! to dispatch to.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

macro_rules! bitmask {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            $($(#[$fmeta:meta])* $flag:ident = $value:expr, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($repr);

        impl $name {
            $($(#[$fmeta])* pub const $flag: $name = $name($value);)+

            const NAMED: &'static [($name, &'static str)] = &[$(($name::$flag, $label)),+];

            #[inline]
            pub const fn empty() -> Self {
                $name(0)
            }

            #[inline]
            pub const fn from_bits(bits: $repr) -> Self {
                $name(bits)
            }

            #[inline]
            pub const fn bits(self) -> $repr {
                self.0
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Every bit of `other` is set
            #[inline]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// At least one bit of `other` is set
            #[inline]
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            #[inline]
            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            #[inline]
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            #[must_use]
            pub const fn with(self, other: Self) -> Self {
                $name(self.0 | other.0)
            }

            #[must_use]
            pub const fn without(self, other: Self) -> Self {
                $name(self.0 & !other.0)
            }

            /// Parse a comma-separated, case-insensitive list of names.
            ///
            /// Returns the union of the recognised names along with every
            /// name that was not recognised.
            pub fn parse_list(list: &str) -> (Self, Vec<String>) {
                let mut mask = Self::empty();
                let mut unknown = Vec::new();
                for raw in list.split(',') {
                    let name = raw.trim();
                    if name.is_empty() {
                        continue;
                    }
                    match Self::NAMED
                        .iter()
                        .find(|(_, label)| label.eq_ignore_ascii_case(name))
                    {
                        Some((flag, _)) => mask.insert(*flag),
                        None => unknown.push(name.to_string()),
                    }
                }
                (mask, unknown)
            }

            /// Names of the single-bit flags that are set
            pub fn names(self) -> Vec<&'static str> {
                Self::NAMED
                    .iter()
                    .filter(|(flag, _)| flag.0.count_ones() == 1 && self.contains(*flag))
                    .map(|(_, label)| *label)
                    .collect()
            }
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                $name(self.0 & rhs.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.names().join(" | "))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.names().join(","))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let list = String::deserialize(deserializer)?;
                let (mask, unknown) = Self::parse_list(&list);
                if unknown.is_empty() {
                    Ok(mask)
                } else {
                    Err(serde::de::Error::custom(format!(
                        "unknown {} name(s): {}",
                        stringify!($name),
                        unknown.join(", ")
                    )))
                }
            }
        }
    };
}

bitmask! {
    /// Which optional fields a record carries and how the console renders it
    ///
    /// # Example
    ///
    /// ```
    /// use sink_logger::FieldFlags;
    ///
    /// let (flags, unknown) = FieldFlags::parse_list("timestamp, line, bogus");
    /// assert!(flags.contains(FieldFlags::TIMESTAMP | FieldFlags::LINE));
    /// assert_eq!(unknown, vec!["bogus".to_string()]);
    /// ```
    FieldFlags(u32) {
        TIMESTAMP = 1, "TIMESTAMP";
        /// Full path of the calling file
        LONG_FILE = 1 << 1, "LONGFILE";
        /// Basename of the calling file
        SHORT_FILE = 1 << 2, "SHORTFILE";
        /// Calling file relative to the working directory
        RELATIVE_FILE = 1 << 3, "RELATIVEFILE";
        FUNCTION = 1 << 4, "FUNCTION";
        LINE = 1 << 5, "LINE";
        /// Level name in CSV output
        PREFIX = 1 << 6, "PREFIX";
        CONSOLE_AS_JSON = 1 << 7, "CONSOLE_AS_JSON";
        COLOR = 1 << 8, "CONSOLE_COLOR";
        CONTEXT = 1 << 9, "CONTEXT";
        /// Dump the context on the console after the line
        DUMP = 1 << 10, "DUMP";
        ID = 1 << 11, "ID";
        /// Every flag except colour
        ALL = 0b1110_1111_1111, "ALL";
    }
}

bitmask! {
    /// Sinks a record is dispatched to
    OutputMask(u8) {
        CONSOLE = 1, "CONSOLE";
        FILE = 1 << 1, "FILE";
        DATABASE = 1 << 2, "DATABASE";
        REMOTE = 1 << 3, "REMOTE";
        ALL = 0b1111, "ALL";
    }
}

/// How a record's `file` field is derived from the call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStyle {
    Long,
    Short,
    Relative,
}

impl FieldFlags {
    /// Active file style; SHORT beats RELATIVE beats LONG
    pub fn file_style(self) -> Option<FileStyle> {
        if self.contains(FieldFlags::SHORT_FILE) {
            Some(FileStyle::Short)
        } else if self.contains(FieldFlags::RELATIVE_FILE) {
            Some(FileStyle::Relative)
        } else if self.contains(FieldFlags::LONG_FILE) {
            Some(FileStyle::Long)
        } else {
            None
        }
    }

    /// Any flag that puts a location on the record
    pub fn wants_location(self) -> bool {
        self.intersects(
            FieldFlags::LONG_FILE
                | FieldFlags::SHORT_FILE
                | FieldFlags::RELATIVE_FILE
                | FieldFlags::LINE,
        )
    }
}
