//! Primitive type tags.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Set of primitive tags a value may carry.
    ///
    /// The empty set is the void type; the full set is "any".
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Tags: u8 {
        const NONE = 1 << 0;
        const NUMBER = 1 << 1;
        const STRING = 1 << 2;
        const BOOLEAN = 1 << 3;
        const NODE = 1 << 4;
        const KIND = 1 << 5;
    }
}

impl Tags {
    /// Source-level name of a single tag.
    const NAMES: [(Tags, &'static str); 6] = [
        (Tags::NONE, "none"),
        (Tags::NUMBER, "num"),
        (Tags::STRING, "str"),
        (Tags::BOOLEAN, "bool"),
        (Tags::NODE, "node"),
        (Tags::KIND, "kind"),
    ];
}

impl fmt::Display for Tags {
    /// Tag names joined by ` | `, in declaration order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (tag, name) in Self::NAMES {
            if self.contains(tag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
