use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardFormat {
    pub label: String,
    pub format: String,
}

impl ClipboardFormat {
    pub fn new(label: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            format: format.into(),
        }
    }
}

/// User-configured clipboard formats.
///
/// The shape is fixed when the settings are parsed: an array of
/// `{label, format}` records becomes `List`, a label-to-format table becomes
/// `Map`. Both keep document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatList {
    List(Vec<ClipboardFormat>),
    Map(Vec<ClipboardFormat>),
}

impl FormatList {
    pub fn entries(&self) -> &[ClipboardFormat] {
        match self {
            FormatList::List(items) | FormatList::Map(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Default for FormatList {
    fn default() -> Self {
        FormatList::List(Vec::new())
    }
}

impl Serialize for FormatList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FormatList::List(items) => items.serialize(serializer),
            FormatList::Map(items) => {
                serializer.collect_map(items.iter().map(|f| (&f.label, &f.format)))
            }
        }
    }
}

impl<'de> Deserialize<'de> for FormatList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FormatListVisitor)
    }
}

struct FormatListVisitor;

impl<'de> Visitor<'de> for FormatListVisitor {
    type Value = FormatList;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of {label, format} records or a label-to-format table")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FormatList, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<ClipboardFormat>()? {
            items.push(item);
        }
        Ok(FormatList::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FormatList, A::Error> {
        let mut items: Vec<ClipboardFormat> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((label, format)) = map.next_entry::<String, String>()? {
            if items.iter().any(|f| f.label == label) {
                return Err(de::Error::custom(format!("duplicate format label: {}", label)));
            }
            items.push(ClipboardFormat { label, format });
        }
        Ok(FormatList::Map(items))
    }
}
