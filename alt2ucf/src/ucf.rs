//! Data model for the generated UCF constraints

use fnv::FnvBuildHasher;
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::{Index, IndexMut};

/// The UCF attributes that the converter can produce.
///
/// These are the output-side names of the four pin attributes that Altium
/// stores in its constraint records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UcfAttribute {
    Loc,
    IoStandard,
    Slew,
    Drive,
}

impl UcfAttribute {
    /// the spelling of the attribute in a UCF file
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loc => "LOC",
            Self::IoStandard => "IOSTANDARD",
            Self::Slew => "SLEW",
            Self::Drive => "DRIVE",
        }
    }
}

impl Display for UcfAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `NET` directive: a signal name and its attribute clauses.
///
/// The attribute clauses keep their insertion order, so a directive renders
/// the same way every time it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct UcfDirective {
    pub net: String,
    attributes: Vec<(UcfAttribute, String)>,
}

impl UcfDirective {
    /// create a directive for the signal `net`, without any attributes
    #[must_use]
    pub fn new(net: String) -> Self {
        Self {
            net,
            attributes: Vec::new(),
        }
    }

    /// set an attribute value, replacing any existing value for the same attribute
    pub fn set_attribute(&mut self, attribute: UcfAttribute, value: String) {
        if let Some(entry) = self
            .attributes
            .iter_mut()
            .find(|(existing, _)| *existing == attribute)
        {
            entry.1 = value;
        } else {
            self.attributes.push((attribute, value));
        }
    }

    /// get the value of an attribute, if it is set
    #[must_use]
    pub fn attribute(&self, attribute: UcfAttribute) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(existing, _)| *existing == attribute)
            .map(|(_, value)| value.as_str())
    }

    /// all attribute clauses of this directive, in the order they will be written
    #[must_use]
    pub fn attributes(&self) -> &[(UcfAttribute, String)] {
        &self.attributes
    }

    /// render the directive as one line of UCF text (without a line terminator)
    ///
    /// A directive without attributes renders as `NET "<name>";`.
    #[must_use]
    pub fn stringify(&self) -> String {
        let mut outstring = format!("NET \"{}\"", self.net);
        if !self.attributes.is_empty() {
            let clauses: Vec<String> = self
                .attributes
                .iter()
                .map(|(attribute, value)| format!("{attribute} = {value}"))
                .collect();
            outstring.push(' ');
            outstring.push_str(&clauses.join(" | "));
        }
        outstring.push(';');
        outstring
    }
}

/// An ordered list of `NET` directives
///
/// A `DirectiveList` keeps the directives in the order they were produced,
/// and additionally allows fast lookup by net name.
#[derive(Debug, Clone, Default)]
pub struct DirectiveList {
    // storage for the directives
    items: Vec<UcfDirective>,
    // mapping from net name to index in the items vector
    map: HashMap<String, usize, FnvBuildHasher>,
}

impl DirectiveList {
    /// create a new empty `DirectiveList`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// create a new `DirectiveList` with a specified initial capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            map: HashMap::with_capacity_and_hasher(capacity, FnvBuildHasher::default()),
        }
    }

    /// append a directive to the list
    pub fn push(&mut self, directive: UcfDirective) {
        let index = self.items.len();
        // a net can legitimately occur multiple times; the map refers to the first one
        self.map.entry(directive.net.clone()).or_insert(index);
        self.items.push(directive);
    }

    /// get the first directive for the given net name
    #[must_use]
    pub fn get(&self, net: &str) -> Option<&UcfDirective> {
        let index = self.map.get(net)?;
        Some(&self.items[*index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UcfDirective> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Index<usize> for DirectiveList {
    type Output = UcfDirective;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl IndexMut<usize> for DirectiveList {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.items[index]
    }
}

impl<'a> IntoIterator for &'a DirectiveList {
    type Item = &'a UcfDirective;
    type IntoIter = std::slice::Iter<'a, UcfDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The result of a conversion: all `NET` directives generated from one
/// constraint file, in input order.
#[derive(Debug, Clone, Default)]
pub struct UcfFile {
    pub directives: DirectiveList,
}

impl UcfFile {
    /// create an empty `UcfFile`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names() {
        assert_eq!(UcfAttribute::Loc.as_str(), "LOC");
        assert_eq!(UcfAttribute::IoStandard.as_str(), "IOSTANDARD");
        assert_eq!(UcfAttribute::Slew.as_str(), "SLEW");
        assert_eq!(UcfAttribute::Drive.as_str(), "DRIVE");
        assert_eq!(UcfAttribute::Slew.to_string(), "SLEW");
    }

    #[test]
    fn directive_attributes() {
        let mut directive = UcfDirective::new("CLK".to_string());
        assert_eq!(directive.attribute(UcfAttribute::Loc), None);

        directive.set_attribute(UcfAttribute::Loc, "\"A12\"".to_string());
        directive.set_attribute(UcfAttribute::Slew, "FAST".to_string());
        assert_eq!(directive.attribute(UcfAttribute::Loc), Some("\"A12\""));
        assert_eq!(directive.attribute(UcfAttribute::Slew), Some("FAST"));

        // setting an attribute again replaces the value instead of adding a clause
        directive.set_attribute(UcfAttribute::Slew, "SLOW".to_string());
        assert_eq!(directive.attribute(UcfAttribute::Slew), Some("SLOW"));
        assert_eq!(directive.attributes().len(), 2);
    }

    #[test]
    fn directive_stringify() {
        let mut directive = UcfDirective::new("CLK_50MHZ".to_string());
        assert_eq!(directive.stringify(), "NET \"CLK_50MHZ\";");

        directive.set_attribute(UcfAttribute::Loc, "\"AB11\"".to_string());
        assert_eq!(directive.stringify(), "NET \"CLK_50MHZ\" LOC = \"AB11\";");

        directive.set_attribute(UcfAttribute::Drive, "12".to_string());
        assert_eq!(
            directive.stringify(),
            "NET \"CLK_50MHZ\" LOC = \"AB11\" | DRIVE = 12;"
        );
    }

    #[test]
    fn directive_list() {
        let mut list = DirectiveList::new();
        assert!(list.is_empty());

        list.push(UcfDirective::new("A".to_string()));
        list.push(UcfDirective::new("B".to_string()));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].net, "B");
        assert_eq!(list.get("A").map(|d| d.net.as_str()), Some("A"));
        assert!(list.get("C").is_none());

        let nets: Vec<&str> = list.iter().map(|d| d.net.as_str()).collect();
        assert_eq!(nets, vec!["A", "B"]);
    }

    #[test]
    fn directive_list_duplicate_names() {
        let mut list = DirectiveList::with_capacity(3);
        let mut first = UcfDirective::new("DQ<0>".to_string());
        first.set_attribute(UcfAttribute::Loc, "\"C3\"".to_string());
        list.push(first);
        list.push(UcfDirective::new("DQ<0>".to_string()));

        // lookup by name resolves to the first occurrence
        let found = list.get("DQ<0>").unwrap();
        assert_eq!(found.attribute(UcfAttribute::Loc), Some("\"C3\""));
        // the duplicate is still reachable by index
        assert_eq!(list[1].attribute(UcfAttribute::Loc), None);
    }
}
