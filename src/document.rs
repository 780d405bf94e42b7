use std::collections::BTreeMap;

use crate::error::BiocycError;

/// Owned, attribute- and child-addressable view of a `ptools-xml` document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn parse(xml: &str) -> Result<Self, BiocycError> {
        let document = roxmltree::Document::parse(xml)
            .map_err(|err| BiocycError::DocumentParse(err.to_string()))?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();
        let text = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect::<String>();
        let children = node
            .children()
            .filter(|child| child.is_element())
            .map(Self::from_node)
            .collect();
        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            text,
            children,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// First element matching a `/`-separated child path. `*` matches any name.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// All elements matching a `/`-separated child path, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for step in path.split('/').filter(|step| !step.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter())
                .filter(|child| step == "*" || child.name == step)
                .collect();
        }
        current
    }

    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(Element::text)
    }

    /// `frameid` attributes of every element matching `path`, skipping elements without one.
    pub fn frame_ids(&self, path: &str) -> Vec<String> {
        self.find_all(path)
            .into_iter()
            .filter_map(|element| element.attr("frameid"))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ptools-xml ptools-version="27.0">
  <metadata><url>https://websvc.biocyc.org/</url></metadata>
  <Compound ID="META:WATER" orgid="META" frameid="WATER">
    <common-name datatype="string">H&lt;sub&gt;2&lt;/sub&gt;O</common-name>
    <appears-in-left-side-of>
      <Reaction resource="getxml?META:RXN-1" orgid="META" frameid="RXN-1"/>
      <Reaction resource="getxml?META:RXN-2" orgid="META" frameid="RXN-2"/>
    </appears-in-left-side-of>
  </Compound>
</ptools-xml>"#;

    #[test]
    fn parses_paths_and_attributes() {
        let root = Element::parse(SAMPLE).unwrap();
        assert_eq!(root.name, "ptools-xml");
        let compound = root.find("Compound").unwrap();
        assert_eq!(compound.attr("frameid"), Some("WATER"));
        assert_eq!(compound.find_text("common-name"), Some("H<sub>2</sub>O"));
        assert_eq!(
            compound.frame_ids("appears-in-left-side-of/Reaction"),
            vec!["RXN-1".to_string(), "RXN-2".to_string()]
        );
        assert_eq!(compound.frame_ids("appears-in-left-side-of/*").len(), 2);
        assert!(compound.find("missing/path").is_none());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = Element::parse("<ptools-xml><Compound></ptools-xml>").unwrap_err();
        assert_matches!(err, BiocycError::DocumentParse(_));
    }
}
