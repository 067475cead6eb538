//! Event-driven parser for PI AF XML exports.
//!
//! The parser keeps its own stack of open tags instead of recursing, so document
//! depth is bounded by memory rather than by the thread stack. Only the parts of the
//! export the flattener needs are retained: the first `AFDatabase` under the root
//! element, its `AFElement` tree, each node's `Name`, element `Template`, and the
//! attribute scalars. Everything else is skipped, including AF tags that do not sit
//! directly under the node kind that owns them.

use crate::hierarchy::{Attribute, AttributeFields, Database, Document, Element, HierarchyError, NodeKind, ROOT_CONTAINER_TAG};
use quick_xml::Reader;
use quick_xml::events::Event;

const ELEMENT_TAG: &[u8] = b"AFElement";
const ATTRIBUTE_TAG: &[u8] = b"AFAttribute";

/// Child tags whose text is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Name,
    Template,
    Type,
    DataReference,
    ConfigString,
    Value,
    Description,
}

impl FieldKind {
    fn for_tag(owner: Owner, tag: &[u8]) -> Option<Self> {
        let kind = match tag {
            b"Name" => Self::Name,
            b"Template" => Self::Template,
            b"Type" => Self::Type,
            b"DataReference" => Self::DataReference,
            b"ConfigString" => Self::ConfigString,
            b"Value" => Self::Value,
            b"Description" => Self::Description,
            _ => return None,
        };

        let accepted = match owner {
            Owner::Database => kind == Self::Name,
            Owner::Node(NodeKind::Element) => matches!(kind, Self::Name | Self::Template),
            Owner::Node(NodeKind::Attribute) => kind != Self::Template,
        };

        accepted.then_some(kind)
    }
}

#[derive(Debug, Clone, Copy)]
enum Owner {
    Database,
    Node(NodeKind),
}

/// Text of the first occurrence of a child tag; later occurrences are ignored.
#[derive(Debug, Default)]
struct Slot(Option<Option<String>>);

impl Slot {
    fn fill(&mut self, text: Option<String>) {
        if self.0.is_none() {
            self.0 = Some(text);
        }
    }

    fn into_value(self) -> Option<String> {
        self.0.flatten()
    }
}

#[derive(Debug, Default)]
struct DatabaseBuilder {
    name: Slot,
    elements: Vec<Element>,
}

#[derive(Debug, Default)]
struct ElementBuilder {
    name: Slot,
    template: Slot,
    elements: Vec<Element>,
    attributes: Vec<Attribute>,
}

impl ElementBuilder {
    fn build(self) -> Element {
        Element {
            name: self.name.into_value(),
            template: self.template.into_value(),
            elements: self.elements,
            attributes: self.attributes,
        }
    }
}

#[derive(Debug, Default)]
struct AttributeBuilder {
    name: Slot,
    attribute_type: Slot,
    data_reference: Slot,
    config_string: Slot,
    static_value: Slot,
    description: Slot,
    attributes: Vec<Attribute>,
}

impl AttributeBuilder {
    fn build(self) -> Attribute {
        Attribute {
            name: self.name.into_value(),
            fields: AttributeFields {
                attribute_type: self.attribute_type.into_value(),
                data_reference: self.data_reference.into_value(),
                config_string: self.config_string.into_value(),
                static_value: self.static_value.into_value(),
                description: self.description.into_value(),
            },
            attributes: self.attributes,
        }
    }
}

#[derive(Debug)]
struct FieldText {
    kind: FieldKind,
    text: String,

    // Only text before the first child tag counts.
    complete: bool,
}

#[derive(Debug)]
enum Frame {
    Root,
    Database(DatabaseBuilder),
    Element(ElementBuilder),
    Attribute(AttributeBuilder),
    Field(FieldText),
    Ignored,
}

#[derive(Debug)]
struct Open {
    tag: String,
    frame: Frame,
}

#[derive(Debug, Default)]
struct Parser {
    stack: Vec<Open>,
    root_tag: Option<String>,
    root_closed: bool,
    database: Option<Database>,
}

impl Parser {
    fn open(&mut self, tag: &[u8]) -> Result<(), String> {
        let frame = match self.stack.last_mut() {
            None if self.root_closed => return Err("content after the root element".to_string()),
            None => {
                self.root_tag = Some(String::from_utf8_lossy(tag).into_owned());
                Frame::Root
            }
            Some(parent) => match &mut parent.frame {
                Frame::Root if tag == ROOT_CONTAINER_TAG.as_bytes() && self.database.is_none() => {
                    Frame::Database(DatabaseBuilder::default())
                }
                Frame::Database(_) if tag == ELEMENT_TAG => Frame::Element(ElementBuilder::default()),
                Frame::Database(_) => field_frame(Owner::Database, tag),
                Frame::Element(_) if tag == ELEMENT_TAG => Frame::Element(ElementBuilder::default()),
                Frame::Element(_) if tag == ATTRIBUTE_TAG => Frame::Attribute(AttributeBuilder::default()),
                Frame::Element(_) => field_frame(Owner::Node(NodeKind::Element), tag),
                Frame::Attribute(_) if tag == ATTRIBUTE_TAG => Frame::Attribute(AttributeBuilder::default()),
                Frame::Attribute(_) => field_frame(Owner::Node(NodeKind::Attribute), tag),
                Frame::Field(field) => {
                    field.complete = true;
                    Frame::Ignored
                }
                Frame::Root | Frame::Ignored => Frame::Ignored,
            },
        };

        self.stack.push(Open {
            tag: String::from_utf8_lossy(tag).into_owned(),
            frame,
        });

        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(Open {
            frame: Frame::Field(field), ..
        }) = self.stack.last_mut()
            && !field.complete
        {
            field.text.push_str(text);
        }
    }

    fn close(&mut self) {
        let Some(closed) = self.stack.pop() else {
            return;
        };

        let parent = self.stack.last_mut().map(|open| &mut open.frame);
        match (closed.frame, parent) {
            (Frame::Field(field), Some(parent)) => {
                let trimmed = field.text.trim();
                let value = (!trimmed.is_empty()).then(|| trimmed.to_string());
                fill_field(parent, field.kind, value);
            }
            (Frame::Element(builder), Some(Frame::Database(db))) => db.elements.push(builder.build()),
            (Frame::Element(builder), Some(Frame::Element(parent))) => parent.elements.push(builder.build()),
            (Frame::Attribute(builder), Some(Frame::Element(parent))) => parent.attributes.push(builder.build()),
            (Frame::Attribute(builder), Some(Frame::Attribute(parent))) => parent.attributes.push(builder.build()),
            (Frame::Database(builder), _) => {
                self.database = Some(Database {
                    name: builder.name.into_value(),
                    elements: builder.elements,
                });
            }
            (Frame::Root, None) => self.root_closed = true,
            _ => {}
        }
    }

    fn finish(mut self) -> Result<Document, HierarchyError> {
        if let Some(open) = self.stack.pop() {
            return Err(HierarchyError::Truncated { open_tag: open.tag });
        }

        let root_tag = self.root_tag.ok_or(HierarchyError::Empty)?;
        Ok(Document {
            root_tag,
            database: self.database,
        })
    }
}

fn field_frame(owner: Owner, tag: &[u8]) -> Frame {
    FieldKind::for_tag(owner, tag).map_or(Frame::Ignored, |kind| {
        Frame::Field(FieldText {
            kind,
            text: String::new(),
            complete: false,
        })
    })
}

fn fill_field(owner: &mut Frame, kind: FieldKind, value: Option<String>) {
    let slot = match (owner, kind) {
        (Frame::Database(db), FieldKind::Name) => &mut db.name,
        (Frame::Element(e), FieldKind::Name) => &mut e.name,
        (Frame::Element(e), FieldKind::Template) => &mut e.template,
        (Frame::Attribute(a), FieldKind::Name) => &mut a.name,
        (Frame::Attribute(a), FieldKind::Type) => &mut a.attribute_type,
        (Frame::Attribute(a), FieldKind::DataReference) => &mut a.data_reference,
        (Frame::Attribute(a), FieldKind::ConfigString) => &mut a.config_string,
        (Frame::Attribute(a), FieldKind::Value) => &mut a.static_value,
        (Frame::Attribute(a), FieldKind::Description) => &mut a.description,
        _ => return,
    };

    slot.fill(value);
}

/// Parse the text of an AF export.
///
/// A well-formed document without an `AFDatabase` under its root element parses
/// successfully with [`Document::database`] set to `None`; flattening it then fails
/// with [`HierarchyError::StructureError`].
///
/// # Errors
///
/// Returns an error if the text is not well-formed XML, ends inside an open tag, or
/// has no root element.
pub fn parse_document(xml: &str) -> Result<Document, HierarchyError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    let mut parser = Parser::default();

    loop {
        let position = reader.buffer_position();
        let malformed = |message: String| HierarchyError::Xml { position, message };

        match reader.read_event() {
            Ok(Event::Start(e)) => parser.open(e.local_name().as_ref()).map_err(malformed)?,
            Ok(Event::Empty(e)) => {
                parser.open(e.local_name().as_ref()).map_err(malformed)?;
                parser.close();
            }
            Ok(Event::End(_)) => parser.close(),
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| malformed(err.to_string()))?;
                parser.text(&text);
            }
            Ok(Event::CData(e)) => parser.text(&String::from_utf8_lossy(&e.into_inner())),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(malformed(err.to_string())),
        }
    }

    let document = parser.finish()?;
    log::debug!(
        "parsed <{}> document, {} container",
        document.root_tag,
        if document.database.is_some() { "with" } else { "without" }
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::flatten_document;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<AF xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" SchemaVersion="2.0">
  <AFDatabase>
    <Name>Well Drilling</Name>
    <AFElement>
      <Name>Site</Name>
      <Template>SiteTemplate</Template>
      <AFAttribute>
        <Name>Location</Name>
        <Type>String</Type>
        <Value type="String">North &amp; East</Value>
      </AFAttribute>
      <AFElement>
        <Name>Pump1</Name>
        <AFAttribute>
          <Name>Status</Name>
          <Type>Int32</Type>
          <AFAttribute>
            <Name>Code</Name>
            <Description><![CDATA[Vendor <code>]]></Description>
          </AFAttribute>
        </AFAttribute>
        <AFAttribute>
          <Name>Speed</Name>
          <DataReference>PI Point</DataReference>
          <ConfigString>\\PISRV\Pump1.Speed;UOM=rpm</ConfigString>
        </AFAttribute>
      </AFElement>
    </AFElement>
    <AFElement>
      <Name />
      <AFAttribute><Name>Orphan</Name></AFAttribute>
    </AFElement>
  </AFDatabase>
</AF>
"#;

    #[test]
    fn test_parse_sample_structure() {
        let document = parse_document(SAMPLE).unwrap();
        assert_eq!(document.root_tag, "AF");

        let db = document.database.as_ref().unwrap();
        assert_eq!(db.name.as_deref(), Some("Well Drilling"));
        assert_eq!(db.elements.len(), 2);

        let site = &db.elements[0];
        assert_eq!(site.name.as_deref(), Some("Site"));
        assert_eq!(site.template.as_deref(), Some("SiteTemplate"));
        assert_eq!(site.attributes.len(), 1);
        assert_eq!(site.elements.len(), 1);
        assert_eq!(site.attributes[0].fields.static_value.as_deref(), Some("North & East"));

        let pump = &site.elements[0];
        assert_eq!(pump.attributes[0].attributes[0].fields.description.as_deref(), Some("Vendor <code>"));
        assert_eq!(pump.attributes[1].fields.config_string.as_deref(), Some(r"\\PISRV\Pump1.Speed;UOM=rpm"));

        assert_eq!(db.elements[1].name, None);
    }

    #[test]
    fn test_parse_then_flatten_sample() {
        let document = parse_document(SAMPLE).unwrap();
        let records = flatten_document(&document).unwrap();

        let paths: Vec<_> = records
            .iter()
            .map(|r| format!("{} :: {}", r.element_path, r.attribute_path))
            .collect();
        assert_eq!(
            paths,
            vec![
                "Site :: Location",
                "Site/Pump1 :: Status",
                "Site/Pump1 :: Status/Code",
                "Site/Pump1 :: Speed",
                "(unnamed element) :: Orphan",
            ]
        );
    }

    #[test]
    fn test_missing_container_parses_but_does_not_flatten() {
        let document = parse_document("<AF><AFElement><Name>Loose</Name></AFElement></AF>").unwrap();
        assert!(document.database.is_none());

        let err = flatten_document(&document).unwrap_err();
        assert!(err.is_structure_error());
    }

    #[test]
    fn test_container_must_be_direct_child_of_root() {
        let document = parse_document("<AF><Wrapper><AFDatabase /></Wrapper></AF>").unwrap();
        assert!(document.database.is_none());
    }

    #[test]
    fn test_first_container_wins() {
        let xml = "<AF><AFDatabase><Name>First</Name></AFDatabase><AFDatabase><Name>Second</Name></AFDatabase></AF>";
        let document = parse_document(xml).unwrap();
        assert_eq!(document.database.unwrap().name.as_deref(), Some("First"));
    }

    #[test]
    fn test_first_name_wins_even_when_blank() {
        let xml = "<AF><AFDatabase><AFElement><Name>  </Name><Name>Second</Name></AFElement></AFDatabase></AF>";
        let document = parse_document(xml).unwrap();
        assert_eq!(document.database.unwrap().elements[0].name, None);
    }

    #[test]
    fn test_only_direct_children_are_collected() {
        let xml = r"<AF><AFDatabase><AFElement>
            <Name>E</Name>
            <Extensions><AFAttribute><Name>Hidden</Name></AFAttribute></Extensions>
            <AFAttribute><Name>Shown</Name><Template>NotForAttributes</Template></AFAttribute>
        </AFElement></AFDatabase></AF>";
        let document = parse_document(xml).unwrap();
        let element = &document.database.as_ref().unwrap().elements[0];

        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attributes[0].name.as_deref(), Some("Shown"));
    }

    #[test]
    fn test_value_text_stops_at_first_child() {
        let xml = "<AF><AFDatabase><AFElement><AFAttribute><Value> 42 <Unit>m</Unit> tail</Value></AFAttribute></AFElement></AFDatabase></AF>";
        let document = parse_document(xml).unwrap();
        let attribute = &document.database.as_ref().unwrap().elements[0].attributes[0];

        assert_eq!(attribute.fields.static_value.as_deref(), Some("42"));
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let document = parse_document("\u{feff}<AF><AFDatabase /></AF>").unwrap();
        assert!(document.database.is_some());
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let err = parse_document("<AF><AFDatabase></AF>").unwrap_err();
        assert!(matches!(err, HierarchyError::Xml { .. }), "{err:?}");
    }

    #[test]
    fn test_truncated_xml_is_error() {
        let err = parse_document("<AF><AFDatabase>").unwrap_err();
        assert!(matches!(err, HierarchyError::Truncated { .. } | HierarchyError::Xml { .. }), "{err:?}");
    }

    #[test]
    fn test_empty_document_is_error() {
        let err = parse_document("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, HierarchyError::Empty), "{err:?}");
    }

    #[test]
    fn test_deeply_nested_document() {
        const DEPTH: usize = 5_000;

        let mut xml = String::from("<AF><AFDatabase><AFElement><Name>Deep</Name>");
        for _ in 0..DEPTH {
            xml.push_str("<AFAttribute><Name>n</Name>");
        }
        for _ in 0..DEPTH {
            xml.push_str("</AFAttribute>");
        }
        xml.push_str("</AFElement></AFDatabase></AF>");

        let document = parse_document(&xml).unwrap();
        let records = flatten_document(&document).unwrap();

        assert_eq!(records.len(), DEPTH);
        assert_eq!(records[DEPTH - 1].attribute_path.split('/').count(), DEPTH);
    }
}
