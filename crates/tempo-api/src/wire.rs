//! XML encode/decode for the service wire format.
//!
//! Requests are `<request req="...">` documents with CDATA-wrapped text
//! fields. Responses are flat element trees with a numeric `status`
//! attribute on the root; data responses carry an `<objects>` list of
//! `<record>`, `<project>`, `<folder>` and `<recordType>` children.

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

use tempo_core::{Node, NodeKind, Record, RecordKind, RecordType, VariableType};

use crate::{NodeDraft, RecordDraft};

/// Decoding failures. Any of these means the response is unusable.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed xml text: {0}")]
    Text(String),

    #[error("unbalanced xml document")]
    Unbalanced,

    #[error("missing <{0}> in response")]
    MissingField(&'static str),

    #[error("missing status attribute on response")]
    MissingStatus,

    #[error("invalid integer in <{field}>: \"{value}\"")]
    InvalidInt { field: &'static str, value: String },

    #[error("unknown record type id {0}")]
    UnknownTypeId(i64),
}

/// An owned XML element with its attributes, children and merged text.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of a required child element.
    pub fn text_of(&self, name: &'static str) -> Result<&str, WireError> {
        self.child(name)
            .map(|c| c.text.as_str())
            .ok_or(WireError::MissingField(name))
    }

    /// Text of an optional child element, empty when absent.
    pub fn text_or_default(&self, name: &str) -> &str {
        self.child(name).map_or("", |c| c.text.as_str())
    }

    /// Integer value of a required child element.
    pub fn int_of(&self, name: &'static str) -> Result<i64, WireError> {
        parse_int(name, self.text_of(name)?)
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, WireError> {
    value.trim().parse().map_err(|_| WireError::InvalidInt {
        field,
        value: value.to_string(),
    })
}

/// Parses a response body into its root element.
pub fn parse_document(body: &str) -> Result<Element, WireError> {
    let mut reader = Reader::from_str(body);
    // Index 0 is a virtual root holding the document element.
    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                stack
                    .last_mut()
                    .ok_or(WireError::Unbalanced)?
                    .children
                    .push(element);
            }
            Event::End(_) => {
                let done = stack.pop().ok_or(WireError::Unbalanced)?;
                stack
                    .last_mut()
                    .ok_or(WireError::Unbalanced)?
                    .children
                    .push(done);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| WireError::Text(err.to_string()))?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(trimmed);
                    }
                }
            }
            Event::CData(cdata) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&cdata));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut root = stack.pop().ok_or(WireError::Unbalanced)?;
    if !stack.is_empty() || root.children.is_empty() {
        return Err(WireError::Unbalanced);
    }
    Ok(root.children.remove(0))
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element, WireError> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Element::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| WireError::Text(err.to_string()))?;
        element.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attribute.value).into_owned(),
        ));
    }
    Ok(element)
}

/// Numeric status attribute of a response root.
pub fn status_code(response: &Element) -> Result<i64, WireError> {
    let raw = response.attr("status").ok_or(WireError::MissingStatus)?;
    raw.trim().parse().map_err(|_| WireError::InvalidInt {
        field: "status",
        value: raw.to_string(),
    })
}

/// All direct children of a response as a name/text listing.
pub fn fields_of(response: &Element) -> Vec<(String, String)> {
    response
        .children
        .iter()
        .map(|c| (c.name.clone(), c.text.clone()))
        .collect()
}

/// Typed objects decoded from a data response.
#[derive(Debug, Default)]
pub struct Objects {
    pub records: Vec<Record>,
    pub projects: Vec<Node>,
    pub folders: Vec<Node>,
    pub record_types: Vec<RecordType>,
}

/// Decodes the `<objects>` list of a data response.
pub fn decode_objects(response: &Element) -> Result<Objects, WireError> {
    let mut objects = Objects::default();
    let list = response.child("objects").ok_or(WireError::MissingField("objects"))?;
    for item in &list.children {
        match item.name.as_str() {
            "record" => objects.records.push(decode_record(item)?),
            "project" => objects.projects.push(decode_node(item, NodeKind::Project)?),
            "folder" => objects.folders.push(decode_node(item, NodeKind::Folder)?),
            "recordType" => objects.record_types.push(decode_record_type(item)?),
            _ => {}
        }
    }
    Ok(objects)
}

/// Positional record variable, as sent inside `<variables>`.
fn variable<'a>(values: &[&'a str], index: usize) -> Result<&'a str, WireError> {
    values
        .get(index)
        .copied()
        .ok_or(WireError::MissingField("variables"))
}

fn decode_record(item: &Element) -> Result<Record, WireError> {
    let type_id = item.int_of("typeId")?;
    let variables = item
        .child("variables")
        .ok_or(WireError::MissingField("variables"))?;
    let values: Vec<&str> = variables
        .children_named("v")
        .map(|v| v.text.as_str())
        .collect();

    let kind = match type_id {
        Record::WORK_TYPE_ID => RecordKind::Work,
        Record::PHONECALL_TYPE_ID => RecordKind::Phonecall {
            phone_number: variable(&values, 4)?.to_string(),
            outgoing: parse_int("variables", variable(&values, 5)?)? != 0,
        },
        other => return Err(WireError::UnknownTypeId(other)),
    };

    Ok(Record {
        id: item.int_of("id")?,
        project: item.int_of("project")?,
        start_time: parse_int("variables", variable(&values, 0)?)?,
        end_time: parse_int("variables", variable(&values, 1)?)?,
        comment: variable(&values, 2)?.to_string(),
        is_running: parse_int("variables", variable(&values, 3)?)? != 0,
        kind,
        time_created: item.int_of("timeCreated")?,
        time_updated: item.int_of("timeUpdated")?,
        creator: item.int_of("creator")?,
        flags: item.int_of("flags")?,
    })
}

fn decode_node(item: &Element, kind: NodeKind) -> Result<Node, WireError> {
    Ok(Node {
        id: item.int_of("id")?,
        name: item.text_or_default("name").to_string(),
        description: item.text_or_default("description").to_string(),
        color: item.text_or_default("primaryColor").to_string(),
        parent_id: item.int_of("parentId")?,
        kind,
        privileges: item.int_of("privileges")?,
        time_created: item.int_of("timeCreated")?,
        creator: item.int_of("creator")?,
    })
}

fn decode_record_type(item: &Element) -> Result<RecordType, WireError> {
    let mut variables = Vec::new();
    if let Some(list) = item.child("variableTypes") {
        for entry in list.children_named("variableType") {
            variables.push(VariableType {
                id: entry.int_of("id")?,
                name: entry.text_or_default("name").to_string(),
                val_type: entry.int_of("valType")?,
            });
        }
    }
    Ok(RecordType {
        id: item.int_of("id")?,
        name: item.text_or_default("name").to_string(),
        variables,
    })
}

/// Builds a `<request req="...">` payload.
#[derive(Debug)]
pub struct RequestBuilder {
    buf: String,
}

impl RequestBuilder {
    pub fn new(req: &str) -> Self {
        Self {
            buf: format!("<request req=\"{req}\">"),
        }
    }

    /// Adds a numeric field.
    #[must_use]
    pub fn field_int(mut self, name: &str, value: i64) -> Self {
        use std::fmt::Write;
        let _ = write!(self.buf, "<{name}>{value}</{name}>");
        self
    }

    /// Adds a field whose value is already wire-safe (id lists, enum words).
    #[must_use]
    pub fn field_raw(mut self, name: &str, value: &str) -> Self {
        use std::fmt::Write;
        let _ = write!(self.buf, "<{name}>{value}</{name}>");
        self
    }

    /// Adds a CDATA-wrapped text field.
    #[must_use]
    pub fn field_cdata(mut self, name: &str, value: &str) -> Self {
        use std::fmt::Write;
        let _ = write!(self.buf, "<{name}>{}</{name}>", cdata(value));
        self
    }

    /// Splices pre-rendered XML (object payloads) into the request.
    #[must_use]
    pub fn raw_xml(mut self, xml: &str) -> Self {
        self.buf.push_str(xml);
        self
    }

    #[must_use]
    pub fn finish(mut self) -> String {
        self.buf.push_str("</request>");
        self.buf
    }
}

/// CDATA-wraps arbitrary text, splitting any embedded `]]>`.
pub fn cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}

/// Renders a `<record>` payload. `id` goes out for change/delete,
/// `draft` for add/change.
pub fn record_xml(id: Option<i64>, draft: Option<&RecordDraft>) -> String {
    use std::fmt::Write;
    let mut xml = String::from("<record>");
    if let Some(id) = id {
        let _ = write!(xml, "<id>{id}</id>");
    }
    if let Some(draft) = draft {
        let _ = write!(
            xml,
            "<typeId>{}</typeId><project>{}</project><variables><v>{}</v><v>{}</v><v>{}</v><v>{}</v>",
            draft.type_id(),
            draft.project,
            draft.start_time,
            draft.end_time,
            cdata(&draft.comment),
            i64::from(draft.is_running),
        );
        if let RecordKind::Phonecall {
            phone_number,
            outgoing,
        } = &draft.kind
        {
            let _ = write!(
                xml,
                "<v>{}</v><v>{}</v>",
                cdata(phone_number),
                i64::from(*outgoing),
            );
        }
        xml.push_str("</variables>");
    }
    xml.push_str("</record>");
    xml
}

/// Renders a `<project>` or `<folder>` payload.
pub fn node_xml(kind: NodeKind, id: Option<i64>, draft: Option<&NodeDraft>) -> String {
    use std::fmt::Write;
    let tag = match kind {
        NodeKind::Project => "project",
        NodeKind::Folder => "folder",
    };
    let mut xml = format!("<{tag}>");
    if let Some(id) = id {
        let _ = write!(xml, "<id>{id}</id>");
    }
    if let Some(draft) = draft {
        let _ = write!(
            xml,
            "<name>{}</name><description>{}</description><primaryColor>{}</primaryColor>\
             <parentId>{}</parentId><flags>0</flags>",
            cdata(&draft.name),
            cdata(&draft.description),
            cdata(&draft.color),
            draft.parent_id,
        );
    }
    let _ = write!(xml, "</{tag}>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_response() {
        let doc = parse_document(r#"<response status="0"><hash>abc123</hash></response>"#).unwrap();
        assert_eq!(doc.name, "response");
        assert_eq!(status_code(&doc).unwrap(), 0);
        assert_eq!(doc.text_of("hash").unwrap(), "abc123");
    }

    #[test]
    fn missing_status_attribute_is_an_error() {
        let doc = parse_document("<response><hash>x</hash></response>").unwrap();
        assert!(matches!(status_code(&doc), Err(WireError::MissingStatus)));
    }

    #[test]
    fn cdata_and_entities_decode_into_text() {
        let doc = parse_document(
            r#"<response status="0"><name><![CDATA[Client & Co]]></name><note>a &amp; b</note></response>"#,
        )
        .unwrap();
        assert_eq!(doc.text_of("name").unwrap(), "Client & Co");
        assert_eq!(doc.text_of("note").unwrap(), "a & b");
    }

    #[test]
    fn decodes_projects_and_folders() {
        let doc = parse_document(
            r#"<response status="0"><objects>
                <project><id>3</id><name><![CDATA[Backend]]></name>
                  <description><![CDATA[apis]]></description>
                  <primaryColor><![CDATA[blue]]></primaryColor>
                  <parentId>1</parentId><privileges>7</privileges>
                  <timeCreated>100</timeCreated><creator>2</creator></project>
                <folder><id>1</id><name><![CDATA[Work]]></name>
                  <description></description>
                  <primaryColor><![CDATA[red]]></primaryColor>
                  <parentId>0</parentId><privileges>7</privileges>
                  <timeCreated>90</timeCreated><creator>2</creator></folder>
               </objects></response>"#,
        )
        .unwrap();

        let objects = decode_objects(&doc).unwrap();
        assert_eq!(objects.projects.len(), 1);
        assert_eq!(objects.folders.len(), 1);

        let project = &objects.projects[0];
        assert_eq!(project.id, 3);
        assert_eq!(project.name, "Backend");
        assert_eq!(project.parent_id, 1);
        assert_eq!(project.kind, NodeKind::Project);

        let folder = &objects.folders[0];
        assert_eq!(folder.name, "Work");
        assert_eq!(folder.description, "");
        assert_eq!(folder.kind, NodeKind::Folder);
    }

    #[test]
    fn decodes_work_and_phonecall_records() {
        let doc = parse_document(
            r#"<response status="0"><objects>
                <record><id>11</id><typeId>1</typeId><project>3</project>
                  <variables><v>1000</v><v>1600</v><v><![CDATA[standup]]></v><v>0</v></variables>
                  <timeCreated>1</timeCreated><timeUpdated>2</timeUpdated>
                  <creator>2</creator><flags>0</flags></record>
                <record><id>12</id><typeId>3</typeId><project>3</project>
                  <variables><v>2000</v><v>2300</v><v><![CDATA[support call]]></v><v>1</v>
                    <v><![CDATA[555-0100]]></v><v>1</v></variables>
                  <timeCreated>3</timeCreated><timeUpdated>4</timeUpdated>
                  <creator>2</creator><flags>0</flags></record>
               </objects></response>"#,
        )
        .unwrap();

        let objects = decode_objects(&doc).unwrap();
        assert_eq!(objects.records.len(), 2);

        let work = &objects.records[0];
        assert_eq!(work.id, 11);
        assert_eq!(work.kind, RecordKind::Work);
        assert_eq!(work.start_time, 1000);
        assert_eq!(work.end_time, 1600);
        assert_eq!(work.comment, "standup");
        assert!(!work.is_running);

        let call = &objects.records[1];
        assert_eq!(call.type_name(), "phonecall");
        assert!(call.is_running);
        assert_eq!(
            call.kind,
            RecordKind::Phonecall {
                phone_number: "555-0100".to_string(),
                outgoing: true,
            }
        );
    }

    #[test]
    fn unknown_record_type_id_fails() {
        let doc = parse_document(
            r#"<response status="0"><objects>
                <record><id>1</id><typeId>9</typeId><project>3</project>
                  <variables><v>0</v><v>0</v><v></v><v>0</v></variables>
                  <timeCreated>0</timeCreated><timeUpdated>0</timeUpdated>
                  <creator>0</creator><flags>0</flags></record>
               </objects></response>"#,
        )
        .unwrap();
        assert!(matches!(
            decode_objects(&doc),
            Err(WireError::UnknownTypeId(9))
        ));
    }

    #[test]
    fn decodes_record_types() {
        let doc = parse_document(
            r#"<response status="0"><objects>
                <recordType><id>1</id><name><![CDATA[Work]]></name>
                  <variableTypes>
                    <variableType><id>5</id><name><![CDATA[startTime]]></name><valType>2</valType></variableType>
                  </variableTypes></recordType>
               </objects></response>"#,
        )
        .unwrap();
        let objects = decode_objects(&doc).unwrap();
        assert_eq!(objects.record_types.len(), 1);
        assert_eq!(objects.record_types[0].name, "Work");
        assert_eq!(objects.record_types[0].variables[0].name, "startTime");
    }

    #[test]
    fn request_builder_shapes_the_payload() {
        let request = RequestBuilder::new("data.getRecords")
            .field_cdata("user", "alice")
            .field_int("timeFrom", 1000)
            .field_raw("typeId", "1,3")
            .finish();
        assert_eq!(
            request,
            "<request req=\"data.getRecords\"><user><![CDATA[alice]]></user>\
             <timeFrom>1000</timeFrom><typeId>1,3</typeId></request>"
        );
    }

    #[test]
    fn cdata_splits_embedded_terminator() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn record_xml_for_add_and_delete() {
        let draft = RecordDraft {
            project: 3,
            start_time: 10,
            end_time: 20,
            comment: "x".to_string(),
            is_running: false,
            kind: RecordKind::Work,
        };
        let add = record_xml(None, Some(&draft));
        assert!(add.starts_with("<record><typeId>1</typeId><project>3</project>"));
        assert!(add.contains("<v>10</v><v>20</v>"));
        assert!(!add.contains("<id>"));

        let delete = record_xml(Some(7), None);
        assert_eq!(delete, "<record><id>7</id></record>");
    }

    #[test]
    fn node_xml_uses_the_kind_tag() {
        let draft = NodeDraft {
            name: "Ops".to_string(),
            description: String::new(),
            color: "blue".to_string(),
            parent_id: 0,
        };
        let xml = node_xml(NodeKind::Folder, None, Some(&draft));
        assert!(xml.starts_with("<folder><name><![CDATA[Ops]]></name>"));
        assert!(xml.ends_with("</folder>"));
        assert!(xml.contains("<parentId>0</parentId>"));
    }
}
