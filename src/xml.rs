// Vendor XML decoding into a generic nested mapping
//
// The vendor represents every element as an array of its occurrences, even
// when logically singular. Attributes become keys of the element's mapping,
// and character data of an element that also carries attributes or children
// is stored under the "$t" key.
use crate::error::ProxyError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    Text(String),
    Map(HashMap<String, Vec<XmlValue>>),
}

pub fn parse_xml(text: &str) -> Result<XmlValue, ProxyError> {
    let mut reader = Reader::from_str(text);

    // Stack of open elements: name, child mapping, accumulated text.
    let mut stack: Vec<(String, HashMap<String, Vec<XmlValue>>, String)> = Vec::new();
    let mut root: HashMap<String, Vec<XmlValue>> = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut children = HashMap::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| ProxyError::XmlParse(e.to_string()))?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(|e| ProxyError::XmlParse(e.to_string()))?
                        .into_owned();
                    children.insert(key, vec![XmlValue::Text(value)]);
                }
                stack.push((name, children, String::new()));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut children = HashMap::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| ProxyError::XmlParse(e.to_string()))?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(|e| ProxyError::XmlParse(e.to_string()))?
                        .into_owned();
                    children.insert(key, vec![XmlValue::Text(value)]);
                }
                let value = finish_element(children, String::new());
                attach(&mut stack, &mut root, name, value);
            }
            Ok(Event::Text(t)) => {
                if let Some((_, _, text)) = stack.last_mut() {
                    let chunk = t
                        .xml_content()
                        .map_err(|e| ProxyError::XmlParse(e.to_string()))?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some((_, _, text)) = stack.last_mut() {
                    text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some((_, _, text)) = stack.last_mut() {
                    let name = String::from_utf8_lossy(&e).into_owned();
                    if let Some(resolved) = resolve_reference(&name) {
                        text.push(resolved);
                    }
                }
            }
            Ok(Event::End(_)) => {
                let (name, children, text) = stack
                    .pop()
                    .ok_or_else(|| ProxyError::XmlParse("unexpected closing tag".to_string()))?;
                let value = finish_element(children, text);
                attach(&mut stack, &mut root, name, value);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ProxyError::XmlParse(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(ProxyError::XmlParse(
            "unexpected end of document".to_string(),
        ));
    }

    Ok(XmlValue::Map(root))
}

// Predefined and numeric character references; unknown entities are dropped.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))?;
            char::from_u32(code)
        }
    }
}

// Surrounding whitespace is insignificant in the vendor feed; interior
// spacing of mixed content is kept as-is.
fn finish_element(children: HashMap<String, Vec<XmlValue>>, text: String) -> XmlValue {
    let text = text.trim();
    if children.is_empty() {
        XmlValue::Text(text.to_string())
    } else {
        let mut children = children;
        if !text.is_empty() {
            children.insert("$t".to_string(), vec![XmlValue::Text(text.to_string())]);
        }
        XmlValue::Map(children)
    }
}

fn attach(
    stack: &mut [(String, HashMap<String, Vec<XmlValue>>, String)],
    root: &mut HashMap<String, Vec<XmlValue>>,
    name: String,
    value: XmlValue,
) {
    let target = match stack.last_mut() {
        Some((_, children, _)) => children,
        None => root,
    };
    target.entry(name).or_default().push(value);
}

// Walks dot-separated segments, substituting the first occurrence of each
// element before descending. Returns None the moment a segment is absent.
pub fn get<'a>(root: &'a XmlValue, path: &str) -> Option<&'a XmlValue> {
    let mut current = root;
    for segment in path.split('.') {
        let map = match current {
            XmlValue::Map(map) => map,
            XmlValue::Text(_) => return None,
        };
        current = map.get(segment)?.first()?;
    }
    Some(current)
}

// All occurrences of the final path segment; empty when anything is absent.
pub fn get_all<'a>(root: &'a XmlValue, path: &str) -> &'a [XmlValue] {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (get(root, parent), last),
        None => (Some(root), path),
    };
    match parent {
        Some(XmlValue::Map(map)) => map.get(last).map(Vec::as_slice).unwrap_or(&[]),
        _ => &[],
    }
}

// The text content of a node: a plain leaf, or the "$t" entry of an element
// that also carries attributes.
pub fn text_of(value: &XmlValue) -> Option<&str> {
    match value {
        XmlValue::Text(s) => Some(s.as_str()),
        XmlValue::Map(map) => match map.get("$t")?.first()? {
            XmlValue::Text(s) => Some(s.as_str()),
            XmlValue::Map(_) => None,
        },
    }
}

pub fn get_text<'a>(root: &'a XmlValue, path: &str) -> Option<&'a str> {
    text_of(get(root, path)?)
}
