use quick_xml::events::BytesStart;
use std::collections::HashMap;

/// Returns the local name of an element as a string
pub(crate) fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Collects the attributes of an element
pub(crate) fn attributes(e: &BytesStart) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| format!("invalid XML attribute: {}", e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid XML attribute value: {}", e))?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

/// Parses an optional non-negative integer attribute
pub(crate) fn usize_attribute(attrs: &HashMap<String, String>, key: &str) -> Result<Option<usize>, String> {
    match attrs.get(key) {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("attribute {}=\"{}\" is not a non-negative integer", key, value)),
        None => Ok(None),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{attributes, tag_name, usize_attribute};
    use quick_xml::events::Event;
    use quick_xml::Reader;

    #[test]
    fn attributes_work() {
        let mut reader = Reader::from_str(r#"<DataSet timestep="1.5" file="a&amp;b.vtu" part="x"/>"#);
        match reader.read_event().unwrap() {
            Event::Empty(e) => {
                assert_eq!(tag_name(&e), "DataSet");
                let attrs = attributes(&e).unwrap();
                assert_eq!(attrs.get("timestep").unwrap(), "1.5");
                assert_eq!(attrs.get("file").unwrap(), "a&b.vtu");
                assert_eq!(usize_attribute(&attrs, "missing"), Ok(None));
                assert_eq!(
                    usize_attribute(&attrs, "part").err(),
                    Some("attribute part=\"x\" is not a non-negative integer".to_string())
                );
            }
            _ => panic!("expected an empty element"),
        }
    }
}
