//! Sub-frame resolution over a pierced DOM snapshot
//!
//! Chrome reports iframe documents as `content_document` children when the
//! document is fetched with `pierce: true`. The payment form lives in one of
//! those documents.

use courtside_core::FrameRef;
use headless_chrome::protocol::cdp::DOM::Node;

/// Value of `key` in CDP's flattened `[name, value, name, value, ..]` list
pub(crate) fn attribute<'a>(attributes: &'a [String], key: &str) -> Option<&'a str> {
    attributes
        .chunks(2)
        .find(|pair| pair.len() == 2 && pair[0].eq_ignore_ascii_case(key))
        .map(|pair| pair[1].as_str())
}

/// Whether an iframe with these attributes is the one `name` refers to
pub(crate) fn matches_name(attributes: &[String], name: &str) -> bool {
    attribute(attributes, "name") == Some(name) || attribute(attributes, "id") == Some(name)
}

/// Iframes owned by the document at `root`, in document order.
///
/// Documents nested inside those iframes are not entered, so positions match
/// what the page itself reports as `window.frames`.
pub(crate) fn top_level_iframes(root: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    walk(root, false, &mut out);
    out
}

/// Every iframe reachable from `root`, nested documents included
pub(crate) fn all_iframes(root: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    walk(root, true, &mut out);
    out
}

fn walk<'a>(node: &'a Node, pierce: bool, out: &mut Vec<&'a Node>) {
    if node.node_name.eq_ignore_ascii_case("iframe") {
        out.push(node);
    }
    if let Some(children) = &node.children {
        for child in children {
            walk(child, pierce, out);
        }
    }
    if pierce {
        if let Some(document) = &node.content_document {
            walk(document, pierce, out);
        }
    }
}

/// Pick the iframe a frame reference points at.
///
/// Indexes count top-level iframes only. Names are matched at any depth.
pub(crate) fn select<'a>(root: &'a Node, frame: &FrameRef) -> Option<&'a Node> {
    match frame {
        FrameRef::Index(index) => top_level_iframes(root).get(*index).copied(),
        FrameRef::Name(name) => all_iframes(root).into_iter().find(|node| {
            node.attributes
                .as_deref()
                .map(|attrs| matches_name(attrs, name))
                .unwrap_or(false)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<String> {
        pairs
            .iter()
            .flat_map(|(k, v)| [k.to_string(), v.to_string()])
            .collect()
    }

    #[test]
    fn test_attribute_lookup() {
        let list = attrs(&[("id", "payFrame"), ("src", "https://pay.example/")]);
        assert_eq!(attribute(&list, "id"), Some("payFrame"));
        assert_eq!(attribute(&list, "SRC"), Some("https://pay.example/"));
        assert_eq!(attribute(&list, "name"), None);
    }

    #[test]
    fn test_matches_name_or_id() {
        assert!(matches_name(&attrs(&[("name", "tokenFrame")]), "tokenFrame"));
        assert!(matches_name(&attrs(&[("id", "tokenFrame")]), "tokenFrame"));
        assert!(!matches_name(&attrs(&[("title", "tokenFrame")]), "tokenFrame"));
    }

    fn node(value: serde_json::Value) -> Node {
        serde_json::from_value(value).unwrap()
    }

    fn iframe(id: &str, nested: Option<serde_json::Value>) -> serde_json::Value {
        let mut frame = serde_json::json!({
            "nodeId": 0,
            "backendNodeId": 0,
            "nodeType": 1,
            "nodeName": "IFRAME",
            "localName": "iframe",
            "nodeValue": "",
            "attributes": ["id", id],
        });
        if let Some(body) = nested {
            frame["contentDocument"] = document(vec![body]);
        }
        frame
    }

    fn document(children: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::json!({
            "nodeId": 1,
            "backendNodeId": 1,
            "nodeType": 9,
            "nodeName": "#document",
            "localName": "",
            "nodeValue": "",
            "children": [{
                "nodeId": 2,
                "backendNodeId": 2,
                "nodeType": 1,
                "nodeName": "BODY",
                "localName": "body",
                "nodeValue": "",
                "children": children,
            }],
        })
    }

    fn id_of(node: &Node) -> Option<&str> {
        attribute(node.attributes.as_deref()?, "id")
    }

    fn page_with_nested_frame() -> Node {
        node(document(vec![
            iframe("f0", Some(iframe("inner", None))),
            iframe("f1", None),
            iframe("f2", None),
            iframe("f3", None),
        ]))
    }

    #[test]
    fn test_index_ignores_iframes_inside_other_frames() {
        let root = page_with_nested_frame();

        let ids: Vec<_> = top_level_iframes(&root).into_iter().filter_map(id_of).collect();
        assert_eq!(ids, vec!["f0", "f1", "f2", "f3"]);

        let selected = select(&root, &FrameRef::Index(3)).and_then(id_of);
        assert_eq!(selected, Some("f3"));
        assert!(select(&root, &FrameRef::Index(4)).is_none());
    }

    #[test]
    fn test_name_reaches_nested_frames() {
        let root = page_with_nested_frame();

        assert_eq!(all_iframes(&root).len(), 5);
        let selected = select(&root, &FrameRef::Name("inner".to_string())).and_then(id_of);
        assert_eq!(selected, Some("inner"));
    }

    #[test]
    fn test_odd_attribute_list_is_tolerated() {
        let list = vec!["name".to_string()];
        assert_eq!(attribute(&list, "name"), None);
    }
}
