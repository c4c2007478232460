use select::document::Document;
use select::node::Node;
use select::predicate::Text;

/// Concatenation of every text node of the document, in document order.
pub fn page_text(document: &Document) -> String {
    document.find(Text).filter_map(|node| node.as_text()).collect()
}

/// The single string directly carried by an element.
///
/// An element has one only when its sole child is a text node, or an element
/// which itself has one. Anything with several children has none.
pub(crate) fn own_string<'a>(node: Node<'a>) -> Option<&'a str> {
    let mut children = node.children();
    match (children.next(), children.next()) {
        (Some(child), None) => child.as_text().or_else(|| own_string(child)),
        _ => None,
    }
}

/// Trimmed rendered text of a node, kept only if its length in characters
/// falls in the `accept` window.
pub(crate) fn rendered_within<F>(node: Node, accept: F) -> Option<String>
where
    F: Fn(usize) -> bool,
{
    let text = node.text();
    let text = text.trim();
    accept(text.chars().count()).then(|| text.to_string())
}
