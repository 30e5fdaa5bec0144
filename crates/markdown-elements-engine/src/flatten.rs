use crate::node::{Key, Node};

/// Appends `candidate` to `out`.
///
/// `Empty` and `Bool` are dropped, fragments are flattened in order, and an
/// element without a key gets its position in `out` as key. Elements that
/// already carry a key are appended unchanged.
pub fn append(out: &mut Vec<Node>, candidate: Node) {
    push(out, candidate, true);
}

/// Like [`append`] but leaves keys alone.
///
/// Used while a sequence is still being assembled, so that keys are assigned
/// once against the final positions.
pub(crate) fn append_unkeyed(out: &mut Vec<Node>, candidate: Node) {
    push(out, candidate, false);
}

fn push(out: &mut Vec<Node>, candidate: Node, assign_keys: bool) {
    match candidate {
        Node::Empty | Node::Bool(_) => {}
        Node::Fragment(nodes) => {
            for node in nodes {
                push(out, node, assign_keys);
            }
        }
        Node::Element(mut el) => {
            if assign_keys && el.key.is_none() {
                el.key = Some(Key::Index(out.len()));
            }
            out.push(Node::Element(el));
        }
        other => out.push(other),
    }
}

/// Flattens `candidate` into a fresh sequence.
pub fn flatten(candidate: Node) -> Vec<Node> {
    let mut out = Vec::new();
    append(&mut out, candidate);
    out
}
