use crate::node::Props;
use crate::token::Token;

/// Converts a token's attribute pairs into a property record.
///
/// A later pair overwrites an earlier pair with the same name.
pub fn get_attrs(token: &Token) -> Props {
    token
        .attrs
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
