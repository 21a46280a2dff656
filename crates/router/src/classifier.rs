//! Command classification.

/// Extract the routing key of a command.
///
/// The command is trimmed, split on the first `:` or whitespace character, and
/// the left-hand segment is returned lower-cased. A command without a
/// separator is its own base. Empty commands are rejected by validation
/// before classification, so this function never fails.
pub fn base_of(command: &str) -> String {
    let trimmed = command.trim();
    let end = trimmed
        .find(|character: char| character == ':' || character.is_whitespace())
        .unwrap_or(trimmed.len());
    trimmed[..end].to_lowercase()
}
