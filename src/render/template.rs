//! Placeholder substitution for `{name}` templates

/// Replaces `{name}` placeholders in a single left-to-right pass.
///
/// `lookup` returns the value for a known name. Unknown placeholders, and
/// braces that do not form a placeholder, are copied through unchanged.
/// Substituted values are never scanned again.
pub fn substitute<'v, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'v str>,
{
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let placeholder = after_open
            .find('}')
            .map(|close| (&after_open[..close], close))
            .filter(|(name, _)| is_placeholder_name(name));

        match placeholder {
            Some((name, close)) => {
                match lookup(name) {
                    Some(value) => output.push_str(value),
                    None => output.push_str(&rest[open..open + close + 2]),
                }
                rest = &after_open[close + 1..];
            }
            None => {
                output.push('{');
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
