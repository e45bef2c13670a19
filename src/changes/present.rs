use crate::changes::TypeTag;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// One changelog section: every message of a single type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTypeEntry {
    pub name: String,
    pub tag: TypeTag,
    pub order: usize,
    pub messages: Vec<String>,
}

/// Human label for a type tag
pub fn display_name(tag: &TypeTag) -> String {
    if tag.as_str() == "feat" {
        return "Feature".to_string();
    }

    let mut name = String::with_capacity(tag.as_str().len());
    let mut at_word_start = true;
    for c in tag.as_str().chars() {
        if at_word_start {
            name.extend(c.to_uppercase());
        } else {
            name.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    name
}

fn make_entry(order: &[TypeTag], tag: &TypeTag, messages: &[String]) -> CommitTypeEntry {
    CommitTypeEntry {
        name: display_name(tag),
        tag: tag.clone(),
        order: order.iter().position(|t| t == tag).unwrap_or(order.len()),
        messages: messages.to_vec(),
    }
}

/// Sections for every type in `commits`, sorted by position in `order`
///
/// Types missing from `order` share one rank after all listed types. Ties
/// are broken by display name.
pub fn commit_entries(
    order: &[TypeTag],
    commits: &BTreeMap<TypeTag, Vec<String>>,
) -> Vec<CommitTypeEntry> {
    let mut list: Vec<CommitTypeEntry> = commits
        .iter()
        .map(|(tag, messages)| make_entry(order, tag, messages))
        .collect();

    list.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

    list
}

/// Render sections as a plain-text changelog
///
/// Each message loses one trailing newline; continuation lines are indented
/// under their bullet. Every section is followed by a blank line.
pub fn write_changelog<W: Write>(out: &mut W, entries: &[CommitTypeEntry]) -> io::Result<()> {
    for section in entries {
        writeln!(out, "{}:", section.name)?;

        for message in &section.messages {
            let message = message.strip_suffix('\n').unwrap_or(message);
            writeln!(out, "   * {}", message.replace('\n', "\n     "))?;
        }

        writeln!(out)?;
    }

    Ok(())
}
