//! cssval test utilities
//!
//! Deterministic JSON rendering so that expected and actual values can be
//! compared as text and diffed line by line.

use std::cmp::Ordering;

use serde_json::Value;

/// Containers that fit within this many columns are rendered on one line
const LINE_WIDTH: usize = 80;

/// Render `value` with object keys ordered by `cmp`.
///
/// Arrays and objects that fit on the current line are printed compactly;
/// otherwise each element gets its own line, indented two spaces more than
/// the parent. `offset` is the indentation the output starts at.
pub fn render_json(value: &Value, cmp: &dyn Fn(&str, &str) -> Ordering, offset: usize) -> String {
    Renderer { cmp }.render(value, offset, offset)
}

/// Plain lexicographic key order
pub fn default_cmp_fn(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Key order that puts `keys` first, in the order given, followed by all
/// other keys alphabetically
pub fn make_json_key_cmp_fn(keys: &[&str]) -> impl Fn(&str, &str) -> Ordering {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    move |a: &str, b: &str| {
        let rank = |key: &str| keys.iter().position(|k| k == key);
        match (rank(a), rank(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }
}

struct Renderer<'c> {
    cmp: &'c dyn Fn(&str, &str) -> Ordering,
}

impl Renderer<'_> {
    /// `indent` is the indentation of the line the value starts on, `column`
    /// the column the value itself starts at
    fn render(&self, value: &Value, indent: usize, column: usize) -> String {
        match value {
            Value::Array(items) if !items.is_empty() => {
                let compact = self.compact(value);
                if column + compact.chars().count() <= LINE_WIDTH {
                    return compact;
                }
                let child_indent = indent + 2;
                let lines: Vec<String> = items
                    .iter()
                    .map(|item| {
                        format!(
                            "{}{}",
                            " ".repeat(child_indent),
                            self.render(item, child_indent, child_indent)
                        )
                    })
                    .collect();
                format!("[\n{}\n{}]", lines.join(",\n"), " ".repeat(indent))
            }
            Value::Object(map) if !map.is_empty() => {
                let compact = self.compact(value);
                if column + compact.chars().count() <= LINE_WIDTH {
                    return compact;
                }
                let child_indent = indent + 2;
                let lines: Vec<String> = self
                    .sorted_entries(map)
                    .into_iter()
                    .map(|(key, item)| {
                        let key = format!("{}: ", Value::from(key.as_str()));
                        let item_column = child_indent + key.chars().count();
                        format!(
                            "{}{}{}",
                            " ".repeat(child_indent),
                            key,
                            self.render(item, child_indent, item_column)
                        )
                    })
                    .collect();
                format!("{{\n{}\n{}}}", lines.join(",\n"), " ".repeat(indent))
            }
            _ => self.compact(value),
        }
    }

    fn compact(&self, value: &Value) -> String {
        match value {
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|item| self.compact(item)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Object(map) => {
                let entries: Vec<String> = self
                    .sorted_entries(map)
                    .into_iter()
                    .map(|(key, item)| format!("{}: {}", Value::from(key.as_str()), self.compact(item)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            scalar => scalar.to_string(),
        }
    }

    fn sorted_entries<'v>(&self, map: &'v serde_json::Map<String, Value>) -> Vec<(&'v String, &'v Value)> {
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|(a, _), (b, _)| (self.cmp)(a.as_str(), b.as_str()));
        entries
    }
}
