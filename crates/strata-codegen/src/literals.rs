// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! String literals destined for `.data`.

/// Every string literal gets its own label, in first-seen order.
/// Equal strings are not merged.
#[derive(Debug, Default)]
pub(crate) struct StringTable {
    entries: Vec<(String, String)>,
}

impl StringTable {
    /// Record `content` and return the label it will live under.
    pub fn add(&mut self, content: &str) -> String {
        let label = format!("lit_{}", self.entries.len());
        self.entries.push((label.clone(), content.to_string()));
        label
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `label: db b0, b1, ..., 0` lines.
    pub fn data_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|(label, content)| {
            let bytes: Vec<String> = content
                .bytes()
                .chain(std::iter::once(0))
                .map(|b| b.to_string())
                .collect();
            format!("{label}: db {}", bytes.join(", "))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_get_their_own_labels() {
        let mut table = StringTable::default();
        assert_eq!(table.add("hi"), "lit_0");
        assert_eq!(table.add("hi"), "lit_1");
        assert_eq!(table.add(""), "lit_2");
        let lines: Vec<String> = table.data_lines().collect();
        assert_eq!(lines, ["lit_0: db 104, 105, 0", "lit_1: db 104, 105, 0", "lit_2: db 0"]);
    }
}
