//! Batch input: one organization per line.
//!
//! ```text
//! # name<TAB>region<TAB>domain
//! Maywood School District 89	Illinois	maywood89.org
//! River Trails School District 26	Illinois
//! Springfield Public Schools
//! ```

/// One organization to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// 1-based line number in the input.
    pub line: usize,
    pub name: String,
    pub region: Option<String>,
    pub domain: Option<String>,
}

/// Parse batch input. Blank lines and `#` comments are skipped; empty
/// region or domain columns are absent.
pub fn parse_batch(content: &str) -> Vec<BatchEntry> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            let mut columns = line.split('\t').map(str::trim);
            let name = columns.next().unwrap_or_default().to_string();
            let mut optional = || {
                columns
                    .next()
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
            };
            let region = optional();
            let domain = optional();
            BatchEntry {
                line: index + 1,
                name,
                region,
                domain,
            }
        })
        .collect()
}
