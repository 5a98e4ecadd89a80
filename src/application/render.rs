//! Text rendering for generated output: metadata table and tree preview.

use std::borrow::Cow;

use itertools::Itertools;
use termtree::Tree;

use crate::domain::{format_length, MetadataRecord, NodeKind, TreeNode, METADATA_COLUMNS};

/// Row terminator for the metadata table (RFC 4180).
pub const LINE_TERMINATOR: &str = "\r\n";

/// Quote a field if it contains a delimiter, quote or line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn render_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = fields.into_iter().map(escape_field).join(",");
    line.push_str(LINE_TERMINATOR);
    line
}

/// Header plus one comma-separated row per record, in record order.
pub fn render_metadata_csv(records: &[MetadataRecord]) -> String {
    let mut out = render_row(METADATA_COLUMNS);
    for record in records {
        let fields = record.fields();
        out.push_str(&render_row(fields.iter().map(String::as_str)));
    }
    out
}

/// Indented tree view; leaves as `name (length)`, branch points as their length.
pub fn tree_preview(node: &TreeNode) -> Tree<String> {
    match &node.kind {
        NodeKind::Leaf { name } => Tree::new(format!("{} ({})", name, format_length(node.length))),
        NodeKind::Internal { children } => Tree::new(format!("+ ({})", format_length(node.length)))
            .with_leaves(children.iter().map(tree_preview)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::COLLECTION_END;

    fn record(id: &str, city: &'static str) -> MetadataRecord {
        MetadataRecord {
            sample_id: id.to_string(),
            collection_date: COLLECTION_END,
            city,
            country: "Brazil",
            sample_type: "blood",
            antimicrobial_resistance: "high",
            strain: "ST42".to_string(),
            host: "wildlife",
            lineage: "L4.1".to_string(),
            clade: "D".to_string(),
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Sao Paulo"), "Sao Paulo");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn given_records_when_rendering_then_header_then_rows_in_order() {
        let csv = render_metadata_csv(&[record("S001", "Sao Paulo"), record("S002", "Tokyo")]);
        let lines: Vec<&str> = csv.split(LINE_TERMINATOR).collect();

        assert_eq!(
            lines[0],
            "sample_id,collection_date,city,country,sample_type,antimicrobial_resistance,strain,host,lineage,clade"
        );
        assert_eq!(lines[1], "S001,2024-12-31,Sao Paulo,Brazil,blood,high,ST42,wildlife,L4.1,D");
        assert!(lines[2].starts_with("S002,"));
        assert_eq!(lines[3], "");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn given_tree_when_previewing_then_lists_every_leaf() {
        let tree = TreeNode::internal(TreeNode::leaf("S001", 0.1), TreeNode::leaf("S002", 0.25), 0.05);
        let text = tree_preview(&tree).to_string();
        assert!(text.starts_with("+ (0.05)"));
        assert!(text.contains("S001 (0.1)"));
        assert!(text.contains("S002 (0.25)"));
    }
}
