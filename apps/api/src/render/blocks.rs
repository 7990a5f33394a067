use serde::Serialize;

use crate::document::SectionId;

/// Format-agnostic rendering unit. Both backends are driven from the same
/// block sequence, so they cannot disagree on structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Block {
    /// Section heading. Backends apply their own casing and emphasis.
    Heading(String),
    /// Body text.
    Paragraph(String),
    /// Bold entry line such as `Role — Company` or an institution name.
    KeyValueLine(String),
    BulletList(Vec<String>),
}

/// Blocks for one rendered section, heading first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBlocks {
    pub section: SectionId,
    pub blocks: Vec<Block>,
}
