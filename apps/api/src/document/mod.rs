// Canonical document model: schema types, collaborator-output normalization,
// and the immutable generated artifact.

pub mod normalize;
pub mod schema;

pub use normalize::{ats_score, normalize, normalize_template};
pub use schema::{
    ArtifactSnapshot, GeneratedArtifact, ResumeContent, SectionId, TemplateStructure,
};
