//! Tailored resume generation: a base resume plus a job description become an
//! immutable generated artifact, exportable as PDF or DOCX.

pub mod generator;
pub mod handlers;
pub mod store;
