//! Shared test fixtures for the rendering pipeline.

use crate::document::schema::{
    CertificationEntry, EducationEntry, ExperienceEntry, ProjectEntry, ResumeContent, Skills,
};

pub fn full_content() -> ResumeContent {
    ResumeContent {
        summary: "Systems engineer focused on storage.".to_string(),
        education: vec![EducationEntry {
            institution: "ETH Zürich".to_string(),
            degree: "MSc".to_string(),
            field: "Computer Science".to_string(),
            start_date: "2016".to_string(),
            end_date: "2018".to_string(),
            gpa: "5.6".to_string(),
            details: String::new(),
        }],
        experience: vec![ExperienceEntry {
            company: "Acme".to_string(),
            role: "Staff Engineer".to_string(),
            start_date: "2019".to_string(),
            end_date: "Present".to_string(),
            location: "Remote".to_string(),
            bullets: vec!["Cut p99 latency by 40%".to_string(), "  ".to_string()],
        }],
        skills: Skills {
            technical: vec!["Rust".to_string(), "Go".to_string()],
            soft: vec!["Mentoring".to_string()],
            languages: vec![],
            tools: vec!["Kubernetes".to_string()],
        },
        projects: vec![ProjectEntry {
            title: "vitae".to_string(),
            tech_stack: vec!["Rust".to_string()],
            description: "Resume tailoring service".to_string(),
            bullets: vec!["Rendered PDF and DOCX from one block stream".to_string()],
        }],
        certifications: vec![CertificationEntry {
            name: "CKA".to_string(),
            issuer: "CNCF".to_string(),
            date: "2022".to_string(),
        }],
        achievements: vec!["Speaker at RustConf".to_string()],
    }
}
