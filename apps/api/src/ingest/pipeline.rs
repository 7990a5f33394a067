//! Sync pipeline: list → rank → enrich (concurrent) → dedup → synthesize.
//!
//! Enrichment and synthesis fan out on a `JoinSet`. Every task carries its
//! ranked index, results land in an index-addressed slot vector, and the output
//! is read back in rank order, so completion order never leaks into the result.
//!
//! Failures of optional calls (readme, languages, bullet synthesis) are logged
//! and collapsed into empty values. Only the initial listing is fatal.
//!
//! Dropping the returned future aborts every in-flight task (the `JoinSet`
//! aborts on drop) and nothing has been persisted at that point.
//!
//! The dedup set is a snapshot taken by the caller before the sync starts.
//! Two overlapping syncs for one user can both decide to import the same URL;
//! the storage layer's unique `(user_id, external_url)` constraint discards the
//! second insert.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{info, warn};

use super::{RepoMetadataSource, RepoSourceError, RepoSummary};
use crate::errors::AppError;
use crate::models::project::{NewProject, OriginRef, ProjectSource};
use crate::text_gen::{BulletSynthesis, ProjectFacts, TextGenerator};

pub const DEFAULT_CANDIDATE_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    /// How many top-ranked repositories are enriched.
    pub candidate_limit: usize,
    /// Bound applied to every outbound call.
    pub call_timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            call_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
struct EnrichedRepo {
    repo: RepoSummary,
    readme: Option<String>,
    languages: Vec<String>,
}

impl EnrichedRepo {
    fn bare(repo: RepoSummary) -> Self {
        Self {
            repo,
            readme: None,
            languages: Vec::new(),
        }
    }
}

/// Stars descending, then most recently updated. Stable for full ties.
pub fn rank_candidates(mut repos: Vec<RepoSummary>, limit: usize) -> Vec<RepoSummary> {
    repos.sort_by(|a, b| {
        b.stars
            .cmp(&a.stars)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    repos.truncate(limit);
    repos
}

/// Runs one sync for `account` and returns the new project drafts in rank order.
pub async fn sync(
    source: Arc<dyn RepoMetadataSource>,
    text_gen: Arc<dyn TextGenerator>,
    credential: &str,
    account: &str,
    existing_urls: &HashSet<String>,
    settings: SyncSettings,
) -> Result<Vec<NewProject>, AppError> {
    let listed = bounded(settings.call_timeout, source.list_owned_repos(credential))
        .await
        .map_err(|e| {
            AppError::CollaboratorUnavailable(format!("listing repositories failed: {e}"))
        })?;
    let listed_count = listed.len();

    let candidates = rank_candidates(listed, settings.candidate_limit);
    info!(
        "GitHub sync for {account}: {listed_count} repos listed, {} candidates",
        candidates.len()
    );

    let enriched = enrich_all(&source, credential, account, candidates, settings).await;

    let mut seen = HashSet::new();
    let fresh: Vec<EnrichedRepo> = enriched
        .into_iter()
        .filter(|e| !existing_urls.contains(&e.repo.url) && seen.insert(e.repo.url.clone()))
        .collect();

    let projects = synthesize_all(&text_gen, fresh, settings).await;
    info!("GitHub sync for {account}: {} new projects", projects.len());
    Ok(projects)
}

async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, RepoSourceError>
where
    F: Future<Output = Result<T, RepoSourceError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(RepoSourceError::Timeout(limit.as_secs())))
}

// ────────────────────────────────────────────────────────────────────────────
// Enrichment fan-out
// ────────────────────────────────────────────────────────────────────────────

async fn enrich_all(
    source: &Arc<dyn RepoMetadataSource>,
    credential: &str,
    account: &str,
    candidates: Vec<RepoSummary>,
    settings: SyncSettings,
) -> Vec<EnrichedRepo> {
    let mut tasks = JoinSet::new();
    for (idx, repo) in candidates.iter().cloned().enumerate() {
        let source = Arc::clone(source);
        let credential = credential.to_string();
        let account = account.to_string();
        tasks.spawn(async move {
            let (readme, languages) = tokio::join!(
                bounded(
                    settings.call_timeout,
                    source.fetch_readme_excerpt(&credential, &account, &repo.name),
                ),
                bounded(
                    settings.call_timeout,
                    source.fetch_language_breakdown(&credential, &account, &repo.name),
                ),
            );

            let readme = readme.unwrap_or_else(|e| {
                warn!("readme unavailable for {}: {e}", repo.name);
                None
            });
            let languages = languages.unwrap_or_else(|e| {
                warn!("languages unavailable for {}: {e}", repo.name);
                Vec::new()
            });
            (idx, EnrichedRepo { repo, readme, languages })
        });
    }

    let mut slots: Vec<Option<EnrichedRepo>> = vec![None; candidates.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, enriched)) => slots[idx] = Some(enriched),
            Err(e) => warn!("enrichment task failed: {e}"),
        }
    }

    // A task that panicked still yields its candidate, unenriched.
    slots
        .into_iter()
        .zip(candidates)
        .map(|(slot, repo)| slot.unwrap_or_else(|| EnrichedRepo::bare(repo)))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Bullet synthesis fan-out
// ────────────────────────────────────────────────────────────────────────────

fn facts_for(enriched: &EnrichedRepo) -> ProjectFacts {
    ProjectFacts {
        title: enriched.repo.name.clone(),
        tech_stack: enriched.languages.clone(),
        description: enriched.repo.description.clone().unwrap_or_default(),
        readme: enriched.readme.clone(),
        stars: enriched.repo.stars,
        forks: enriched.repo.forks,
    }
}

fn to_project(enriched: EnrichedRepo, synthesis: BulletSynthesis) -> NewProject {
    let EnrichedRepo {
        repo,
        readme,
        languages,
    } = enriched;
    let description = if synthesis.description.is_empty() {
        repo.description.clone().unwrap_or_default()
    } else {
        synthesis.description
    };

    NewProject {
        title: repo.name,
        tech_stack: languages.clone(),
        description,
        impact: String::new(),
        bullets: synthesis.bullets,
        source: ProjectSource::Imported,
        origin: Some(OriginRef {
            external_url: repo.url,
            star_count: repo.stars,
            fork_count: repo.forks,
            primary_languages: languages,
            readme_excerpt: readme,
            last_updated_at: repo.updated_at,
        }),
    }
}

async fn synthesize_all(
    text_gen: &Arc<dyn TextGenerator>,
    fresh: Vec<EnrichedRepo>,
    settings: SyncSettings,
) -> Vec<NewProject> {
    let mut tasks = JoinSet::new();
    for (idx, enriched) in fresh.iter().enumerate() {
        let text_gen = Arc::clone(text_gen);
        let facts = facts_for(enriched);
        tasks.spawn(async move {
            let synthesis =
                match tokio::time::timeout(settings.call_timeout, text_gen.synthesize_bullets(&facts))
                    .await
                {
                    Ok(Ok(synthesis)) => synthesis.cleaned(),
                    Ok(Err(e)) => {
                        warn!("bullet synthesis failed for {}: {e}", facts.title);
                        BulletSynthesis::default()
                    }
                    Err(_) => {
                        warn!("bullet synthesis timed out for {}", facts.title);
                        BulletSynthesis::default()
                    }
                };
            (idx, synthesis)
        });
    }

    let mut slots: Vec<Option<BulletSynthesis>> = vec![None; fresh.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, synthesis)) => slots[idx] = Some(synthesis),
            Err(e) => warn!("synthesis task failed: {e}"),
        }
    }

    fresh
        .into_iter()
        .zip(slots)
        .map(|(enriched, synthesis)| to_project(enriched, synthesis.unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_gen::fake::FakeTextGenerator;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn repo(name: &str, stars: u32, day: u32) -> RepoSummary {
        RepoSummary {
            name: name.to_string(),
            description: Some(format!("{name} repo")),
            url: format!("https://github.com/octo/{name}"),
            language: Some("Rust".to_string()),
            stars,
            forks: 0,
            updated_at: ts(day),
        }
    }

    /// In-memory metadata source. Delays make later-ranked repos finish first.
    #[derive(Default)]
    struct FakeSource {
        repos: Vec<RepoSummary>,
        failing_languages: HashSet<String>,
        failing_readmes: HashSet<String>,
        delays_ms: HashMap<String, u64>,
        /// Language fetches that never answer.
        hanging_languages: HashSet<String>,
        list_fails: bool,
        finished_readmes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RepoMetadataSource for FakeSource {
        async fn list_owned_repos(&self, _c: &str) -> Result<Vec<RepoSummary>, RepoSourceError> {
            if self.list_fails {
                return Err(RepoSourceError::Status {
                    status: 500,
                    path: "/user/repos".into(),
                });
            }
            Ok(self.repos.clone())
        }

        async fn fetch_readme_excerpt(
            &self,
            _c: &str,
            _owner: &str,
            name: &str,
        ) -> Result<Option<String>, RepoSourceError> {
            if let Some(ms) = self.delays_ms.get(name) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.finished_readmes.fetch_add(1, Ordering::SeqCst);
            if self.failing_readmes.contains(name) {
                return Err(RepoSourceError::Decode("bad".into()));
            }
            Ok(Some(format!("# {name}")))
        }

        async fn fetch_language_breakdown(
            &self,
            _c: &str,
            _owner: &str,
            name: &str,
        ) -> Result<Vec<String>, RepoSourceError> {
            if self.hanging_languages.contains(name) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.failing_languages.contains(name) {
                return Err(RepoSourceError::Status {
                    status: 502,
                    path: format!("/repos/octo/{name}/languages"),
                });
            }
            Ok(vec!["Rust".to_string(), "Shell".to_string()])
        }
    }

    async fn run(
        source: FakeSource,
        text_gen: FakeTextGenerator,
        existing: &HashSet<String>,
    ) -> Result<Vec<NewProject>, AppError> {
        sync(
            Arc::new(source),
            Arc::new(text_gen),
            "tok",
            "octo",
            existing,
            SyncSettings::default(),
        )
        .await
    }

    #[test]
    fn test_rank_by_stars_then_recency() {
        let ranked = rank_candidates(
            vec![
                repo("five", 5, 1),
                repo("twenty-new", 20, 9),
                repo("twenty-old", 20, 3),
                repo("zero", 0, 20),
            ],
            20,
        );
        let names: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["twenty-new", "twenty-old", "five", "zero"]);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let repos = (0..30).map(|i| repo(&format!("r{i}"), i, 1)).collect();
        let ranked = rank_candidates(repos, 20);
        assert_eq!(ranked.len(), 20);
        assert_eq!(ranked[0].name, "r29");
        assert_eq!(ranked[19].name, "r10");
    }

    #[tokio::test]
    async fn test_language_failure_degrades_one_candidate() {
        let source = FakeSource {
            repos: (0..20).map(|i| repo(&format!("r{i}"), i, 1)).collect(),
            failing_languages: HashSet::from(["r7".to_string()]),
            ..Default::default()
        };
        let projects = run(source, FakeTextGenerator::new(), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(projects.len(), 20);
        for p in &projects {
            if p.title == "r7" {
                assert!(p.tech_stack.is_empty());
            } else {
                assert_eq!(p.tech_stack, vec!["Rust", "Shell"]);
            }
        }
    }

    #[tokio::test]
    async fn test_readme_failure_keeps_candidate() {
        let source = FakeSource {
            repos: vec![repo("a", 1, 1)],
            failing_readmes: HashSet::from(["a".to_string()]),
            ..Default::default()
        };
        let projects = run(source, FakeTextGenerator::new(), &HashSet::new())
            .await
            .unwrap();
        let origin = projects[0].origin.as_ref().unwrap();
        assert_eq!(origin.readme_excerpt, None);
        assert_eq!(origin.primary_languages, vec!["Rust", "Shell"]);
    }

    #[tokio::test]
    async fn test_order_follows_rank_not_completion() {
        let source = FakeSource {
            repos: vec![repo("slow-top", 50, 1), repo("mid", 10, 1), repo("fast-low", 1, 1)],
            delays_ms: HashMap::from([("slow-top".to_string(), 80), ("mid".to_string(), 40)]),
            ..Default::default()
        };
        let projects = run(source, FakeTextGenerator::new(), &HashSet::new())
            .await
            .unwrap();
        let titles: Vec<_> = projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["slow-top", "mid", "fast-low"]);
    }

    #[tokio::test]
    async fn test_existing_urls_are_skipped() {
        let source = FakeSource {
            repos: vec![repo("a", 3, 1), repo("b", 2, 1)],
            ..Default::default()
        };
        let existing = HashSet::from(["https://github.com/octo/a".to_string()]);
        let projects = run(source, FakeTextGenerator::new(), &existing).await.unwrap();
        let titles: Vec<_> = projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["b"]);
    }

    #[tokio::test]
    async fn test_second_sync_imports_nothing() {
        let repos = vec![repo("a", 3, 1), repo("b", 2, 1), repo("c", 1, 1)];
        let first = run(
            FakeSource {
                repos: repos.clone(),
                ..Default::default()
            },
            FakeTextGenerator::new(),
            &HashSet::new(),
        )
        .await
        .unwrap();
        assert_eq!(first.len(), 3);

        let imported: HashSet<String> = first
            .iter()
            .filter_map(|p| p.external_url().map(str::to_string))
            .collect();
        let second = run(
            FakeSource {
                repos,
                ..Default::default()
            },
            FakeTextGenerator::new(),
            &imported,
        )
        .await
        .unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_urls_in_listing_import_once() {
        let mut dup = repo("a", 1, 1);
        dup.name = "a-mirror".to_string();
        let source = FakeSource {
            repos: vec![repo("a", 5, 1), dup],
            ..Default::default()
        };
        let projects = run(source, FakeTextGenerator::new(), &HashSet::new())
            .await
            .unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "a");
    }

    #[tokio::test]
    async fn test_synthesis_failure_imports_with_empty_bullets() {
        let source = FakeSource {
            repos: vec![repo("a", 2, 1), repo("b", 1, 1)],
            ..Default::default()
        };
        let projects = run(
            source,
            FakeTextGenerator::new().failing_for("a"),
            &HashSet::new(),
        )
        .await
        .unwrap();

        assert_eq!(projects.len(), 2);
        assert!(projects[0].bullets.is_empty());
        assert_eq!(projects[0].description, "a repo");
        assert_eq!(projects[1].bullets, vec!["Built b"]);
        assert_eq!(projects[1].description, "b description");
    }

    #[tokio::test]
    async fn test_synthesis_skipped_for_deduped_candidates() {
        let text_gen = Arc::new(FakeTextGenerator::new());
        let source = FakeSource {
            repos: vec![repo("a", 2, 1), repo("b", 1, 1)],
            ..Default::default()
        };
        let existing = HashSet::from(["https://github.com/octo/a".to_string()]);
        let projects = sync(
            Arc::new(source),
            text_gen.clone(),
            "tok",
            "octo",
            &existing,
            SyncSettings::default(),
        )
        .await
        .unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(text_gen.synthesis_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let source = FakeSource {
            list_fails: true,
            ..Default::default()
        };
        let err = run(source, FakeTextGenerator::new(), &HashSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CollaboratorUnavailable(_)));
    }

    #[tokio::test]
    async fn test_imported_origin_is_populated() {
        let source = FakeSource {
            repos: vec![repo("a", 4, 2)],
            ..Default::default()
        };
        let projects = run(source, FakeTextGenerator::new(), &HashSet::new())
            .await
            .unwrap();
        let p = &projects[0];
        assert_eq!(p.source, ProjectSource::Imported);
        let origin = p.origin.as_ref().unwrap();
        assert_eq!(origin.external_url, "https://github.com/octo/a");
        assert_eq!(origin.star_count, 4);
        assert_eq!(origin.readme_excerpt.as_deref(), Some("# a"));
        assert_eq!(origin.last_updated_at, ts(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_language_fetch_times_out_alone() {
        let mut repos: Vec<_> = (0..19).map(|i| repo(&format!("r{i}"), i, 1)).collect();
        repos.push(repo("hang", 100, 1));
        let source = FakeSource {
            repos,
            hanging_languages: HashSet::from(["hang".to_string()]),
            ..Default::default()
        };
        let projects = run(source, FakeTextGenerator::new(), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(projects.len(), 20);
        assert_eq!(projects[0].title, "hang");
        assert!(projects[0].tech_stack.is_empty());
        assert_eq!(
            projects[0].origin.as_ref().unwrap().readme_excerpt.as_deref(),
            Some("# hang")
        );
        for p in &projects[1..] {
            assert_eq!(p.tech_stack, vec!["Rust", "Shell"]);
        }
        let titles: Vec<_> = projects[1..].iter().map(|p| p.title.clone()).collect();
        let expected: Vec<_> = (0..19).rev().map(|i| format!("r{i}")).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sync_abandons_in_flight_work() {
        let finished = Arc::new(AtomicUsize::new(0));
        let source = FakeSource {
            repos: vec![repo("a", 2, 1), repo("b", 1, 1)],
            delays_ms: HashMap::from([("a".to_string(), 5_000), ("b".to_string(), 5_000)]),
            finished_readmes: Arc::clone(&finished),
            ..Default::default()
        };
        let text_gen = Arc::new(FakeTextGenerator::new());
        let existing = HashSet::new();

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            sync(
                Arc::new(source),
                text_gen.clone(),
                "tok",
                "octo",
                &existing,
                SyncSettings::default(),
            ),
        )
        .await;
        assert!(outcome.is_err(), "sync must not finish while enrichment is in flight");

        // Past every delay: aborted tasks never resume.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(text_gen.synthesis_calls.load(Ordering::SeqCst), 0);
    }
}
