//! End-to-end lead searches through the orchestrator and the standard
//! pipeline, against MockProvider and MockPageFetcher. No network.

use std::path::Path;
use std::sync::Arc;

use leadfinder_common::{GeoScope, RunStatus, SearchRequest, SocialNetwork};
use leadfinder_scout::orchestrator::{InMemoryRunStore, Orchestrator};
use leadfinder_scout::pipeline::{PipelineDeps, PipelineRunner};
use leadfinder_scout::testing::{candidate, CandidateBuilder, MockPageFetcher, MockProvider};

const VANCOUVER: (f64, f64) = (49.2827, -123.1207);

fn orchestrator(
    provider: Arc<MockProvider>,
    fetcher: Arc<MockPageFetcher>,
    export_dir: &Path,
) -> Orchestrator {
    let deps = PipelineDeps::builder()
        .provider(provider)
        .fetcher(fetcher)
        .export_dir(export_dir.to_path_buf())
        .build();
    Orchestrator::new(PipelineRunner::standard(deps), Arc::new(InMemoryRunStore::new()))
}

fn coffee_request(target_count: u32) -> SearchRequest {
    SearchRequest::new(
        "coffee shop",
        GeoScope::circle(VANCOUVER.0, VANCOUVER.1, 5.0),
        target_count,
    )
}

#[tokio::test]
async fn coffee_shop_search_ranks_scores_and_exports() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::new().on_page(
        None,
        vec![
            CandidateBuilder::new("first")
                .name("Acme Coffee")
                .address("")
                .website("https://acme.example")
                .phone("604-555-0100")
                .build(),
            CandidateBuilder::new("second").name("Plain Beans").address("").build(),
        ],
        None,
    ));
    let fetcher = Arc::new(MockPageFetcher::new().on_page(
        "https://acme.example",
        200,
        r#"<footer><a href="https://www.instagram.com/acme">Instagram</a></footer>"#,
    ));
    let orch = orchestrator(provider.clone(), fetcher, tmp.path());

    let request = coffee_request(2);
    let accepted = orch.submit(&request).await.unwrap();
    let ctx = orch.run(&accepted.search_id, request).await.unwrap();

    // Results
    let scores: Vec<f64> = ctx.results.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![5.0, 0.0]);
    assert_eq!(ctx.results[0].business_key, "google_places:first");
    assert_eq!(ctx.results[1].business_key, "google_places:second");
    assert_eq!(
        ctx.results[0].socials[&SocialNetwork::Instagram],
        "https://www.instagram.com/acme"
    );
    assert_eq!(ctx.results[0].social_confidence, 0.95);
    assert!(ctx.errors.is_empty());

    // The provider saw the caller's circle
    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "coffee shop");
    assert_eq!(calls[0].anchor.center_lat, VANCOUVER.0);
    assert_eq!(calls[0].anchor.radius_km, 5.0);
    assert_eq!(calls[0].anchor.quota, 2);

    // Status
    let status = orch.status(&accepted.search_id).await.unwrap().unwrap();
    assert_eq!(status.status, RunStatus::Completed);
    assert_eq!(status.progress["anchors_total"], 1);
    assert_eq!(status.progress["candidates_unique"], 2);
    assert_eq!(status.budget_usage["website_fetches_used"], 1);
    assert_eq!(status.budget_usage["website_fetches_cap"], 400);
    assert_eq!(status.summary["lead_count_ready"], 2.0);
    assert_eq!(status.summary["leads_with_socials"], 1.0);
    assert_eq!(status.summary["mean_score"], 2.5);

    // Export artifact
    let path = &ctx.export_paths["json"];
    assert_eq!(path, &tmp.path().join(format!("{}.json", accepted.search_id)));
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    let results = doc["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["score_breakdown"]["website"], 3.0);
    assert_eq!(results[0]["socials"]["instagram"], "https://www.instagram.com/acme");
    assert_eq!(results[1]["needs_review"], false);
}

#[tokio::test]
async fn duplicates_across_pages_collapse_before_scoring() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(
        MockProvider::new()
            .on_page(None, vec![candidate("a"), candidate("b")], Some("page-2"))
            .on_page(Some("page-2"), vec![candidate("b"), candidate("c")], None),
    );
    let orch = orchestrator(provider, Arc::new(MockPageFetcher::new()), tmp.path());

    let request = coffee_request(10);
    let accepted = orch.submit(&request).await.unwrap();
    let ctx = orch.run(&accepted.search_id, request).await.unwrap();

    assert_eq!(ctx.candidates_discovered, 4);
    let keys: Vec<_> = ctx.results.iter().map(|r| r.business_key.as_str()).collect();
    assert_eq!(keys, vec!["google_places:a", "google_places:b", "google_places:c"]);
}

#[tokio::test]
async fn provider_failure_fails_the_run_without_export() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(
        MockProvider::new()
            .on_page(None, vec![candidate("a")], Some("page-2"))
            .fail_on_call(1),
    );
    let orch = orchestrator(provider, Arc::new(MockPageFetcher::new()), tmp.path());

    let request = coffee_request(10);
    let accepted = orch.submit(&request).await.unwrap();
    let err = orch.run(&accepted.search_id, request).await.unwrap_err();

    assert!(format!("{err:#}").contains("stage 'discover' failed"));
    let status = orch.status(&accepted.search_id).await.unwrap().unwrap();
    assert_eq!(status.status, RunStatus::Failed);
    assert!(status.error.unwrap().contains("mock provider failure"));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn website_budget_counts_completed_fetches_only() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::new().on_page(
        None,
        vec![
            CandidateBuilder::new("down").website("https://down.example").build(),
            CandidateBuilder::new("gone").website("https://gone.example").build(),
            CandidateBuilder::new("third").website("https://third.example").build(),
        ],
        None,
    ));
    let fetcher = Arc::new(
        MockPageFetcher::new()
            .on_connect_error("https://down.example")
            .on_page("https://gone.example", 404, "")
            .on_page("https://third.example", 200, r#"<a href="https://x.com/third">x</a>"#),
    );
    let orch = orchestrator(provider, fetcher.clone(), tmp.path());

    let mut request = coffee_request(10);
    request.options.website_fetch_cap = Some(2);
    let accepted = orch.submit(&request).await.unwrap();
    let ctx = orch.run(&accepted.search_id, request).await.unwrap();

    // The failed connection left room for the third site under a cap of 2.
    assert_eq!(fetcher.calls().len(), 3);
    assert_eq!(ctx.budget_usage.website_fetches_used, 2);
    assert_eq!(ctx.budget_usage.website_fetches_cap, 2);
    assert_eq!(ctx.results[2].socials[&SocialNetwork::X], "https://x.com/third");
    assert!(ctx.results[0].socials.is_empty());
}

#[tokio::test]
async fn endless_pagination_terminates_at_target() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::endless(3));
    let orch = orchestrator(provider.clone(), Arc::new(MockPageFetcher::new()), tmp.path());

    let request = coffee_request(7);
    let accepted = orch.submit(&request).await.unwrap();
    let ctx = orch.run(&accepted.search_id, request).await.unwrap();

    assert_eq!(provider.calls().len(), 3);
    assert_eq!(ctx.candidates_discovered, 9);
    assert_eq!(ctx.results.len(), 7);
}

#[tokio::test]
async fn missing_circle_uses_fallback_anchor() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::new());
    let orch = orchestrator(provider.clone(), Arc::new(MockPageFetcher::new()), tmp.path());

    let request = SearchRequest::new("bakery", GeoScope::default(), 3);
    let accepted = orch.submit(&request).await.unwrap();
    orch.run(&accepted.search_id, request).await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].anchor.center_lat, 49.2827);
    assert_eq!(calls[0].anchor.center_lng, -123.1207);
    assert_eq!(calls[0].anchor.radius_km, 30.0);
}
