use std::sync::Once;

use async_trait::async_trait;
use serde_json::json;

use lightbox_delegate::builtin::{FixtureDelegate, NoopDelegate};
use lightbox_delegate::{
    AuthVerdict, Delegate, DelegateConfig, DelegateError, DelegateRunner, HookResult,
    RequestContext, ResourceLocator,
};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

fn runner() -> DelegateRunner {
    init_tracing();
    DelegateRunner::default()
}

#[tokio::test]
async fn unmatched_identifiers_are_allowed() {
    let runner = runner();
    for identifier in ["cats.jpg", "anything-else.tif", "jpeg.jpg"] {
        let ctx = RequestContext::new(identifier);
        let verdict = runner.authorize(&ctx, &FixtureDelegate).await.unwrap();
        assert_eq!(verdict, AuthVerdict::Allow, "identifier {identifier}");
    }
}

#[tokio::test]
async fn fixture_authorization_verdicts() {
    let runner = runner();

    let verdict = runner
        .authorize(&RequestContext::new("forbidden.jpg"), &FixtureDelegate)
        .await
        .unwrap();
    assert_eq!(verdict, AuthVerdict::Deny { status: 403 });

    let verdict = runner
        .authorize(&RequestContext::new("forbidden-code.jpg"), &FixtureDelegate)
        .await
        .unwrap();
    assert_eq!(
        verdict,
        AuthVerdict::Challenge {
            status: 401,
            scheme: "Basic".into()
        }
    );

    let verdict = runner
        .authorize(&RequestContext::new("redirect.jpg"), &FixtureDelegate)
        .await
        .unwrap();
    assert_eq!(
        verdict,
        AuthVerdict::Redirect {
            status: 303,
            location: "http://example.org/".into()
        }
    );

    let verdict = runner
        .authorize(&RequestContext::new("reduce.jpg"), &FixtureDelegate)
        .await
        .unwrap();
    assert_eq!(
        verdict,
        AuthVerdict::ScaledAllow {
            status: 302,
            numerator: 1,
            denominator: 2
        }
    );
}

#[tokio::test]
async fn authorization_is_deterministic_for_the_same_context() {
    let runner = runner();
    let ctx = RequestContext::new("redirect.jpg")
        .with_client_ip("10.0.0.1")
        .with_header("Accept", "image/jpeg");
    let first = runner.authorize(&ctx, &FixtureDelegate).await.unwrap();
    for _ in 0..5 {
        let again = runner.authorize(&ctx, &FixtureDelegate).await.unwrap();
        assert_eq!(again, first);
    }
}

#[tokio::test]
async fn concurrent_evaluations_share_only_the_runner() {
    let runner = std::sync::Arc::new(runner());
    let mut handles = Vec::new();
    for i in 0..16 {
        let runner = runner.clone();
        handles.push(tokio::spawn(async move {
            let identifier = if i % 2 == 0 { "forbidden.jpg" } else { "cats.jpg" };
            let ctx = RequestContext::new(identifier);
            (i, runner.authorize(&ctx, &FixtureDelegate).await.unwrap())
        }));
    }
    for handle in handles {
        let (i, verdict) = handle.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(verdict, AuthVerdict::Deny { status: 403 });
        } else {
            assert_eq!(verdict, AuthVerdict::Allow);
        }
    }
}

#[tokio::test]
async fn deny_status_comes_from_config() {
    init_tracing();
    let runner = DelegateRunner::new(DelegateConfig {
        deny_status: 451,
        ..DelegateConfig::default()
    });
    let verdict = runner
        .authorize(&RequestContext::new("forbidden.jpg"), &FixtureDelegate)
        .await
        .unwrap();
    assert_eq!(verdict, AuthVerdict::Deny { status: 451 });
}

#[tokio::test]
async fn source_selection_and_baseline_fallback() {
    let runner = runner();
    let delegate = FixtureDelegate;

    assert_eq!(
        runner
            .source(&RequestContext::new("http"), &delegate)
            .await
            .unwrap()
            .as_deref(),
        Some("http")
    );
    assert_eq!(
        runner
            .source(&RequestContext::new("bogus"), &delegate)
            .await
            .unwrap()
            .as_deref(),
        Some("filesystem")
    );
}

#[tokio::test]
async fn resolution_hooks_produce_locators_or_not_found() {
    let runner = runner();
    let delegate = FixtureDelegate;

    let missing = runner
        .filesystem_location(&RequestContext::new("missing"), &delegate)
        .await
        .unwrap();
    assert_eq!(missing, None);

    let pathname = runner
        .filesystem_location(&RequestContext::new("cats.jpg"), &delegate)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        pathname,
        ResourceLocator::Filesystem {
            pathname: "cats.jpg".into()
        }
    );

    let authed = runner
        .http_resource_info(
            &RequestContext::new("valid-auth-http://example.org/cats.jpg"),
            &delegate,
        )
        .await
        .unwrap()
        .unwrap();
    let ResourceLocator::Http(resource) = authed else {
        panic!("expected http locator");
    };
    assert_eq!(resource.uri, "http://example.org/cats.jpg");
    assert_eq!(resource.username.as_deref(), Some("user"));
    assert_eq!(resource.secret.as_deref(), Some("secret"));

    let object = runner
        .blobstore_object_info(&RequestContext::new("bucket:b;key:k"), &delegate)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        object,
        ResourceLocator::Blobstore {
            bucket: Some("b".into()),
            key: "k".into()
        }
    );

    let sql = runner
        .database_lookup_query(&RequestContext::new("cats.jpg"), &delegate)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        sql,
        ResourceLocator::Query {
            sql: "SELECT image FROM items WHERE filename = ?".into()
        }
    );
}

#[tokio::test]
async fn partial_credentials_are_a_contract_violation() {
    struct HalfCredentials;

    #[async_trait]
    impl Delegate for HalfCredentials {
        fn name(&self) -> &str {
            "half-credentials"
        }

        async fn http_resource_info(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
            HookResult::try_from(json!({
                "uri": "http://example.org/cats.jpg",
                "username": "user",
            }))
        }
    }

    let runner = runner();
    let err = runner
        .http_resource_info(&RequestContext::new("cats.jpg"), &HalfCredentials)
        .await
        .unwrap_err();
    assert!(err.is_contract_violation());
}

#[tokio::test]
async fn redactions_preserve_supplied_order_and_count() {
    let runner = runner();
    let delegate = FixtureDelegate;

    let none = runner
        .redactions(&RequestContext::new("bogus"), &delegate)
        .await
        .unwrap();
    assert!(none.is_empty());

    let empty = runner
        .redactions(&RequestContext::new("empty"), &delegate)
        .await
        .unwrap();
    assert!(empty.is_empty());

    let regions = runner
        .redactions(&RequestContext::new("cats.jpg"), &delegate)
        .await
        .unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(
        (regions[0].x, regions[0].y, regions[0].width, regions[0].height),
        (0, 10, 50, 50)
    );
}

#[tokio::test]
async fn overlay_metadata_and_extra_keys() {
    let runner = runner();
    let delegate = FixtureDelegate;

    assert!(runner
        .overlay(&RequestContext::new("cats.jpg"), &delegate)
        .await
        .unwrap()
        .is_none());
    assert!(runner
        .overlay(&RequestContext::new("image"), &delegate)
        .await
        .unwrap()
        .is_some());

    assert_eq!(
        runner
            .metadata(&RequestContext::new("metadata"), &delegate)
            .await
            .unwrap()
            .as_deref(),
        Some("<rdf:RDF>derivative metadata</rdf:RDF>")
    );
    assert_eq!(
        runner
            .metadata(&RequestContext::new("cats.jpg"), &delegate)
            .await
            .unwrap(),
        None
    );

    // Omitted, present-but-empty, and populated are three distinct outcomes.
    assert_eq!(
        runner
            .extra_response_keys(&RequestContext::new("bogus"), &delegate)
            .await
            .unwrap(),
        None
    );
    let empty = runner
        .extra_response_keys(&RequestContext::new("empty"), &delegate)
        .await
        .unwrap()
        .unwrap();
    assert!(empty.is_empty());
    let populated = runner
        .extra_response_keys(&RequestContext::new("cats.jpg"), &delegate)
        .await
        .unwrap()
        .unwrap();
    assert!(populated.contains_key("attribution"));
}

#[tokio::test]
async fn reserved_response_keys_surface_as_violations() {
    struct ReservedKeys;

    #[async_trait]
    impl Delegate for ReservedKeys {
        fn name(&self) -> &str {
            "reserved-keys"
        }

        async fn extra_response_keys(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
            HookResult::try_from(json!({"width": 640}))
        }
    }

    let runner = runner();
    let err = runner
        .extra_response_keys(&RequestContext::new("cats.jpg"), &ReservedKeys)
        .await
        .unwrap_err();
    match err {
        DelegateError::ContractViolation { reason, .. } => assert!(reason.contains("reserved")),
        other => panic!("expected contract violation, got {other:?}"),
    }
}

#[tokio::test]
async fn undefined_hooks_fall_back_to_defaults_end_to_end() {
    let runner = runner();
    let ctx = RequestContext::new("cats.jpg");

    assert_eq!(
        runner.authorize(&ctx, &NoopDelegate).await.unwrap(),
        AuthVerdict::Allow
    );
    assert_eq!(runner.http_resource_info(&ctx, &NoopDelegate).await.unwrap(), None);
    assert_eq!(runner.overlay(&ctx, &NoopDelegate).await.unwrap(), None);
    assert_eq!(runner.metadata(&ctx, &NoopDelegate).await.unwrap(), None);
}

#[tokio::test]
async fn panicking_delegate_fails_closed_then_degrades_when_configured() {
    struct Panicker;

    #[async_trait]
    impl Delegate for Panicker {
        fn name(&self) -> &str {
            "panicker"
        }

        async fn authorize(&self, _ctx: &RequestContext) -> anyhow::Result<HookResult> {
            panic!("rule table corrupted");
        }
    }

    init_tracing();
    let ctx = RequestContext::new("cats.jpg");

    let strict = DelegateRunner::default();
    assert_eq!(
        strict.authorize(&ctx, &Panicker).await.unwrap(),
        AuthVerdict::Deny { status: 403 }
    );

    let lenient = DelegateRunner::new(DelegateConfig {
        degrade_on_error: true,
        ..DelegateConfig::default()
    });
    assert_eq!(
        lenient.authorize(&ctx, &Panicker).await.unwrap(),
        AuthVerdict::Allow
    );
}
