use keyring_smoke::{
    Attributes, Failure, Keyring, Secret, SmokeCheck, Stage,
    memory::{Fault, Service},
};

async fn run(check: &SmokeCheck, service: &Service) -> Result<keyring_smoke::Report, Failure> {
    check.run(async { Keyring::memory(service) }).await
}

#[tokio::test]
async fn round_trip_text() {
    let passwords = [
        "password-123",
        "",
        " leading and trailing spaces ",
        "pässwörd ✓ 密码 🔑",
        "line\nbreak\ttab",
    ];
    for password in passwords {
        let service = Service::new();
        let report = run(&SmokeCheck::new("label-123", password), &service)
            .await
            .unwrap();
        assert_eq!(report.password, password);
    }

    let long = "x".repeat(64 * 1024);
    let service = Service::new();
    let report = run(&SmokeCheck::new("long", long.as_str()), &service)
        .await
        .unwrap();
    assert_eq!(report.password, long);
}

#[tokio::test]
async fn attributes_are_stored() {
    let service = Service::new();
    let check = SmokeCheck::default()
        .attribute("ci-job", "42")
        .attribute("runner", "linux");
    run(&check, &service).await.unwrap();

    let items = service.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].attributes.len(), 2);
    assert_eq!(items[0].attributes["ci-job"], "42");
}

#[tokio::test]
async fn repeated_runs_add_items() {
    let service = Service::new();
    let check = SmokeCheck::default();
    let first = run(&check, &service).await.unwrap();
    let second = run(&check, &service).await.unwrap();

    assert_ne!(first.item, second.item);
    assert_eq!(service.items().len(), 2);
}

#[tokio::test]
async fn unrelated_items_survive_a_run() {
    let service = Service::new().with_item(
        "keep-me",
        Attributes::from([("app".to_owned(), "mail".to_owned())]),
        Secret::text("mail-password"),
    );
    run(&SmokeCheck::default().delete_after(true), &service)
        .await
        .unwrap();

    let items = service.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "keep-me");
    assert_eq!(items[0].secret, Secret::text("mail-password"));
}

#[tokio::test]
async fn locked_collection_gets_unlocked() {
    let service = Service::new().lock_default_collection();
    run(&SmokeCheck::default(), &service).await.unwrap();
    assert!(!service.is_default_collection_locked());
}

#[tokio::test]
async fn each_stage_fails_distinctly() {
    let cases = [
        (Service::unreachable(), Stage::Connect),
        (Service::empty(), Stage::Collection),
        (
            Service::new().lock_default_collection().dismiss_prompts(),
            Stage::Collection,
        ),
        (Service::new().with_fault(Fault::RejectCreate), Stage::CreateItem),
        (
            Service::new().with_fault(Fault::RevokeSecrets),
            Stage::ReadSecret,
        ),
        (
            Service::new().with_fault(Fault::ReplacePayload(vec![0xff, 0xfe])),
            Stage::Decode,
        ),
        (
            Service::new().with_fault(Fault::ReplacePayload(b"password-124".to_vec())),
            Stage::Verify,
        ),
    ];

    for (service, stage) in cases {
        let err = run(&SmokeCheck::default(), &service).await.unwrap_err();
        assert_eq!(err.stage(), stage, "{err}");
        assert_eq!(err.exit_code(), stage.exit_code());
        assert_eq!(service.open_sessions(), 0, "session leaked at {stage}");
    }
}

#[tokio::test]
async fn failed_cleanup_keeps_the_item() {
    let service = Service::new().with_fault(Fault::RejectDelete);
    let err = run(&SmokeCheck::default().delete_after(true), &service)
        .await
        .unwrap_err();

    assert!(matches!(err, Failure::Cleanup(_)));
    assert_eq!(service.items().len(), 1);
    assert_eq!(service.open_sessions(), 0);
}

#[tokio::test]
async fn cleanup_skipped_when_verification_fails() {
    let service = Service::new().with_fault(Fault::ReplacePayload(b"other".to_vec()));
    let err = run(&SmokeCheck::default().delete_after(true), &service)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Verify);
    assert_eq!(service.items().len(), 1);
}

#[tokio::test]
async fn failure_messages() {
    let service = Service::new().with_fault(Fault::ReplacePayload(b"password-999".to_vec()));
    let err = run(&SmokeCheck::default(), &service).await.unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Secret Service initialization failure")
    );

    let service = Service::unreachable();
    let err = run(&SmokeCheck::default(), &service).await.unwrap_err();
    assert!(err.to_string().contains("not reachable"));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn keyring_exposes_the_stored_item() {
    let service = Service::new();
    let keyring = Keyring::memory(&service).unwrap();
    let collection = keyring.default_collection().await.unwrap();
    assert_eq!(collection.label().await.unwrap(), "Login");

    let attributes = Attributes::from([("ci-job".to_owned(), "42".to_owned())]);
    let item = collection
        .create_item("label-123", &attributes, &Secret::text("password-123"), false)
        .await
        .unwrap();
    assert_eq!(item.label().await.unwrap(), "label-123");
    assert_eq!(item.attributes().await.unwrap(), attributes);
    assert_eq!(
        item.secret().await.unwrap(),
        Secret::text("password-123")
    );

    item.delete().await.unwrap();
    keyring.close().await.unwrap();
    assert!(service.items().is_empty());
    assert_eq!(service.open_sessions(), 0);
}
