mod common;

use common::*;
use hashnexus::auth::AuthAction;
use hashnexus::error::Error;
use hashnexus::registry::{RequestOutcome, ResolveAction};
use hashnexus::store::Store;
use hashnexus::types::{HashName, RequestStatus, Seed};

struct Fixture {
    app: TestApp,
    author: Wallet,
    owner: Wallet,
    seed: Seed,
    hashname: HashName,
}

async fn fixture() -> Fixture {
    let app = test_app();
    let author = Wallet::random();
    let owner = Wallet::random();

    let seed = app
        .store()
        .create_seed("genesis note", Some(&author.address))
        .unwrap();
    let hashname = app.store().create_hashname("#alpha").unwrap();
    app.state
        .claims
        .claim("#alpha", &owner.verified())
        .await
        .unwrap();

    Fixture {
        app,
        author,
        owner,
        seed,
        hashname,
    }
}

#[tokio::test]
async fn requesting_an_attachment_creates_a_pending_request() {
    let fx = fixture().await;

    let verified = authorize(
        &fx.app,
        &fx.author,
        AuthAction::RequestAttachment,
        Some(fx.seed.seed_id),
    )
    .await;
    let outcome = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &verified)
        .await
        .unwrap();

    let RequestOutcome::Pending(request) = outcome else {
        panic!("expected pending request");
    };
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.seed_id, fx.seed.seed_id);
    assert_eq!(request.hashname_id, fx.hashname.hashname_id);
    assert_eq!(request.requester_address, fx.author.address);
}

#[tokio::test]
async fn duplicate_requests_return_the_existing_pending_row() {
    let fx = fixture().await;
    let verified = fx.author.verified();

    let first = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &verified)
        .await
        .unwrap();
    let second = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &verified)
        .await
        .unwrap();

    let (RequestOutcome::Pending(a), RequestOutcome::Pending(b)) = (first, second) else {
        panic!("expected pending requests");
    };
    assert_eq!(a.request_id, b.request_id);
}

#[tokio::test]
async fn only_the_seed_author_may_request() {
    let fx = fixture().await;
    let stranger = Wallet::random();

    let err = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &stranger.verified())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden));
}

#[tokio::test]
async fn a_seed_without_an_author_accepts_no_requests() {
    let fx = fixture().await;
    let orphan = fx.app.store().create_seed("orphan", None).unwrap();

    let err = fx
        .app
        .state
        .attachments
        .request(orphan.seed_id, "#alpha", &fx.author.verified())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden));
}

#[tokio::test]
async fn requests_against_missing_or_inactive_hashnames_fail() {
    let fx = fixture().await;
    let verified = fx.author.verified();

    let err = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#missing", &verified)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound));

    fx.app
        .store()
        .set_hashname_active(fx.hashname.hashname_id, false)
        .unwrap();
    let err = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &verified)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Inactive));
}

#[tokio::test]
async fn accepting_a_request_attaches_and_resolves() {
    let fx = fixture().await;

    let RequestOutcome::Pending(request) = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &fx.author.verified())
        .await
        .unwrap()
    else {
        panic!("expected pending request");
    };

    let verified = authorize(
        &fx.app,
        &fx.owner,
        AuthAction::ResolveAttachment,
        Some(request.request_id),
    )
    .await;
    let resolved = fx
        .app
        .state
        .attachments
        .resolve(
            request.request_id,
            ResolveAction::Accept,
            &verified,
            Some("welcome".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(resolved.status, RequestStatus::Accepted);
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.decision_note.as_deref(), Some("welcome"));

    let attachment = fx
        .app
        .store()
        .get_attachment(fx.seed.seed_id, fx.hashname.hashname_id)
        .unwrap()
        .expect("attachment row");
    assert_eq!(attachment.attached_by_address, fx.owner.address);
}

#[tokio::test]
async fn the_second_resolution_always_loses() {
    let fx = fixture().await;
    let owner = fx.owner.verified();

    let RequestOutcome::Pending(request) = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &fx.author.verified())
        .await
        .unwrap()
    else {
        panic!("expected pending request");
    };

    fx.app
        .state
        .attachments
        .resolve(request.request_id, ResolveAction::Accept, &owner, None)
        .await
        .unwrap();

    // Whichever action comes second, the outcome is the same.
    for action in [ResolveAction::Accept, ResolveAction::Reject] {
        let err = fx
            .app
            .state
            .attachments
            .resolve(request.request_id, action, &owner, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyResolved));
    }

    let stored = fx.app.store().get_request(request.request_id).unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Accepted);
}

#[tokio::test]
async fn a_rejection_does_not_block_a_new_request() {
    let fx = fixture().await;
    let author = fx.author.verified();
    let owner = fx.owner.verified();

    let RequestOutcome::Pending(first) = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &author)
        .await
        .unwrap()
    else {
        panic!("expected pending request");
    };

    fx.app
        .state
        .attachments
        .resolve(
            first.request_id,
            ResolveAction::Reject,
            &owner,
            Some("not yet".to_string()),
        )
        .await
        .unwrap();

    // No attachment was created by the rejection.
    assert!(
        fx.app
            .store()
            .get_attachment(fx.seed.seed_id, fx.hashname.hashname_id)
            .unwrap()
            .is_none()
    );

    let RequestOutcome::Pending(second) = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &author)
        .await
        .unwrap()
    else {
        panic!("expected a fresh pending request");
    };
    assert_ne!(first.request_id, second.request_id);
}

#[tokio::test]
async fn requesting_an_already_attached_pair_reports_approved() {
    let fx = fixture().await;
    let author = fx.author.verified();
    let owner = fx.owner.verified();

    let RequestOutcome::Pending(request) = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &author)
        .await
        .unwrap()
    else {
        panic!("expected pending request");
    };
    fx.app
        .state
        .attachments
        .resolve(request.request_id, ResolveAction::Accept, &owner, None)
        .await
        .unwrap();

    let outcome = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &author)
        .await
        .unwrap();
    assert!(matches!(outcome, RequestOutcome::AlreadyApproved(_)));
}

#[tokio::test]
async fn only_the_hashname_owner_may_resolve() {
    let fx = fixture().await;
    let stranger = Wallet::random();

    let RequestOutcome::Pending(request) = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &fx.author.verified())
        .await
        .unwrap()
    else {
        panic!("expected pending request");
    };

    let err = fx
        .app
        .state
        .attachments
        .resolve(
            request.request_id,
            ResolveAction::Accept,
            &stranger.verified(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden));

    let stored = fx.app.store().get_request(request.request_id).unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
}

#[tokio::test]
async fn an_unclaimed_hashname_cannot_resolve_anything() {
    let app = test_app();
    let author = Wallet::random();

    let seed = app
        .store()
        .create_seed("note", Some(&author.address))
        .unwrap();
    app.store().create_hashname("#unclaimed").unwrap();

    let RequestOutcome::Pending(request) = app
        .state
        .attachments
        .request(seed.seed_id, "#unclaimed", &author.verified())
        .await
        .unwrap()
    else {
        panic!("expected pending request");
    };

    let err = app
        .state
        .attachments
        .resolve(
            request.request_id,
            ResolveAction::Accept,
            &author.verified(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unclaimed));
}

#[tokio::test]
async fn reaccepting_with_an_existing_attachment_row_succeeds() {
    let fx = fixture().await;
    let owner = fx.owner.verified();

    let RequestOutcome::Pending(request) = fx
        .app
        .state
        .attachments
        .request(fx.seed.seed_id, "#alpha", &fx.author.verified())
        .await
        .unwrap()
    else {
        panic!("expected pending request");
    };

    // A crashed earlier accept left the attachment but not the status flip.
    fx.app
        .store()
        .insert_attachment_if_absent(fx.seed.seed_id, fx.hashname.hashname_id, &fx.owner.address)
        .unwrap();

    let resolved = fx
        .app
        .state
        .attachments
        .resolve(request.request_id, ResolveAction::Accept, &owner, None)
        .await
        .unwrap();
    assert_eq!(resolved.status, RequestStatus::Accepted);

    let attachment = fx
        .app
        .store()
        .get_attachment(fx.seed.seed_id, fx.hashname.hashname_id)
        .unwrap()
        .expect("attachment row");
    assert_eq!(attachment.attached_by_address, fx.owner.address);
}

#[tokio::test]
async fn resolving_a_missing_request_is_not_found() {
    let fx = fixture().await;

    let err = fx
        .app
        .state
        .attachments
        .resolve(9999, ResolveAction::Accept, &fx.owner.verified(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound));
}
