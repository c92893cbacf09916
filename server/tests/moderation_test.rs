//! Moderation executor tests against an in-memory gateway.
//!
//! Run with: `cargo test --test moderation_test`

mod helpers;

use std::sync::atomic::Ordering;

use helpers::{admin, executor, member, owner, session, InMemoryGateway};
use huddle_server::gateway::GatewayError;
use huddle_server::moderation::{Denial, ModerationAction, PolicyError};
use huddle_server::session::Role;

fn kick(target: &str) -> ModerationAction {
    ModerationAction::Kick {
        target: target.into(),
    }
}

// ============================================================================
// Owner grant/revoke
// ============================================================================

#[tokio::test]
async fn test_owner_grants_admin_and_posts_one_notice() {
    let gateway = InMemoryGateway::with_users(&[("alice", Role::Owner), ("bob", Role::User)]);
    let executor = executor(&gateway);

    let receipt = executor
        .execute(
            ModerationAction::GrantAdmin {
                target: "bob".into(),
            },
            &owner(),
        )
        .await
        .unwrap();

    assert_eq!(receipt.action, "grant_admin");
    assert_eq!(receipt.rows_affected, 1);
    assert!(!receipt.is_degraded());
    assert_eq!(gateway.user("bob").unwrap().role, Role::Admin);

    let notices = gateway.system_messages();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].sender_name, "System");
    assert_eq!(notices[0].room, "public");
    assert!(notices[0].text.contains("bob"));
    assert_eq!(
        notices[0].text,
        "⚙️ **SYSTEM**: bob has been granted admin privileges!"
    );
}

#[tokio::test]
async fn test_owner_revokes_admin() {
    let gateway = InMemoryGateway::with_users(&[("alice", Role::Owner), ("dave", Role::Admin)]);

    executor(&gateway)
        .execute(
            ModerationAction::RevokeAdmin {
                target: "  dave ".into(),
            },
            &owner(),
        )
        .await
        .unwrap();

    assert_eq!(gateway.user("dave").unwrap().role, Role::User);
    assert_eq!(
        gateway.system_messages()[0].text,
        "⚙️ **SYSTEM**: dave's admin privileges have been revoked."
    );
}

#[tokio::test]
async fn test_admin_cannot_grant_admin() {
    let gateway = InMemoryGateway::with_users(&[("bob", Role::User)]);

    let err = executor(&gateway)
        .execute(
            ModerationAction::GrantAdmin {
                target: "bob".into(),
            },
            &admin(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Only the owner can grant admin privileges.");
    assert_eq!(gateway.mutations(), 0);
    assert_eq!(gateway.user("bob").unwrap().role, Role::User);
}

// ============================================================================
// Kick
// ============================================================================

#[tokio::test]
async fn test_admin_kicks_user() {
    let gateway = InMemoryGateway::with_users(&[("dave", Role::Admin), ("bob", Role::User)]);

    let receipt = executor(&gateway).execute(kick("bob"), &admin()).await.unwrap();

    assert_eq!(receipt.rows_affected, 1);
    assert!(!gateway.user("bob").unwrap().online);
    assert_eq!(
        gateway.system_messages()[0].text,
        "⚙️ **SYSTEM**: bob has been kicked from the chat."
    );
}

#[tokio::test]
async fn test_admin_cannot_kick_owner_or_admin() {
    let gateway = InMemoryGateway::with_users(&[
        ("alice", Role::Owner),
        ("dave", Role::Admin),
        ("erin", Role::Admin),
    ]);
    let executor = executor(&gateway);

    let err = executor.execute(kick("alice"), &admin()).await.unwrap_err();
    assert!(matches!(
        err,
        PolicyError::InsufficientPrivilege(Denial::TargetIsOwner)
    ));

    let err = executor.execute(kick("erin"), &admin()).await.unwrap_err();
    assert!(matches!(
        err,
        PolicyError::InsufficientPrivilege(Denial::TargetIsAdmin)
    ));
    assert_eq!(err.to_string(), "Admins cannot kick other admins.");

    assert_eq!(gateway.mutations(), 0);
    assert!(gateway.user("alice").unwrap().online);
    assert!(gateway.user("erin").unwrap().online);
}

#[tokio::test]
async fn test_owner_kicks_admin_without_lookup() {
    let gateway = InMemoryGateway::with_users(&[("alice", Role::Owner), ("dave", Role::Admin)]);

    executor(&gateway).execute(kick("dave"), &owner()).await.unwrap();

    assert_eq!(gateway.selects.load(Ordering::SeqCst), 0);
    assert!(!gateway.user("dave").unwrap().online);
}

#[tokio::test]
async fn test_self_kick_is_refused_case_insensitively() {
    let gateway = InMemoryGateway::with_users(&[("dave", Role::Admin)]);

    let err = executor(&gateway).execute(kick("DAVE"), &admin()).await.unwrap_err();

    assert!(matches!(err, PolicyError::SelfTargetNotAllowed { .. }));
    assert_eq!(err.to_string(), "You cannot kick yourself.");
    assert_eq!(gateway.selects.load(Ordering::SeqCst), 0);
    assert_eq!(gateway.mutations(), 0);
}

#[tokio::test]
async fn test_member_cannot_kick() {
    let gateway = InMemoryGateway::with_users(&[("bob", Role::User)]);

    let err = executor(&gateway).execute(kick("bob"), &member()).await.unwrap_err();

    assert!(err.is_local());
    assert_eq!(err.code(), "INSUFFICIENT_PRIVILEGE");
    assert_eq!(gateway.mutations(), 0);
}

#[tokio::test]
async fn test_kick_unknown_user() {
    let gateway = InMemoryGateway::with_users(&[("dave", Role::Admin)]);

    // Admin path: the lookup finds nothing
    let err = executor(&gateway).execute(kick("ghost"), &admin()).await.unwrap_err();
    assert!(matches!(err, PolicyError::TargetNotFound { ref username } if username == "ghost"));

    // Owner path: the update touches nothing
    let err = executor(&gateway).execute(kick("ghost"), &owner()).await.unwrap_err();
    assert!(matches!(err, PolicyError::TargetNotFound { .. }));

    assert!(gateway.system_messages().is_empty());
}

// ============================================================================
// Announcements
// ============================================================================

#[tokio::test]
async fn test_announcement_inserts_and_notifies() {
    let gateway = InMemoryGateway::new();

    executor(&gateway)
        .execute(
            ModerationAction::Announce {
                text: "  Server restart at 5  ".into(),
            },
            &admin(),
        )
        .await
        .unwrap();

    assert_eq!(gateway.announcements(), 1);
    let notices = gateway.system_messages();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].sender_name, "System Announcement");
    assert_eq!(notices[0].text, "📢 **ANNOUNCEMENT**: Server restart at 5");
}

#[tokio::test]
async fn test_announcement_length_boundary() {
    let gateway = InMemoryGateway::new();
    let executor = executor(&gateway);

    let ok = executor
        .execute(
            ModerationAction::Announce {
                text: "é".repeat(500),
            },
            &admin(),
        )
        .await;
    assert!(ok.is_ok());

    let err = executor
        .execute(
            ModerationAction::Announce {
                text: "a".repeat(501),
            },
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PolicyError::Validation(_)));
    assert_eq!(gateway.announcements(), 1);
}

// ============================================================================
// Clear chat
// ============================================================================

#[tokio::test]
async fn test_clear_chat_twice_equals_once() {
    let gateway = InMemoryGateway::new();
    gateway.seed_message("admin", "one");
    gateway.seed_message("admin", "two");
    gateway.seed_message("public", "untouched");
    let executor = executor(&gateway);

    let clear = || ModerationAction::ClearChat {
        room: "admin".into(),
    };

    let first = executor.execute(clear(), &admin()).await.unwrap();
    let after_first = gateway.messages_in("admin");

    let second = executor.execute(clear(), &admin()).await.unwrap();
    let after_second = gateway.messages_in("admin");

    assert_eq!(first.rows_affected, 2);
    assert_eq!(second.rows_affected, 2);
    assert_eq!(after_first, after_second);
    assert!(after_second.iter().all(|m| m.deleted));
    assert!(gateway
        .messages_in("public")
        .iter()
        .any(|m| m.text == "untouched" && !m.deleted));
    assert_eq!(
        gateway.system_messages()[0].text,
        "⚙️ **SYSTEM**: Chat has been cleared by Dave."
    );
}

#[tokio::test]
async fn test_clear_empty_room_succeeds() {
    let gateway = InMemoryGateway::new();

    let receipt = executor(&gateway)
        .execute(
            ModerationAction::ClearChat {
                room: "admin".into(),
            },
            &admin(),
        )
        .await
        .unwrap();

    assert_eq!(receipt.rows_affected, 0);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_notice_failure_degrades_but_succeeds() {
    let gateway = InMemoryGateway::with_users(&[("bob", Role::User)]);
    gateway.fail_message_inserts.store(true, Ordering::SeqCst);

    let receipt = executor(&gateway)
        .execute(
            ModerationAction::GrantAdmin {
                target: "bob".into(),
            },
            &owner(),
        )
        .await
        .unwrap();

    assert!(receipt.is_degraded());
    assert_eq!(gateway.user("bob").unwrap().role, Role::Admin);
    assert!(gateway.system_messages().is_empty());
}

#[tokio::test]
async fn test_primary_failure_is_remote_and_skips_notice() {
    let gateway = InMemoryGateway::with_users(&[("bob", Role::User)]);
    gateway.fail_updates.store(true, Ordering::SeqCst);

    let err = executor(&gateway)
        .execute(
            ModerationAction::RevokeAdmin {
                target: "bob".into(),
            },
            &session("alice", Role::Owner),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PolicyError::RemoteFailure(GatewayError::Backend(_))
    ));
    assert!(!err.is_local());
    assert!(gateway.system_messages().is_empty());
}
