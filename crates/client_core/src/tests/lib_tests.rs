use super::*;
use crate::support::{hash, test_config, FakeHost, FakeWallet, CANONICAL};
use shared::domain::ActionKind;

#[tokio::test]
async fn mount_then_mint_end_to_end() {
    let host = Arc::new(FakeHost::signed_in(99).with_register_error(HostError::malformed(
        "result",
        "Cannot read properties of undefined (reading 'result')",
    )));
    let wallet = Arc::new(FakeWallet::on_network(NetworkId::BASE).switching());
    let app = MiniApp::new(&test_config(), host.clone(), wallet.clone());

    assert_eq!(app.session.initialize().await, SessionStatus::Loaded);
    assert_eq!(app.session.initialize().await, SessionStatus::Loaded);
    assert_eq!(host.calls(), (1, 1, 1));

    let first = app
        .chain
        .run_action(ActionKind::Mint)
        .await
        .expect("switch");
    assert!(matches!(first, chain::AttemptOutcome::SwitchRequested { .. }));
    assert_eq!(wallet.submissions(), 0);

    let minted = hash(1);
    wallet.script_receipts(
        &minted,
        vec![
            shared::protocol::ReceiptUpdate::Confirming { confirmations: 2 },
            shared::protocol::ReceiptUpdate::Confirmed,
            shared::protocol::ReceiptUpdate::Confirmed,
        ],
    );
    let second = app
        .chain
        .run_action(ActionKind::Mint)
        .await
        .expect("submit");
    assert_eq!(second, chain::AttemptOutcome::Submitted(minted.clone()));

    assert_eq!(app.chain.flow(ActionKind::Mint).phase, FlowPhase::Confirmed);
    let composed = host.composed();
    assert_eq!(composed.len(), 1);
    let embeds = composed[0].embeds.clone().expect("embeds");
    assert_eq!(embeds[0], CANONICAL);
    assert_eq!(embeds[1], format!("https://sepolia.basescan.org/tx/{minted}"));
    assert!(composed[0].text.starts_with("I just minted"));
}

#[tokio::test]
async fn user_compose_shares_session_with_orchestrator() {
    let host = Arc::new(FakeHost::signed_in(5));
    let wallet = Arc::new(FakeWallet::disconnected());
    let app = MiniApp::new(&test_config(), host.clone(), wallet);

    assert_eq!(
        app.composer.compose_cast("early", &[]).await,
        Err(error::ComposeError::NotReady)
    );
    app.session.initialize().await;
    app.composer
        .compose_cast("hello from the mini app", &[])
        .await
        .expect("compose");

    assert_eq!(app.composer.canonical_url(), CANONICAL);
    assert_eq!(host.composed().len(), 1);
}
