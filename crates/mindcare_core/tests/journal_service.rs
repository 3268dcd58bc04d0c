use mindcare_core::{
    DevWallet, EntryDraft, FailureKind, JournalConfig, JournalService, LoadState, MemoryKvStore,
    RecordId, RevealOutcome, RevealState, SignPolicy, TransactionStatus, Wallet,
};
use std::sync::Arc;

fn service<'a>(kv: &'a MemoryKvStore, wallet: &Arc<DevWallet>) -> JournalService<&'a MemoryKvStore> {
    let wallet: Arc<dyn Wallet> = wallet.clone();
    JournalService::new(kv, wallet, &JournalConfig::default()).unwrap()
}

fn draft(mood: u8, stress: u8) -> EntryDraft {
    EntryDraft {
        mood,
        stress,
        ..EntryDraft::default()
    }
}

#[test]
fn submit_requires_connected_wallet() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal"));
    let mut journal = service(&kv, &wallet);

    let failure = journal.submit(EntryDraft::default()).unwrap_err();
    assert_eq!(failure.kind, FailureKind::AuthRejected);
    assert_eq!(kv.write_count(), 0);
    assert_eq!(journal.status(), &TransactionStatus::Hidden);
}

#[test]
fn submit_rejects_out_of_range_levels() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);

    let failure = journal.submit(draft(11, 5)).unwrap_err();
    assert_eq!(failure.kind, FailureKind::InvalidInput);
    assert!(failure.message.contains("mood"));
    assert_eq!(kv.write_count(), 0);
}

#[test]
fn submit_persists_and_refreshes() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);
    assert_eq!(journal.load_state(), LoadState::Idle);

    let record = journal.submit(draft(6, 4)).unwrap();

    assert_eq!(journal.load_state(), LoadState::Ready);
    assert_eq!(journal.records(), &[record.clone()]);
    assert!(journal.is_owner(&record));
    assert_eq!(
        journal.status(),
        &TransactionStatus::Success("Your encrypted journal entry is saved securely!".to_string())
    );

    journal.dismiss_status();
    assert_eq!(journal.status(), &TransactionStatus::Hidden);
}

#[test]
fn declined_write_reports_rejection() {
    let kv = MemoryKvStore::new();
    kv.deny_writes();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);

    let failure = journal.submit(draft(5, 5)).unwrap_err();
    assert_eq!(failure.kind, FailureKind::AuthRejected);
    assert_eq!(
        journal.status(),
        &TransactionStatus::Error("Transaction rejected by user".to_string())
    );
}

#[test]
fn failed_index_write_reports_submission_failure() {
    let kv = MemoryKvStore::new();
    kv.fail_writes_to("record_keys");
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);

    let failure = journal.submit(draft(5, 5)).unwrap_err();
    assert_eq!(failure.kind, FailureKind::WriteFailure);
    match journal.status() {
        TransactionStatus::Error(message) => assert!(message.starts_with("Submission failed: ")),
        other => panic!("unexpected status: {other:?}"),
    }
}

#[test]
fn unavailable_store_loads_empty() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);
    journal.submit(draft(5, 5)).unwrap();

    kv.set_available(false);
    assert!(journal.refresh().is_empty());
    assert_eq!(journal.load_state(), LoadState::Unavailable);
}

#[tokio::test]
async fn mood_trend_uses_each_records_own_reveal() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);
    for (index, mood) in [2_u8, 4, 9].into_iter().enumerate() {
        let record = journal
            .store()
            .create_at(
                mindcare_core::NewRecord {
                    category: "Daily Check-in".to_string(),
                    mood: f64::from(mood),
                    stress: 5.0,
                    note: String::new(),
                    owner: wallet.address().unwrap(),
                },
                100 + index as i64,
            )
            .unwrap();
        assert_eq!(record.timestamp, 100 + index as i64);
    }
    journal.refresh();

    let middle = journal.records()[1].id.clone();
    let outcome = journal.toggle_reveal(&middle).await.unwrap();
    assert!(matches!(outcome, RevealOutcome::Revealed(values) if values.mood == 4.0));

    let trend = journal.mood_trend();
    let moods: Vec<Option<f64>> = trend.iter().map(|point| point.mood).collect();
    assert_eq!(moods, vec![None, Some(4.0), None]);
    let timestamps: Vec<i64> = trend.iter().map(|point| point.timestamp).collect();
    assert_eq!(timestamps, vec![100, 101, 102]);
}

#[tokio::test]
async fn toggle_reveal_surfaces_rejection() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);
    let record = journal.submit(draft(5, 5)).unwrap();

    wallet.set_policy(SignPolicy::Reject);
    let failure = journal.toggle_reveal(&record.id).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::AuthRejected);
}

#[test]
fn recent_feedback_keeps_three_newest() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);
    for _ in 0..5 {
        journal.submit(draft(5, 5)).unwrap();
    }

    assert_eq!(journal.records().len(), 5);
    assert_eq!(journal.recent_feedback().len(), 3);
    assert_eq!(journal.recent_feedback(), &journal.records()[..3]);
}

#[tokio::test]
async fn hide_all_returns_revealed_records_to_hidden() {
    let kv = MemoryKvStore::with_address("0xjournal");
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);
    let record = journal.submit(draft(8, 2)).unwrap();

    let challenge = journal.gate().params().message();
    assert!(challenge.contains("\ncontractAddresses:0xjournal\n"));
    assert!(challenge.contains("\ncontractsChainId:31337\n"));

    journal.toggle_reveal(&record.id).await.unwrap();
    assert!(matches!(
        journal.reveal_state(&record.id),
        RevealState::Revealed(values) if values.mood == 8.0 && values.stress == 2.0
    ));

    journal.hide_all();
    assert_eq!(journal.reveal_state(&record.id), RevealState::Hidden);
    assert_eq!(wallet.sign_requests(), 1);
}

#[tokio::test]
async fn toggle_reveal_rejects_unlisted_record() {
    let kv = MemoryKvStore::new();
    let wallet = Arc::new(DevWallet::from_seed("journal").connected());
    let mut journal = service(&kv, &wallet);

    let failure = journal
        .toggle_reveal(&RecordId::from("missing"))
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::InvalidInput);
    assert_eq!(wallet.sign_requests(), 0);
}
