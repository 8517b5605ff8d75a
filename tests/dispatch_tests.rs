//! Dispatch Tests: signing, resolution and dequeue behaviour
//!
//! These tests verify:
//! 1. Transaction/chain: one signer call per group, one submission per signed group
//! 2. Transaction/callback: approve fires once with groups in order
//! 3. Arbitrary-data/chain: UnsupportedTransport and still dequeued
//! 4. Arbitrary-data failures: AccountNotFound, SignatureGenerationFailed
//! 5. Reject and fail hooks fire once and dequeue
//! 6. Failures other than UnsupportedTransport leave the request queued
//! 7. Requests queued without an id still dequeue on resolution
//! 8. Groups and items are signed concurrently and abort fail-fast

use anyhow::anyhow;
use async_trait::async_trait;
use beesign::{
    AccountResolver, ArbitraryDataItem, ChainClient, DisplayableTransaction, RequestCallbacks, RequestStore,
    SignError, SignRequest, SignResult, Signature, SignedGroup, Signer, SigningDispatcher, Transport,
    WalletAccount,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mocks
// ============================================================================

#[derive(Default)]
struct MockSigner {
    group_calls: AtomicUsize,
    data_calls: AtomicUsize,
    seen_indices: Mutex<Vec<Vec<usize>>>,
    fail_group_with_fee: Option<u64>,
    empty_signatures: bool,
}

#[async_trait]
impl Signer for MockSigner {
    async fn sign_transactions(&self, group: &[DisplayableTransaction], indices: &[usize]) -> anyhow::Result<SignedGroup> {
        self.group_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_indices.lock().unwrap().push(indices.to_vec());
        // Make earlier groups finish later to shake out ordering bugs.
        let delay = 5 * group.first().map(|t| (10_000 - t.fee.min(10_000)) / 1_000).unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if let Some(fee) = self.fail_group_with_fee {
            if group.iter().any(|t| t.fee == fee) {
                return Err(anyhow!("device rejected group"));
            }
        }
        Ok(group.iter().map(|t| format!("signed-{}", t.fee).into_bytes()).collect())
    }

    async fn sign_arbitrary_data(&self, account: &WalletAccount, payload: &[u8]) -> anyhow::Result<Vec<Signature>> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        if self.empty_signatures {
            return Ok(Vec::new());
        }
        let mut sig = account.address.as_bytes().to_vec();
        sig.extend_from_slice(payload);
        Ok(vec![sig, b"ignored".to_vec()])
    }
}

struct MockAccounts(Vec<WalletAccount>);

impl AccountResolver for MockAccounts {
    fn all_accounts(&self) -> Vec<WalletAccount> { self.0.clone() }
}

#[derive(Default)]
struct MockChain {
    submitted: Mutex<Vec<Vec<u8>>>,
    fail: bool,
}

#[async_trait]
impl ChainClient for MockChain {
    async fn submit_raw_transaction(&self, bytes: &[u8]) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("overspend"));
        }
        self.submitted.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }
}

#[derive(Default)]
struct Recorder<T> {
    approved: Mutex<Vec<T>>,
    rejects: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

impl<T: Send> RequestCallbacks<T> for Recorder<T> {
    fn approve(&self, result: T) { self.approved.lock().unwrap().push(result); }
    fn reject(&self) { self.rejects.fetch_add(1, Ordering::SeqCst); }
    fn error(&self, reason: &str) { self.errors.lock().unwrap().push(reason.to_string()); }
}

/// Forwards to a shared recorder so the test keeps a handle after the request owns the hooks.
struct Shared<T>(Arc<Recorder<T>>);

impl<T: Send> RequestCallbacks<T> for Shared<T> {
    fn approve(&self, result: T) { self.0.approve(result) }
    fn reject(&self) { self.0.reject() }
    fn error(&self, reason: &str) { self.0.error(reason) }
}

struct Harness {
    store: Arc<RequestStore>,
    signer: Arc<MockSigner>,
    chain: Arc<MockChain>,
    dispatcher: SigningDispatcher,
}

fn harness_with(signer: MockSigner, chain: MockChain) -> Harness {
    let store = Arc::new(RequestStore::in_memory());
    let signer = Arc::new(signer);
    let chain = Arc::new(chain);
    let accounts = Arc::new(MockAccounts(vec![
        WalletAccount::signing("MINE"),
        WalletAccount::watch_only("WATCHED"),
    ]));
    let dispatcher = SigningDispatcher::new(store.clone(), signer.clone(), accounts, chain.clone());
    Harness { store, signer, chain, dispatcher }
}

fn harness() -> Harness { harness_with(MockSigner::default(), MockChain::default()) }

fn tx(fee: u64) -> DisplayableTransaction { DisplayableTransaction::new("MINE", fee) }

fn groups() -> Vec<Vec<DisplayableTransaction>> {
    vec![vec![tx(1_000), tx(2_000)], vec![tx(3_000)], vec![tx(4_000), tx(5_000), tx(6_000)]]
}

fn data_item(signer: &str, payload: &[u8]) -> ArbitraryDataItem {
    ArbitraryDataItem { signer_address: signer.into(), payload: payload.to_vec(), message: None, chain_id: 4160 }
}

// ============================================================================
// Transactions
// ============================================================================

/// Test: sign_request returns one signed group per input group, in order
#[tokio::test]
async fn sign_request_preserves_group_order() {
    let h = harness();
    let request = SignRequest::transactions(groups(), Transport::Chain);

    let result = h.dispatcher.sign_request(&request).await.expect("signed");
    let signed = result.signed_groups().expect("transaction result");
    assert_eq!(signed.len(), 3);
    assert_eq!(signed[0], vec![b"signed-1000".to_vec(), b"signed-2000".to_vec()]);
    assert_eq!(signed[1], vec![b"signed-3000".to_vec()]);
    assert_eq!(signed[2].len(), 3);
    assert!(result.signatures().is_none());

    // Full index range of every group
    let mut indices = h.signer.seen_indices.lock().unwrap().clone();
    indices.sort();
    assert_eq!(indices, vec![vec![0], vec![0, 1], vec![0, 1, 2]]);

    // Pure signing never dequeues or submits
    assert!(h.chain.submitted.lock().unwrap().is_empty());
}

/// Test: Transaction/chain signs each group, submits each signed group, dequeues
#[tokio::test]
async fn transaction_chain_submits_every_group() {
    let h = harness();
    let mut request = SignRequest::transactions(groups(), Transport::Chain);
    assert!(h.store.add_sign_request(&mut request));

    h.dispatcher.sign_and_send_request(&request).await.expect("sent");

    assert_eq!(h.signer.group_calls.load(Ordering::SeqCst), 3);
    let mut submitted = h.chain.submitted.lock().unwrap().clone();
    submitted.sort();
    assert_eq!(submitted.len(), 3);
    assert!(submitted.contains(&b"signed-1000signed-2000".to_vec()));
    assert!(submitted.contains(&b"signed-3000".to_vec()));
    assert!(h.store.is_empty());
}

/// Test: Transaction/callback approves exactly once with ordered groups
#[tokio::test]
async fn transaction_callback_approves_once() {
    let h = harness();
    let recorder = Arc::new(Recorder::<Vec<SignedGroup>>::default());
    let mut request = SignRequest::transactions(groups(), Transport::callback(Shared(recorder.clone())));
    assert!(h.store.add_sign_request(&mut request));

    h.dispatcher.sign_and_send_request(&request).await.expect("approved");

    let approved = recorder.approved.lock().unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0][1], vec![b"signed-3000".to_vec()]);
    assert!(h.chain.submitted.lock().unwrap().is_empty());
    assert!(h.store.is_empty());
}

/// Test: One failing group aborts signing and the request stays queued
#[tokio::test]
async fn failing_group_aborts_and_keeps_request() {
    let h = harness_with(MockSigner { fail_group_with_fee: Some(3_000), ..Default::default() }, MockChain::default());
    let recorder = Arc::new(Recorder::<Vec<SignedGroup>>::default());
    let mut request = SignRequest::transactions(groups(), Transport::callback(Shared(recorder.clone())));
    assert!(h.store.add_sign_request(&mut request));

    let err = h.dispatcher.sign_and_send_request(&request).await.expect_err("must fail");
    assert!(matches!(err, SignError::Signer(_)));
    assert_eq!(err.reason(), "signer_error");
    assert!(recorder.approved.lock().unwrap().is_empty());
    assert!(h.store.contains(&request.id));
}

/// Test: Submission failure surfaces SubmissionError and keeps the request
#[tokio::test]
async fn submission_failure_keeps_request() {
    let h = harness_with(MockSigner::default(), MockChain { fail: true, ..Default::default() });
    let mut request = SignRequest::transactions(groups(), Transport::Chain);
    assert!(h.store.add_sign_request(&mut request));

    let err = h.dispatcher.sign_and_send_request(&request).await.expect_err("must fail");
    assert!(matches!(err, SignError::Submission(_)));
    assert!(err.to_string().contains("overspend"));
    assert_eq!(h.store.len(), 1);
}

// ============================================================================
// Arbitrary data
// ============================================================================

/// Test: Arbitrary-data/chain always fails UnsupportedTransport and is dequeued
#[tokio::test]
async fn arbitrary_data_chain_unsupported_and_removed() {
    let h = harness();
    let mut request = SignRequest::arbitrary_data(vec![data_item("MINE", b"login")], Transport::Chain);
    assert!(h.store.add_sign_request(&mut request));

    let err = h.dispatcher.sign_and_send_request(&request).await.expect_err("unsupported");
    assert!(matches!(err, SignError::UnsupportedTransport { .. }));
    assert!(err.to_string().contains("not supported via this transport"));
    assert_eq!(h.signer.data_calls.load(Ordering::SeqCst), 0);
    assert!(h.store.is_empty());
}

/// Test: Arbitrary-data/callback approves with the first signature per item
#[tokio::test]
async fn arbitrary_data_callback_approves_first_signatures() {
    let h = harness();
    let recorder = Arc::new(Recorder::<Vec<Signature>>::default());
    let mut request = SignRequest::arbitrary_data(
        vec![data_item("MINE", b"one"), data_item("WATCHED", b"two")],
        Transport::callback(Shared(recorder.clone())),
    );
    assert!(h.store.add_sign_request(&mut request));

    h.dispatcher.sign_and_send_request(&request).await.expect("approved");

    let approved = recorder.approved.lock().unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0], vec![b"MINEone".to_vec(), b"WATCHEDtwo".to_vec()]);
    assert!(h.store.is_empty());
}

/// Test: Unknown signer address fails AccountNotFound
#[tokio::test]
async fn arbitrary_data_unknown_account() {
    let h = harness();
    let request = SignRequest::arbitrary_data(
        vec![data_item("MINE", b"ok"), data_item("STRANGER", b"nope")],
        Transport::callback(Recorder::<Vec<Signature>>::default()),
    );

    let err = h.dispatcher.sign_request(&request).await.expect_err("missing account");
    match err {
        SignError::AccountNotFound { address } => assert_eq!(address, "STRANGER"),
        other => panic!("unexpected error: {other}"),
    }
}

/// Test: Empty signer output fails SignatureGenerationFailed
#[tokio::test]
async fn arbitrary_data_empty_signature() {
    let h = harness_with(MockSigner { empty_signatures: true, ..Default::default() }, MockChain::default());
    let mut request = SignRequest::arbitrary_data(
        vec![data_item("MINE", b"ok")],
        Transport::callback(Recorder::<Vec<Signature>>::default()),
    );
    assert!(h.store.add_sign_request(&mut request));

    let err = h.dispatcher.sign_and_send_request(&request).await.expect_err("no signature");
    assert!(matches!(err, SignError::SignatureGenerationFailed { .. }));
    assert_eq!(h.store.len(), 1);
}

/// Test: Arc60 is rejected as an unsupported type
#[tokio::test]
async fn arc60_unsupported() {
    let h = harness();
    let request = SignRequest::arc60(Recorder::<Vec<Signature>>::default());

    let err = h.dispatcher.sign_request(&request).await.expect_err("unsupported");
    assert!(matches!(err, SignError::UnsupportedRequestType { .. }));
    assert!(matches!(h.dispatcher.sign_request(&request).await, Err(SignError::UnsupportedRequestType { .. })));
}

// ============================================================================
// Reject / fail
// ============================================================================

/// Test: Reject on callback fires reject() once and dequeues
#[tokio::test]
async fn reject_callback_request() {
    let h = harness();
    let recorder = Arc::new(Recorder::<Vec<SignedGroup>>::default());
    let mut request = SignRequest::transactions(groups(), Transport::callback(Shared(recorder.clone())));
    assert!(h.store.add_sign_request(&mut request));

    assert!(h.dispatcher.reject_request(&request));

    assert_eq!(recorder.rejects.load(Ordering::SeqCst), 1);
    assert!(recorder.approved.lock().unwrap().is_empty());
    assert!(h.store.is_empty());
}

/// Test: Reject on chain fires nothing but still dequeues
#[tokio::test]
async fn reject_chain_request() {
    let h = harness();
    let mut request = SignRequest::transactions(groups(), Transport::Chain);
    assert!(h.store.add_sign_request(&mut request));

    assert!(h.dispatcher.reject_request(&request));
    assert!(h.store.is_empty());
    assert_eq!(h.signer.group_calls.load(Ordering::SeqCst), 0);
    assert!(!h.dispatcher.reject_request(&request));
}

/// Test: fail_request passes the reason to error() and dequeues
#[tokio::test]
async fn fail_request_reports_reason() {
    let h = harness_with(MockSigner { empty_signatures: true, ..Default::default() }, MockChain::default());
    let recorder = Arc::new(Recorder::<Vec<Signature>>::default());
    let mut request = SignRequest::arbitrary_data(
        vec![data_item("MINE", b"ok")],
        Transport::callback(Shared(recorder.clone())),
    );
    assert!(h.store.add_sign_request(&mut request));

    let err = h.dispatcher.sign_and_send_request(&request).await.expect_err("fails");
    assert!(h.dispatcher.fail_request(&request, err.reason()));

    assert_eq!(*recorder.errors.lock().unwrap(), vec!["signature_generation_failed".to_string()]);
    assert_eq!(recorder.rejects.load(Ordering::SeqCst), 0);
    assert!(h.store.is_empty());
}

/// Test: analyze uses the resolver's signable accounts only
#[tokio::test]
async fn analyze_uses_signable_accounts() {
    let h = harness();
    let request = SignRequest::transactions(
        vec![vec![tx(1_000), tx(2_000), DisplayableTransaction::new("WATCHED", 5_000)]],
        Transport::Chain,
    );

    let facts = h.dispatcher.analyze(&request);
    assert_eq!(facts.total_fee.to_string(), "0.003");
    assert_eq!(facts.shape, beesign::RequestShape::Group);
    assert_eq!(facts.transaction_count, 3);
    assert!(h.dispatcher.signable_addresses().contains("MINE"));
    assert!(!h.dispatcher.signable_addresses().contains("WATCHED"));
    assert!(matches!(h.dispatcher.sign_request(&request).await, Ok(SignResult::Transactions(_))));
}

// ============================================================================
// Origin-omitted ids
// ============================================================================

/// Test: A request queued without an id is dequeued after resolution and not restored
#[tokio::test]
async fn unassigned_id_resolves_and_dequeues() {
    let storage = Arc::new(beesign::MemoryStorage::new());
    let store = Arc::new(RequestStore::new(storage.clone()));
    let dispatcher = SigningDispatcher::new(
        store.clone(),
        Arc::new(MockSigner::default()),
        Arc::new(MockAccounts(vec![WalletAccount::signing("MINE")])),
        Arc::new(MockChain::default()),
    );

    let mut request = SignRequest::transactions(groups(), Transport::Chain).with_id("");
    assert!(store.add_sign_request(&mut request));
    assert!(!request.id.is_unassigned());

    dispatcher.sign_and_send_request(&request).await.expect("sent");
    assert!(store.is_empty());

    let reopened = RequestStore::new(storage);
    assert_eq!(reopened.init().expect("init"), 0);
}

/// Test: A request queued without an id can be rejected
#[tokio::test]
async fn unassigned_id_can_be_rejected() {
    let h = harness();
    let recorder = Arc::new(Recorder::<Vec<SignedGroup>>::default());
    let mut request =
        SignRequest::transactions(groups(), Transport::callback(Shared(recorder.clone()))).with_id("");
    assert!(h.store.add_sign_request(&mut request));

    assert!(h.dispatcher.reject_request(&request));
    assert_eq!(recorder.rejects.load(Ordering::SeqCst), 1);
    assert!(h.store.is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

/// Completes only once `parties` calls are waiting at the same time.
struct RendezvousSigner {
    barrier: tokio::sync::Barrier,
    fail_group_with_fee: Option<u64>,
}

impl RendezvousSigner {
    fn new(parties: usize) -> Self {
        Self { barrier: tokio::sync::Barrier::new(parties), fail_group_with_fee: None }
    }
}

#[async_trait]
impl Signer for RendezvousSigner {
    async fn sign_transactions(&self, group: &[DisplayableTransaction], _: &[usize]) -> anyhow::Result<SignedGroup> {
        if let Some(fee) = self.fail_group_with_fee {
            if group.iter().any(|t| t.fee == fee) {
                return Err(anyhow!("device rejected group"));
            }
        }
        self.barrier.wait().await;
        Ok(group.iter().map(|t| format!("signed-{}", t.fee).into_bytes()).collect())
    }

    async fn sign_arbitrary_data(&self, _: &WalletAccount, payload: &[u8]) -> anyhow::Result<Vec<Signature>> {
        self.barrier.wait().await;
        Ok(vec![payload.to_vec()])
    }
}

fn rendezvous_dispatcher(signer: RendezvousSigner) -> SigningDispatcher {
    SigningDispatcher::new(
        Arc::new(RequestStore::in_memory()),
        Arc::new(signer),
        Arc::new(MockAccounts(vec![WalletAccount::signing("MINE"), WalletAccount::signing("OTHER")])),
        Arc::new(MockChain::default()),
    )
}

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Test: Every group is in flight at once
#[tokio::test]
async fn groups_are_signed_concurrently() {
    let dispatcher = rendezvous_dispatcher(RendezvousSigner::new(3));
    let request = SignRequest::transactions(groups(), Transport::Chain);

    let result = tokio::time::timeout(ONE_SECOND, dispatcher.sign_request(&request))
        .await
        .expect("groups must be signed concurrently")
        .expect("signed");
    assert_eq!(result.signed_groups().map(<[SignedGroup]>::len), Some(3));
}

/// Test: Every arbitrary-data item is in flight at once
#[tokio::test]
async fn items_are_signed_concurrently() {
    let dispatcher = rendezvous_dispatcher(RendezvousSigner::new(2));
    let request = SignRequest::arbitrary_data(
        vec![data_item("MINE", b"one"), data_item("OTHER", b"two")],
        Transport::callback(Recorder::<Vec<Signature>>::default()),
    );

    let result = tokio::time::timeout(ONE_SECOND, dispatcher.sign_request(&request))
        .await
        .expect("items must be signed concurrently")
        .expect("signed");
    assert_eq!(result.signatures(), Some(&[b"one".to_vec(), b"two".to_vec()][..]));
}

/// Test: A failing group aborts while its siblings are still pending
#[tokio::test]
async fn failing_group_aborts_pending_siblings() {
    // The two healthy groups can never meet a third party, so only an early
    // abort returns.
    let dispatcher = rendezvous_dispatcher(RendezvousSigner {
        fail_group_with_fee: Some(4_000),
        ..RendezvousSigner::new(3)
    });
    let request = SignRequest::transactions(groups(), Transport::Chain);

    let err = tokio::time::timeout(ONE_SECOND, dispatcher.sign_request(&request))
        .await
        .expect("failure must abort pending groups")
        .expect_err("group rejected");
    assert!(matches!(err, SignError::Signer(_)));
}
