//! Integration Tests for Ledger Operations
//!
//! Covers the three mutations and the read accessors:
//! - Registration and duplicate rejection
//! - Invitations with and without escrow
//! - Signing, payout and repeat/unauthorized signers
//! - Error precedence and no-partial-state on failure

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use cosign_core::{Amount, DocumentHash, HashAlgorithm, LedgerError, SettlementError};
use cosign_ledger::{InviteSignatory, RegisterDocument, SignatureSlot};
use cosign_testkit::{test_account, LedgerFixture, FIXTURE_EPOCH_MS};

// ============================================================================
// Test Helpers
// ============================================================================

const DOCUMENT_HASH: &str = "e8a12f6c1b134206cc8c0eccef8b5d114cf9ee3e8d835736564f8dc377d18d23";
const ESCROW: u128 = 300_000_000_000_000_000;

fn document_hash() -> DocumentHash {
    DocumentHash::from_hex(DOCUMENT_HASH).unwrap()
}

fn register_document_one(fixture: &LedgerFixture) -> DocumentHash {
    let hash = document_hash();
    fixture
        .ledger
        .register_document(
            test_account(1),
            RegisterDocument::new(
                hash.clone(),
                "Document One",
                "Just a test document...",
                HashAlgorithm::Sha256,
            ),
        )
        .unwrap();
    hash
}

fn invite_bob(hash: &DocumentHash) -> InviteSignatory {
    InviteSignatory::new(hash.clone(), test_account(2), "Bob", "Real estate purchaser")
}

fn invite_chris(hash: &DocumentHash) -> InviteSignatory {
    InviteSignatory::new(hash.clone(), test_account(3), "Chris", "Real estate purchaser")
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn registers_document_with_caller_as_owner() {
    let fixture = LedgerFixture::new();
    let alice = test_account(1);
    let hash = register_document_one(&fixture);

    let document = fixture.ledger.get_document(&hash).unwrap();
    assert_eq!(document.hash, hash);
    assert_eq!(document.name, "Document One");
    assert_eq!(document.description, "Just a test document...");
    assert_eq!(document.owner, alice);
    assert_eq!(document.algorithm, HashAlgorithm::Sha256);
    assert_eq!(document.created_at.as_millis(), FIXTURE_EPOCH_MS);
    assert!(fixture.ledger.list_signatures(&hash).unwrap().is_empty());
}

#[test]
fn duplicate_hash_is_rejected_and_original_kept() {
    let fixture = LedgerFixture::new();
    let hash = register_document_one(&fixture);

    let err = fixture
        .ledger
        .register_document(
            test_account(4),
            RegisterDocument::new(hash.clone(), "Impostor", "", HashAlgorithm::Md5),
        )
        .unwrap_err();
    assert_matches!(err, LedgerError::DuplicateHash { .. });

    let document = fixture.ledger.get_document(&hash).unwrap();
    assert_eq!(document.owner, test_account(1));
    assert_eq!(document.name, "Document One");
    assert_eq!(fixture.ledger.document_count(), 1);
}

#[test]
fn hashes_differing_only_in_case_are_separate_documents() {
    let fixture = LedgerFixture::new();
    let (alice, bob) = (test_account(1), test_account(2));
    let lower: DocumentHash = "cafe".parse().unwrap();
    let upper: DocumentHash = "CAFE".parse().unwrap();

    fixture
        .ledger
        .register_document(
            alice,
            RegisterDocument::new(lower.clone(), "lower", "", HashAlgorithm::Sha256),
        )
        .unwrap();
    fixture
        .ledger
        .register_document(
            bob,
            RegisterDocument::new(upper.clone(), "upper", "", HashAlgorithm::Sha256),
        )
        .unwrap();

    assert_eq!(fixture.ledger.document_count(), 2);
    assert_eq!(fixture.ledger.get_document(&lower).unwrap().owner, alice);
    assert_eq!(fixture.ledger.get_document(&upper).unwrap().owner, bob);
}

#[test]
fn unknown_algorithm_labels_are_kept_verbatim() {
    let fixture = LedgerFixture::new();
    let hash: DocumentHash = "b3".parse().unwrap();
    let algorithm: HashAlgorithm = "blake3".parse().unwrap();
    fixture
        .ledger
        .register_document(
            test_account(1),
            RegisterDocument::new(hash.clone(), "Blob", "", algorithm.clone()),
        )
        .unwrap();

    let document = fixture.ledger.get_document(&hash).unwrap();
    assert_eq!(document.algorithm, algorithm);
    assert!(!document.algorithm.is_known());
}

#[test]
fn oversized_name_is_rejected_before_anything_is_stored() {
    let fixture = LedgerFixture::new();
    let name = "x".repeat(fixture.ledger.config().limits.max_text_len + 1);

    let err = fixture
        .ledger
        .register_document(
            test_account(1),
            RegisterDocument::new(document_hash(), name, "", HashAlgorithm::Sha256),
        )
        .unwrap_err();
    assert_matches!(err, LedgerError::InvalidInput { field: "name", .. });
    assert!(!fixture.ledger.contains(&document_hash()));
    assert!(fixture.ledger.events().is_empty());
}

// ============================================================================
// Invitations
// ============================================================================

#[test]
fn invites_signatory() {
    let fixture = LedgerFixture::new();
    let hash = register_document_one(&fixture);

    let committed = fixture
        .ledger
        .invite_signatory(test_account(1), invite_bob(&hash))
        .unwrap();
    assert_eq!(committed.value.address, test_account(2));

    let addresses = fixture.ledger.list_signatory_addresses(&hash).unwrap();
    assert_eq!(addresses, [test_account(2)]);
    assert_eq!(
        fixture.ledger.list_signatures(&hash).unwrap(),
        [SignatureSlot::Unsigned]
    );
}

#[test]
fn invite_with_escrow_records_amount_due() {
    let fixture = LedgerFixture::new();
    let alice = test_account(1);
    fixture.fund(alice, ESCROW);
    let hash = register_document_one(&fixture);

    fixture
        .ledger
        .invite_signatory(alice, invite_bob(&hash).with_escrow(Amount::new(ESCROW)))
        .unwrap();

    let info = fixture
        .ledger
        .get_signatory_info(&hash, &test_account(2))
        .unwrap();
    assert_eq!(info.amount_due, Amount::new(ESCROW));
    assert!(!info.paid);
    assert_eq!(fixture.ledger.held_balance(&hash).unwrap(), Amount::new(ESCROW));
    assert_eq!(fixture.balance(&alice), 0);
}

#[test]
fn signatory_information_is_returned() {
    let fixture = LedgerFixture::new();
    let hash = register_document_one(&fixture);
    fixture
        .ledger
        .invite_signatory(test_account(1), invite_bob(&hash))
        .unwrap();

    let info = fixture
        .ledger
        .get_signatory_info(&hash, &test_account(2))
        .unwrap();
    assert_eq!(info.full_name, "Bob");
    assert_eq!(info.description, "Real estate purchaser");
    assert_eq!(info.amount_due, Amount::ZERO);
    assert_eq!(info.signed_at, None);
}

#[test]
fn signatories_are_listed_in_invitation_order() {
    let fixture = LedgerFixture::new();
    let alice = test_account(1);
    let hash = register_document_one(&fixture);
    fixture.ledger.invite_signatory(alice, invite_bob(&hash)).unwrap();
    fixture.ledger.invite_signatory(alice, invite_chris(&hash)).unwrap();

    assert_eq!(
        fixture.ledger.list_signatory_addresses(&hash).unwrap(),
        [test_account(2), test_account(3)]
    );
}

#[test]
fn duplicate_signatory_is_rejected() {
    let fixture = LedgerFixture::new();
    let alice = test_account(1);
    fixture.fund(alice, 10);
    let hash = register_document_one(&fixture);
    fixture.ledger.invite_signatory(alice, invite_bob(&hash)).unwrap();

    let err = fixture
        .ledger
        .invite_signatory(alice, invite_bob(&hash).with_escrow(Amount::new(10)))
        .unwrap_err();
    assert_matches!(err, LedgerError::DuplicateSignatory { .. });
    assert_eq!(fixture.ledger.list_signatory_addresses(&hash).unwrap().len(), 1);
    assert_eq!(fixture.balance(&alice), 10);
}

#[test]
fn only_owner_may_invite() {
    let fixture = LedgerFixture::new();
    let bob = test_account(2);
    fixture.fund(bob, 10);
    let hash = register_document_one(&fixture);

    let err = fixture
        .ledger
        .invite_signatory(bob, invite_bob(&hash).with_escrow(Amount::new(10)))
        .unwrap_err();
    assert_matches!(err, LedgerError::NotOwner { caller, .. } if caller == bob);
    assert!(fixture.ledger.list_signatory_addresses(&hash).unwrap().is_empty());
    assert_eq!(fixture.balance(&bob), 10);
}

#[test]
fn owner_may_invite_themselves() {
    let fixture = LedgerFixture::new();
    let alice = test_account(1);
    let hash = register_document_one(&fixture);
    fixture
        .ledger
        .invite_signatory(alice, InviteSignatory::new(hash.clone(), alice, "Alice", ""))
        .unwrap();

    fixture.ledger.sign_document(alice, &hash).unwrap();
    assert_eq!(
        fixture.ledger.list_signatures(&hash).unwrap(),
        [SignatureSlot::Signed(alice)]
    );
}

#[test]
fn invite_on_unknown_document_fails() {
    let fixture = LedgerFixture::new();
    let err = fixture
        .ledger
        .invite_signatory(test_account(1), invite_bob(&document_hash()))
        .unwrap_err();
    assert_matches!(err, LedgerError::DocumentNotFound { .. });
}

#[test]
fn insufficient_funds_abort_invite() {
    let fixture = LedgerFixture::new();
    let alice = test_account(1);
    fixture.fund(alice, 4);
    let hash = register_document_one(&fixture);

    let err = fixture
        .ledger
        .invite_signatory(alice, invite_bob(&hash).with_escrow(Amount::new(5)))
        .unwrap_err();
    assert_matches!(
        err,
        LedgerError::Settlement(SettlementError::InsufficientFunds { .. })
    );
    assert!(!err.is_retryable());
    assert!(fixture.ledger.list_signatory_addresses(&hash).unwrap().is_empty());
    assert_eq!(fixture.balance(&alice), 4);
}

// ============================================================================
// Signing
// ============================================================================

#[test]
fn signs_document() {
    let fixture = LedgerFixture::new();
    let bob = test_account(2);
    let hash = register_document_one(&fixture);
    fixture
        .ledger
        .invite_signatory(test_account(1), invite_bob(&hash))
        .unwrap();
    fixture.clock.advance(60_000);

    let receipt = fixture.ledger.sign_document(bob, &hash).unwrap().value;
    assert_eq!(receipt.signer, bob);
    assert_eq!(receipt.slot, 0);
    assert_eq!(receipt.paid_out, Amount::ZERO);
    assert_eq!(receipt.signed_at.as_millis(), FIXTURE_EPOCH_MS + 60_000);

    assert_eq!(
        fixture.ledger.list_signatures(&hash).unwrap(),
        [SignatureSlot::Signed(bob)]
    );
    let info = fixture.ledger.get_signatory_info(&hash, &bob).unwrap();
    assert_eq!(info.signed_at, Some(receipt.signed_at));
}

#[test]
fn signing_releases_escrow_to_signer() {
    let fixture = LedgerFixture::new();
    let (alice, bob) = (test_account(1), test_account(2));
    fixture.fund(alice, ESCROW);
    let hash = register_document_one(&fixture);
    fixture
        .ledger
        .invite_signatory(alice, invite_bob(&hash).with_escrow(Amount::new(ESCROW)))
        .unwrap();

    assert_eq!(fixture.sign(bob, &hash), ESCROW);

    let info = fixture.ledger.get_signatory_info(&hash, &bob).unwrap();
    assert_eq!(info.amount_due, Amount::ZERO);
    assert!(info.paid);
    assert_eq!(fixture.balance(&bob), ESCROW);
    assert_eq!(fixture.ledger.held_balance(&hash).unwrap(), Amount::ZERO);
}

#[test]
fn signatures_follow_signing_order() {
    let fixture = LedgerFixture::new();
    let (alice, bob, chris) = (test_account(1), test_account(2), test_account(3));
    let hash = register_document_one(&fixture);
    fixture.ledger.invite_signatory(alice, invite_bob(&hash)).unwrap();
    fixture.ledger.invite_signatory(alice, invite_chris(&hash)).unwrap();

    fixture.sign(bob, &hash);
    fixture.sign(chris, &hash);

    assert_eq!(
        fixture.ledger.list_signatures(&hash).unwrap(),
        [SignatureSlot::Signed(bob), SignatureSlot::Signed(chris)]
    );
}

#[test]
fn signing_unknown_document_fails() {
    let fixture = LedgerFixture::new();
    let hash: DocumentHash = "non-existing-hash".parse().unwrap();
    let err = fixture
        .ledger
        .sign_document(test_account(2), &hash)
        .unwrap_err();
    assert_matches!(err, LedgerError::DocumentNotFound { .. });
}

#[test]
fn uninvited_caller_cannot_sign() {
    let fixture = LedgerFixture::new();
    let hash = register_document_one(&fixture);

    let err = fixture
        .ledger
        .sign_document(test_account(2), &hash)
        .unwrap_err();
    assert_matches!(err, LedgerError::NotAuthorizedSigner { .. });
    assert_eq!(fixture.ledger.events().len(), 1);
}

#[test]
fn signing_twice_fails_without_second_payout() {
    let fixture = LedgerFixture::new();
    let (alice, bob) = (test_account(1), test_account(2));
    fixture.fund(alice, 7);
    let hash = register_document_one(&fixture);
    fixture
        .ledger
        .invite_signatory(alice, invite_bob(&hash).with_escrow(Amount::new(7)))
        .unwrap();
    fixture.sign(bob, &hash);

    let err = fixture.ledger.sign_document(bob, &hash).unwrap_err();
    assert_matches!(err, LedgerError::AlreadySigned { .. });
    assert_eq!(fixture.balance(&bob), 7);
    assert_eq!(fixture.ledger.list_signatures(&hash).unwrap().len(), 1);
}

#[test]
fn failed_payout_leaves_signatory_unsigned_and_retryable() {
    let fixture = LedgerFixture::new();
    let (alice, bob) = (test_account(1), test_account(2));
    fixture.fund(alice, 9);
    let hash = register_document_one(&fixture);
    fixture
        .ledger
        .invite_signatory(alice, invite_bob(&hash).with_escrow(Amount::new(9)))
        .unwrap();

    fixture.settlement.fail_next_credits(1);
    let err = fixture.ledger.sign_document(bob, &hash).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(
        fixture.ledger.list_signatures(&hash).unwrap(),
        [SignatureSlot::Unsigned]
    );
    let info = fixture.ledger.get_signatory_info(&hash, &bob).unwrap();
    assert!(!info.paid);
    assert_eq!(info.amount_due, Amount::new(9));
    assert_eq!(fixture.balance(&bob), 0);

    assert_eq!(fixture.sign(bob, &hash), 9);
    assert_eq!(fixture.balance(&bob), 9);
}

// ============================================================================
// Read accessors
// ============================================================================

#[test]
fn accessors_on_unknown_document_report_not_found() {
    let fixture = LedgerFixture::new();
    let hash = document_hash();

    assert_matches!(
        fixture.ledger.get_document(&hash),
        Err(LedgerError::DocumentNotFound { .. })
    );
    assert_matches!(
        fixture.ledger.list_signatory_addresses(&hash),
        Err(LedgerError::DocumentNotFound { .. })
    );
    assert_matches!(
        fixture.ledger.list_signatures(&hash),
        Err(LedgerError::DocumentNotFound { .. })
    );
    assert_matches!(
        fixture.ledger.held_balance(&hash),
        Err(LedgerError::DocumentNotFound { .. })
    );
}
