//! Integration tests for sessions and session-scoped vendor data.

#![allow(clippy::unwrap_used)]

use anonshop_core::{ContactMethod, ProductId, Pseudonym};
use anonshop_integration_tests::TempProfile;
use anonshop_storefront::db::{
    BannerRepository, CartRepository, MessageRepository, ProductRepository, RepositoryError,
    SessionRepository, VendorCodeRepository, WalletRepository, keys,
};
use anonshop_storefront::models::{NewCartItem, NewMessage};
use anonshop_storefront::services::visible_vendors;

// =============================================================================
// Login / Logout
// =============================================================================

#[test]
fn test_session_survives_restart_until_logout() {
    let profile = TempProfile::new();

    let storage = profile.open().unwrap();
    let session = SessionRepository::new(&storage).create("night_owl").unwrap();
    assert_eq!(session.pseudonym.as_str(), "night_owl");

    let storage = profile.open().unwrap();
    let sessions = SessionRepository::new(&storage);
    assert!(sessions.is_authenticated().unwrap());
    assert_eq!(
        sessions.current().unwrap().unwrap().pseudonym,
        Pseudonym::from_stored("night_owl")
    );

    sessions.destroy().unwrap();
    let storage = profile.open().unwrap();
    assert!(SessionRepository::new(&storage).current().unwrap().is_none());
}

#[test]
fn test_logout_clears_cart_and_catalog() {
    let profile = TempProfile::new();
    let storage = profile.open().unwrap();
    SessionRepository::new(&storage).create("night_owl").unwrap();

    let products = ProductRepository::new(&storage);
    let demo = products.get(&ProductId::new("demo-2")).unwrap().unwrap();
    CartRepository::new(&storage)
        .add(NewCartItem::from(&demo))
        .unwrap();
    products.delete(&ProductId::new("demo-1")).unwrap();

    SessionRepository::new(&storage).destroy().unwrap();

    let storage = profile.open().unwrap();
    let stored = storage.keys().unwrap();
    assert!(!stored.iter().any(|k| k == keys::SESSION));
    assert!(!stored.iter().any(|k| k == keys::CART));
    assert!(!stored.iter().any(|k| k == keys::PRODUCTS));

    // The catalog comes back as the demo seed
    assert!(CartRepository::new(&storage).items().unwrap().is_empty());
    assert_eq!(ProductRepository::new(&storage).list().unwrap().len(), 2);
}

#[test]
fn test_invalid_pseudonyms_rejected() {
    let profile = TempProfile::new();
    let storage = profile.open().unwrap();
    let sessions = SessionRepository::new(&storage);

    for bad in ["ab", "has space", "waytoolongpseudonym_123", "dash-name", ""] {
        let err = sessions.create(bad).unwrap_err();
        assert!(
            matches!(err, RepositoryError::InvalidPseudonym(_)),
            "{bad:?} should be rejected"
        );
    }
    assert!(!sessions.is_authenticated().unwrap());
}

// =============================================================================
// Vendor Onboarding
// =============================================================================

#[test]
fn test_vendor_onboarding_round() {
    let profile = TempProfile::new();
    let storage = profile.open().unwrap();

    let vendor = SessionRepository::new(&storage)
        .create("fresh_vendor")
        .unwrap()
        .pseudonym;

    let codes = VendorCodeRepository::new(&storage);
    let code = codes.generate(2).unwrap().into_iter().next().unwrap();
    codes
        .redeem(&code.code.to_lowercase(), &vendor)
        .unwrap();
    let err = codes.redeem(&code.code, &vendor).unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let counts = codes.counts().unwrap();
    assert_eq!((counts.total, counts.used, counts.available), (2, 1, 1));

    let wallets = WalletRepository::new(&storage);
    wallets
        .set_vendor_wallet(&vendor, "TLa2f6VPqDgRE67v1736s7bJ8Ray5wYjU7")
        .unwrap();
    assert!(wallets.set_vendor_wallet(&vendor, "not-a-wallet").is_err());
    assert_eq!(wallets.vendor_records().unwrap().len(), 1);

    BannerRepository::new(&storage)
        .set_shop_name(&vendor, "  Fresh Goods  ")
        .unwrap();
    assert_eq!(
        BannerRepository::new(&storage).get(&vendor).unwrap().shop_name,
        "Fresh Goods"
    );
}

#[test]
fn test_messages_reach_vendor_inbox() {
    let profile = TempProfile::new();
    let storage = profile.open().unwrap();
    let vendor = Pseudonym::from_stored("crypto_dealer");
    let messages = MessageRepository::new(&storage);

    let sent = messages
        .send(
            &vendor,
            NewMessage {
                contact_method: ContactMethod::Signal,
                contact_value: "+4915100000000".to_owned(),
                message: "Is the guide still available?".to_owned(),
            },
        )
        .unwrap();
    assert_eq!(messages.unread_count(&vendor).unwrap(), 1);

    let storage = profile.open().unwrap();
    let messages = MessageRepository::new(&storage);
    assert!(messages.mark_read(&vendor, &sent.id).unwrap());
    assert_eq!(messages.unread_count(&vendor).unwrap(), 0);
    assert!(messages.delete(&vendor, &sent.id).unwrap());
    assert!(messages.list(&vendor).unwrap().is_empty());
}

#[test]
fn test_invisible_vendor_leaves_marketplace() {
    let profile = TempProfile::new();
    let storage = profile.open().unwrap();

    assert_eq!(visible_vendors(&storage).unwrap().len(), 2);
    BannerRepository::new(&storage)
        .set_invisible_mode(&Pseudonym::from_stored("music_anon"), true)
        .unwrap();

    let storage = profile.open().unwrap();
    let vendors = visible_vendors(&storage).unwrap();
    assert_eq!(vendors.len(), 1);
    assert!(vendors.contains_key(&Pseudonym::from_stored("crypto_dealer")));
}
