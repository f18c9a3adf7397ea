use classlink::utils::password::{hash_password, verify_password};

#[test]
fn test_hash_password_produces_bcrypt_hash() {
    let hash = hash_password("secret-password").unwrap();

    assert_ne!(hash, "secret-password");
    assert!(hash.starts_with("$2"));
}

#[test]
fn test_verify_password_round_trip() {
    let hash = hash_password("secret-password").unwrap();

    assert!(verify_password("secret-password", &hash).unwrap());
    assert!(!verify_password("wrong-password", &hash).unwrap());
}

#[test]
fn test_same_password_hashes_differently() {
    let first = hash_password("secret-password").unwrap();
    let second = hash_password("secret-password").unwrap();

    // bcrypt salts every hash
    assert_ne!(first, second);
}

#[test]
fn test_empty_password_still_hashes() {
    let hash = hash_password("").unwrap();

    assert!(verify_password("", &hash).unwrap());
    assert!(!verify_password("x", &hash).unwrap());
}

#[test]
fn test_verify_rejects_garbage_hash() {
    assert!(verify_password("password", "not-a-bcrypt-hash").is_err());
}
