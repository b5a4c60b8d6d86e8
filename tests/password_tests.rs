use finboard_backend::util::password::*;

#[test]
fn test_hash_password_success() {
    let password = "test_password_123";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();

    assert!(!hash.is_empty());
    assert_ne!(hash, password);
    assert!(hash.starts_with("$argon2"));

    let parts: Vec<&str> = hash.split('$').collect();
    assert!(parts.len() >= 5, "Hash should have at least 5 parts separated by $");
}

#[test]
fn test_hash_password_different_results() {
    let password = "same_password_123";
    let first = PasswordUtilsImpl::hash_password(password).unwrap();
    let second = PasswordUtilsImpl::hash_password(password).unwrap();
    // Different salts, different hashes
    assert_ne!(first, second);
}

#[test]
fn test_verify_password_success() {
    let password = "correct_password_123";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();
    assert!(PasswordUtilsImpl::verify_password(password, &hash).unwrap());
}

#[test]
fn test_verify_password_wrong_password() {
    let hash = PasswordUtilsImpl::hash_password("correct_password_123").unwrap();
    assert!(!PasswordUtilsImpl::verify_password("wrong_password_456", &hash).unwrap());
}

#[test]
fn test_verify_password_invalid_hash_format() {
    let result = PasswordUtilsImpl::verify_password("whatever", "not-a-valid-hash");
    assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
}

#[test]
fn test_hash_password_unicode_characters() {
    let password = "Pássw0rd123!🔒";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();
    assert!(PasswordUtilsImpl::verify_password(password, &hash).unwrap());
}

#[test]
fn test_validate_password_strength() {
    assert!(PasswordUtilsImpl::validate_password_strength("Password123").is_ok());
    assert!(PasswordUtilsImpl::validate_password_strength("analyst123").is_ok());

    // Too short
    assert!(PasswordUtilsImpl::validate_password_strength("Ab1").is_err());
    // No digit
    assert!(PasswordUtilsImpl::validate_password_strength("passwordonly").is_err());
    // No letter
    assert!(PasswordUtilsImpl::validate_password_strength("1234567890").is_err());
    // Empty
    assert!(PasswordUtilsImpl::validate_password_strength("").is_err());
}
