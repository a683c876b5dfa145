use sporauth::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Should not be empty
    assert!(!challenge.is_empty());

    // Should be deterministic - same input produces same output
    let challenge2 = generate_code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    // Different input should produce different output
    let challenge3 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
    assert!(!challenge.contains('+'));
    assert!(!challenge.contains('/'));
    assert!(!challenge.contains('='));
}

#[test]
fn test_generate_code_challenge_known_value() {
    // SHA256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824,
    // base64url of those 32 bytes:
    let challenge = generate_code_challenge("hello");
    assert_eq!(challenge, "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ");

    // SHA-256 digests are 32 bytes, which is 43 base64url characters
    assert_eq!(challenge.len(), 43);
}

#[test]
fn test_urlencode() {
    // Unreserved characters pass through untouched
    assert_eq!(urlencode("AZaz09-_.~"), "AZaz09-_.~");

    // Reserved characters are percent-encoded
    assert_eq!(urlencode("a b"), "a%20b");
    assert_eq!(
        urlencode("http://127.0.0.1:8080/callback"),
        "http%3A%2F%2F127.0.0.1%3A8080%2Fcallback"
    );

    // Space-joined scope lists stay one parameter value
    assert_eq!(urlencode("streaming user-read-email"), "streaming%20user-read-email");
}

#[test]
fn test_urldecode() {
    assert_eq!(urldecode("a%20b"), "a b");
    assert_eq!(urldecode("a+b"), "a b");
    assert_eq!(urldecode("plain"), "plain");
    assert_eq!(urldecode("%3A%2F"), ":/");

    // Malformed escapes fall through as literal text
    assert_eq!(urldecode("100%"), "100%");
    assert_eq!(urldecode("%zz"), "%zz");
}

#[test]
fn test_parse_query() {
    let params = parse_query("http://127.0.0.1:8080/callback?code=AQBx&state=xyz");
    assert_eq!(params.get("code").map(String::as_str), Some("AQBx"));
    assert_eq!(params.get("state").map(String::as_str), Some("xyz"));

    // Values are percent-decoded
    let params = parse_query("http://localhost/cb?error=access%20denied");
    assert_eq!(params.get("error").map(String::as_str), Some("access denied"));

    // A URL without a query yields an empty map
    assert!(parse_query("http://localhost/cb").is_empty());

    // Parameters without a value map to the empty string
    let params = parse_query("http://localhost/cb?flag&code=x");
    assert_eq!(params.get("flag").map(String::as_str), Some(""));
    assert_eq!(params.get("code").map(String::as_str), Some("x"));

    // Fragments are not part of the query
    let params = parse_query("http://localhost/cb?code=x#section");
    assert_eq!(params.get("code").map(String::as_str), Some("x"));
}

#[test]
fn test_strip_query() {
    assert_eq!(
        strip_query("http://127.0.0.1:8080/callback?code=AQBx&state=xyz"),
        "http://127.0.0.1:8080/callback"
    );
    assert_eq!(strip_query("http://localhost/cb"), "http://localhost/cb");
    assert_eq!(strip_query("http://localhost/cb?x=1#frag"), "http://localhost/cb");
    assert_eq!(strip_query("http://localhost/cb#frag"), "http://localhost/cb");
}
