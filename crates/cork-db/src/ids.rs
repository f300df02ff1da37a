use rand::Rng;

/// URL-safe alphabet for entity ids.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

const GENERATED_LEN: usize = 10;

/// Random short id, 10 chars from the URL-safe alphabet.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Accepts any id between 7 and 14 chars of the id alphabet. Wider than
/// what `generate` emits so ids minted by earlier revisions keep working.
pub fn is_valid(id: &str) -> bool {
    (7..=14).contains(&id.len()) && id.bytes().all(|b| ALPHABET.contains(&b))
}
