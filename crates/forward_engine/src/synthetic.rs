use forward_core::SearchRequest;
use sha2::{Digest, Sha256};

/// Deterministic id for a test-mode search: `test-{short_hash(scope, window)}`.
pub fn synthetic_job_id(request: &SearchRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.source_scope().as_bytes());
    hasher.update(b"\n");
    hasher.update(request.query().as_bytes());
    let digest = hasher.finalize();
    let mut id = String::with_capacity(5 + 12);
    id.push_str("test-");
    for byte in digest.iter().take(6) {
        use std::fmt::Write;
        let _ = write!(&mut id, "{byte:02x}");
    }
    id
}

/// Test runs assume one synthetic item per day in the window.
pub(crate) fn synthetic_item_count(request: &SearchRequest) -> u64 {
    request.day_count()
}
