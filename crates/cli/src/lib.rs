//! symhound-cli
//!
//! Library side of the symhound CLI. The binary does nothing beyond
//! argument parsing and dispatch; the command helpers here drive
//! `symhound-core`, which holds all the behavior worth testing.

pub mod commands;
pub mod descriptor;

use symhound_core::db::StoreError;

/// Exit code contract:
/// - `0` success
/// - `1` user error (bad descriptor, unknown name/slug, bad arguments)
/// - `2` integrity error (conflicting identity, invariant violation)
/// - `3` backing store unavailable (database unreachable, blob missing)
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::Conflict(_)) | Some(StoreError::Integrity(_)) => 2,
        Some(StoreError::Unavailable(_)) | Some(StoreError::BackingStoreMissing(_)) => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn exit_codes_follow_the_contract() {
        assert_eq!(exit_code_for(&anyhow!("plain user error")), 1);
        assert_eq!(
            exit_code_for(&anyhow::Error::new(StoreError::Conflict("dup".into()))),
            2
        );
        assert_eq!(
            exit_code_for(&anyhow::Error::new(StoreError::Unavailable("down".into()))),
            3
        );
        assert_eq!(
            exit_code_for(&anyhow::Error::new(StoreError::NotFound("x".into()))),
            1
        );
    }
}
