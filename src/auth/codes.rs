use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// Length of the codes emailed for account verification.
pub const VERIFICATION_CODE_LEN: usize = 8;

/// Random alphanumeric code drawn from the OS CSPRNG.
pub fn generate_code(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
