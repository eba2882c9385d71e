//! Content addressing for dependencies.
//!
//! A dependency's on-disk directory is named by the BLAKE3 hash of its
//! `"<namespace>:<location>"` pair. The hash is a pure function of the two
//! fields that decide what gets fetched and how its data is namespaced, so
//! identical pairs always land in the same place and distinct pairs never
//! share a directory.

// ─── Dependency Id ─────────────────────────────────────────────────

/// A 256-bit BLAKE3 identity token.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyId(pub [u8; 32]);

impl DependencyId {
    /// Display as full hex (64 lowercase characters).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Display as short base-32 (8 characters, 40 bits).
    pub fn to_short(&self) -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghjkmnpqrstuvwxyz";
        let val = u64::from_be_bytes([
            0, 0, 0, self.0[0], self.0[1], self.0[2], self.0[3], self.0[4],
        ]);
        let mut result = String::with_capacity(8);
        for i in (0..8).rev() {
            let idx = ((val >> (i * 5)) & 0x1F) as usize;
            result.push(ALPHABET[idx] as char);
        }
        result
    }
}

impl std::fmt::Debug for DependencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.to_short())
    }
}

impl std::fmt::Display for DependencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ─── Public API ────────────────────────────────────────────────────

/// Identity of a dependency. A missing namespace hashes as the empty string.
pub fn dependency_id(namespace: Option<&str>, location: &str) -> DependencyId {
    let cleartext = format!("{}:{}", namespace.unwrap_or(""), location);
    DependencyId(*blake3::hash(cleartext.as_bytes()).as_bytes())
}
