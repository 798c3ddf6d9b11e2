use rand::RngExt;

/// URL-safe alphabet (64 symbols)
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

pub const DEFAULT_LENGTH: usize = 6;
pub const MAX_LENGTH: usize = 64;

/// Generates fixed-length random short codes
#[derive(Debug, Clone, Copy)]
pub struct ShortCodeGenerator {
    length: usize,
}

impl ShortCodeGenerator {
    pub fn new(length: usize) -> anyhow::Result<Self> {
        if length == 0 || length > MAX_LENGTH {
            anyhow::bail!("short code length must be between 1 and {MAX_LENGTH}, got {length}");
        }
        Ok(Self { length })
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Whether `code` could have been produced by this generator
    pub fn matches(&self, code: &str) -> bool {
        code.len() == self.length && code.bytes().all(|b| ALPHABET.contains(&b))
    }
}

impl Default for ShortCodeGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
        }
    }
}
