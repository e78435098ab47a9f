//! 用户标识哈希
//!
//! 文件名里不直接出现学号：既避免非法文件名字符，也不在磁盘上留明文

use sha2::{Digest, Sha224};

/// 哈希截断长度，12 个十六进制字符足以避免同机用户冲突
const IDENTITY_HASH_LEN: usize = 12;

/// 计算用户标识的短哈希（小写十六进制）
pub fn identity_hash(username: &str) -> String {
    let mut hasher = Sha224::new();
    hasher.update(username.as_bytes());
    let digest = hasher.finalize();
    let mut hash = hex::encode(digest);
    hash.truncate(IDENTITY_HASH_LEN);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_length_hex() {
        let hash = identity_hash("190201001");
        assert_eq!(hash.len(), 12);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn deterministic() {
        assert_eq!(identity_hash("abc"), identity_hash("abc"));
    }

    #[test]
    fn different_users_differ() {
        assert_ne!(identity_hash("190201001"), identity_hash("190201002"));
    }
}
