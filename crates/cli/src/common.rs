//! Reporting helpers shared by the sign and verify flows.

use std::collections::HashMap;

use signet_files::HashResult;
use tracing::{error, info};

use crate::messages;

/// Plural ending for a count.
pub fn count_ending(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Logs every successful file of an operation, in sorted order.
pub fn report_success_list(operation: &str, paths: &mut [String]) {
    paths.sort_unstable();
    for path in paths {
        info!(code = messages::COMMON + 1, "{operation} succeeded for file '{path}'");
    }
}

/// Logs every hashing failure; returns whether any occurred.
pub fn report_hash_errors(hashes: &HashMap<String, HashResult>) -> bool {
    let mut failed: Vec<&HashResult> =
        hashes.values().filter(|result| result.digest.is_err()).collect();
    failed.sort_unstable_by(|a, b| a.path.cmp(&b.path));

    for result in &failed {
        if let Err(err) = &result.digest {
            error!(code = messages::COMMON + 3, "{err}");
        }
    }

    !failed.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_endings() {
        assert_eq!(count_ending(0), "s");
        assert_eq!(count_ending(1), "");
        assert_eq!(count_ending(2), "s");
    }
}
