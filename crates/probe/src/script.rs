//! Agent script loading
//!
//! Both attachments are driven by the same agent script, read once at
//! startup and shipped to each target on attach.

use crate::error::ProbeError;
use std::path::Path;

/// Read the agent script source from disk
pub fn load_script(path: impl AsRef<Path>) -> Result<String, ProbeError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ProbeError::Script {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_script_is_an_error() {
        let result = load_script("/nonexistent/agent.js");
        assert!(matches!(result, Err(ProbeError::Script { .. })));
    }
}
