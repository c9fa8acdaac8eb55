use std::collections::BTreeMap;

use crate::util::split_assignment;

/// Go template that prints each entry of the image config's `Env` list on its own line.
pub(crate) const IMAGE_ENV_FORMAT: &str = "{{range $i, $v := .Config.Env}}{{println $v}}{{end}}";

/// Parse the image's declared environment, one `KEY=VALUE` per line.
///
/// Blank lines and entries with an empty key are skipped. A bare `KEY` maps to an empty
/// value. Later entries override earlier ones.
pub fn parse_env_listing(listing: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for line in listing.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, val) = split_assignment(line);
        if key.is_empty() {
            continue;
        }
        out.insert(key.to_string(), val.to_string());
    }
    out
}
