// src/feed/repair.rs
//! Targeted fix for a known feed defect: unescaped `&` at the start of
//! HTML-named-entity-looking sequences (`&copy;`, `&trade;`, ...) that are not
//! valid XML and would abort the parse. This is a pure text transform applied
//! before any XML parsing, not general sanitization.

use once_cell::sync::OnceCell;
use regex::{Captures, Regex};

/// The five named entities XML itself defines; everything else gets its `&`
/// escaped so the parser sees literal text.
const XML_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "apos", "quot"];

pub fn repair_named_entities(text: &str) -> String {
    static RE_ENTITY: OnceCell<Regex> = OnceCell::new();
    let re = RE_ENTITY.get_or_init(|| Regex::new(r"&([a-zA-Z0-9]+);").unwrap());

    re.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        if XML_ENTITIES.contains(&name) {
            caps[0].to_string()
        } else {
            format!("&amp;{name};")
        }
    })
    .into_owned()
}
