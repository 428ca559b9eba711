//! `ngl rules` — lists the built-in rules.

use std::sync::Arc;

use ngl_config::{IonicConfig, LintConfig};
use ngl_ionic::AttributeTypeOracle;
use ngl_lint::LintEngine;
use ngl_source::OsFileSystem;

use crate::GlobalArgs;

/// Prints one line per rule: code, name, default severity, whether it runs
/// by default, and the description.
pub fn run(_global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    for line in rule_table()? {
        println!("{line}");
    }
    Ok(0)
}

fn rule_table() -> Result<Vec<String>, Box<dyn std::error::Error>> {
    // The oracle is lazy; listing never reads declaration files.
    let ionic = IonicConfig::default();
    let oracle = Arc::new(AttributeTypeOracle::new(
        ionic.components_dts(std::path::Path::new(".")),
        Arc::new(OsFileSystem),
        ionic.cache_capacity,
    ));
    let engine = LintEngine::new(&LintConfig::default(), oracle)?;
    Ok(engine
        .rules()
        .map(|rule| {
            format!(
                "{}  {:<24} {:<8} {:<4} {}",
                rule.code(),
                rule.name(),
                rule.default_severity().to_string(),
                if rule.enabled_by_default() { "on" } else { "off" },
                rule.description()
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_builtin_rule() {
        let table = rule_table().unwrap();
        assert_eq!(table.len(), 8);
        assert!(table[0].starts_with("C101  prefer-readonly"));
        let boolean = table
            .iter()
            .find(|l| l.contains("ion-boolean-attribute"))
            .unwrap();
        assert!(boolean.starts_with("W107"));
        assert!(boolean.contains(" off "));
    }
}
