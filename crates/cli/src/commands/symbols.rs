use anyhow::Result;
use serde::Serialize;
use symgraph_core::analysis::{classify_declaration, normalize_name};

#[derive(Debug, Serialize)]
pub struct NormalizedNameInfo {
    pub raw: String,
    pub name: String,
    pub owner: Option<String>,
}

/// Split ad-hoc decorated names into leaf and owner scope.
pub fn normalize_command(raw_names: &[String], json: bool) -> Result<()> {
    let normalized: Vec<NormalizedNameInfo> = raw_names
        .iter()
        .map(|raw| {
            let n = normalize_name(raw);
            NormalizedNameInfo { raw: raw.clone(), name: n.name, owner: n.owner }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        return Ok(());
    }

    for n in &normalized {
        println!("{} => {} (owner: {})", n.raw, n.name, n.owner.as_deref().unwrap_or("(none)"));
    }
    Ok(())
}

/// Print the category of a type declaration; unsupported declarations are an error.
pub fn classify_command(declaration: &str) -> Result<()> {
    let category = classify_declaration(declaration)?;
    println!("{}", category);
    Ok(())
}
